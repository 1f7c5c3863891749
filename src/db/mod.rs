use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use log::{debug, warn};
use crate::errors::AppError;
use crate::models::employee::Employee;

/// Flat-file employee collection. The file is re-read on every call; the
/// mutex serialises load-mutate-save cycles inside this process.
pub struct EmployeeStore {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Default)]
struct Records {
    employees: Vec<Employee>,
    skipped: usize,
}

impl EmployeeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EmployeeStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole collection. A missing, unreadable or corrupt file
    /// yields an empty collection; records that fail to parse are skipped.
    pub async fn load(&self) -> Vec<Employee> {
        match self.read_records().await {
            Ok(records) => records.employees,
            Err(err) => {
                warn!("{}", err);
                Vec::new()
            }
        }
    }

    async fn read_records(&self) -> Result<Records, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Records::default()),
            Err(err) => {
                return Err(AppError::Storage(format!(
                    "could not read {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Records::default());
        }

        let values: Vec<serde_json::Value> = serde_json::from_slice(&bytes).map_err(|err| {
            AppError::Storage(format!("could not parse {}: {}", self.path.display(), err))
        })?;

        let mut records = Records::default();
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<Employee>(value) {
                Ok(employee) => records.employees.push(employee),
                Err(err) => {
                    warn!("Skipping record {} in {}: {}", index, self.path.display(), err);
                    records.skipped += 1;
                }
            }
        }
        Ok(records)
    }

    /// Overwrites the file with `employees`. Not atomic.
    pub async fn save(&self, employees: &[Employee]) -> Result<(), AppError> {
        let data = serde_json::to_vec_pretty(employees)?;
        tokio::fs::write(&self.path, data).await?;
        debug!("Saved {} employees to {}", employees.len(), self.path.display());
        Ok(())
    }

    pub async fn list(&self) -> Vec<Employee> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Runs `f` against a freshly loaded collection and persists the result.
    /// Nothing is written when `f` fails or when the file could not be read
    /// in full, so a bad record never costs the others.
    pub async fn modify<F, R>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut Vec<Employee>) -> Result<R, AppError>,
    {
        let _guard = self.lock.lock().await;
        let records = self.read_records().await?;
        if records.skipped > 0 {
            return Err(AppError::Storage(format!(
                "refusing to overwrite {}: {} unreadable records",
                self.path.display(),
                records.skipped
            )));
        }
        let mut employees = records.employees;
        let result = f(&mut employees)?;
        self.save(&employees).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::{Gender, Status};
    use chrono::NaiveDate;

    fn employee(id: &str, first_name: &str) -> Employee {
        Employee {
            id: id.into(),
            first_name: first_name.into(),
            last_name: "Doe".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            gender: Gender::Female,
            salary: 4200.0,
            created_at: "2024-3-1 8:0:0".into(),
            status: Status::Active,
        }
    }

    #[actix_web::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = EmployeeStore::new(dir.path().join("employees.json"));
        assert!(store.load().await.is_empty());
    }

    #[actix_web::test]
    async fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = EmployeeStore::new(&path);
        assert!(store.load().await.is_empty());
    }

    #[actix_web::test]
    async fn empty_file_loads_empty_and_accepts_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.json");
        std::fs::write(&path, b"").unwrap();
        let store = EmployeeStore::new(&path);
        store
            .modify(|employees| {
                employees.push(employee("a", "Ali"));
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(store.load().await.len(), 1);
    }

    #[actix_web::test]
    async fn bad_record_is_skipped_on_read_and_blocks_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.json");
        let original = serde_json::json!([
            employee("a", "Ali"),
            { "ID": "b", "first_name": "Broken", "date_of_birth": "someday" },
        ])
        .to_string();
        std::fs::write(&path, &original).unwrap();
        let store = EmployeeStore::new(&path);

        let listed = store.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a");

        let result = store
            .modify(|employees| {
                employees.push(employee("c", "Cem"));
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[actix_web::test]
    async fn corrupt_file_blocks_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("employees.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = EmployeeStore::new(&path);

        let result = store.modify(|_| Ok(())).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(std::fs::read(&path).unwrap(), b"{ not json");
    }

    #[actix_web::test]
    async fn save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = EmployeeStore::new(dir.path().join("employees.json"));
        let employees = vec![employee("a", "Ali"), employee("b", "Bob")];
        store.save(&employees).await.unwrap();
        assert_eq!(store.load().await, employees);
    }

    #[actix_web::test]
    async fn failed_modify_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = EmployeeStore::new(dir.path().join("employees.json"));
        store.save(&[employee("a", "Ali")]).await.unwrap();

        let result: Result<(), AppError> = store
            .modify(|employees| {
                employees.clear();
                Err(AppError::NotFound("a".into()))
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.load().await.len(), 1);
    }

    #[actix_web::test]
    async fn concurrent_modifications_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(EmployeeStore::new(dir.path().join("employees.json")));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .modify(|employees| {
                            employees.push(employee(&i.to_string(), "Worker"));
                            Ok(())
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.list().await.len(), 8);
    }
}
