use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;
use uuid::Uuid;
use log::info;
use crate::db::EmployeeStore;
use crate::errors::AppError;
use crate::models::employee::{current_timestamp, parse_date, parse_salary, Employee, EmployeeChanges};
use crate::utils::validation::{
    validate_date, validate_gender, validate_salary, validate_status, ValidatedJson,
};

#[derive(Deserialize, Validate)]
pub struct NewEmployee {
    #[validate(required, length(min = 1))]
    first_name: Option<String>,
    #[validate(required, length(min = 1))]
    last_name: Option<String>,
    #[validate(required, custom = "validate_date")]
    date_of_birth: Option<String>,
    #[validate(required, custom = "validate_gender")]
    gender: Option<String>,
    #[validate(required, custom = "validate_salary")]
    salary: Option<serde_json::Value>,
    #[validate(required, custom = "validate_status")]
    status: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct EmployeeUpdate {
    first_name: Option<String>,
    last_name: Option<String>,
    #[validate(custom = "validate_date")]
    date_of_birth: Option<String>,
    #[validate(custom = "validate_gender")]
    gender: Option<String>,
    #[validate(custom = "validate_salary")]
    salary: Option<serde_json::Value>,
    #[validate(custom = "validate_status")]
    status: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct StatusUpdate {
    #[validate(required, custom = "validate_status")]
    status: Option<String>,
}

/// `{id}` never matches an empty segment, so the id is always present.
#[derive(Deserialize)]
pub struct EmployeePath {
    id: String,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

#[derive(Serialize)]
struct EmployeeResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    data: T,
}

fn missing(field: &str) -> AppError {
    AppError::BadRequest(format!("{} is required", field))
}

fn invalid(field: &str) -> AppError {
    AppError::BadRequest(format!("{} is invalid", field))
}

impl NewEmployee {
    fn into_employee(self) -> Result<Employee, AppError> {
        let date_of_birth = self.date_of_birth.ok_or_else(|| missing("date_of_birth"))?;
        let gender = self.gender.ok_or_else(|| missing("gender"))?;
        let salary = self.salary.ok_or_else(|| missing("salary"))?;
        let status = self.status.ok_or_else(|| missing("status"))?;

        Ok(Employee {
            id: Uuid::new_v4().to_string(),
            first_name: self.first_name.ok_or_else(|| missing("first_name"))?,
            last_name: self.last_name.ok_or_else(|| missing("last_name"))?,
            date_of_birth: parse_date(&date_of_birth).ok_or_else(|| invalid("date_of_birth"))?,
            gender: gender.parse().map_err(|_| invalid("gender"))?,
            salary: parse_salary(&salary).ok_or_else(|| invalid("salary"))?,
            created_at: current_timestamp(),
            status: status.parse().map_err(|_| invalid("status"))?,
        })
    }
}

impl EmployeeUpdate {
    fn into_changes(self) -> Result<EmployeeChanges, AppError> {
        Ok(EmployeeChanges {
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self
                .date_of_birth
                .map(|raw| parse_date(&raw).ok_or_else(|| invalid("date_of_birth")))
                .transpose()?,
            gender: self
                .gender
                .map(|raw| raw.parse().map_err(|_| invalid("gender")))
                .transpose()?,
            salary: self
                .salary
                .map(|raw| parse_salary(&raw).ok_or_else(|| invalid("salary")))
                .transpose()?,
            status: self
                .status
                .map(|raw| raw.parse().map_err(|_| invalid("status")))
                .transpose()?,
        })
    }
}

fn find_employee<'a>(employees: &'a mut [Employee], id: &str) -> Result<&'a mut Employee, AppError> {
    employees
        .iter_mut()
        .find(|employee| employee.id == id)
        .ok_or_else(|| AppError::NotFound(id.to_string()))
}

pub async fn create_employee(
    store: web::Data<EmployeeStore>,
    new_employee: ValidatedJson<NewEmployee>,
) -> Result<HttpResponse, AppError> {
    let employee = new_employee.into_inner().into_employee()?;

    let employee = store
        .modify(move |employees| {
            employees.push(employee.clone());
            Ok(employee)
        })
        .await?;

    info!("Created employee {}", employee.id);

    Ok(HttpResponse::Created().json(EmployeeResponse {
        message: Some("Employee added successfully"),
        data: employee,
    }))
}

pub async fn get_employees(store: web::Data<EmployeeStore>) -> Result<HttpResponse, AppError> {
    let employees = store.list().await;

    Ok(HttpResponse::Ok().json(EmployeeResponse {
        message: None,
        data: employees,
    }))
}

pub async fn update_employee(
    store: web::Data<EmployeeStore>,
    path: web::Path<EmployeePath>,
    updates: ValidatedJson<EmployeeUpdate>,
) -> Result<HttpResponse, AppError> {
    let changes = updates.into_inner().into_changes()?;
    let id = path.into_inner().id;

    let employee = store
        .modify(|employees| {
            let employee = find_employee(employees, &id)?;
            employee.apply_changes(changes);
            Ok(employee.clone())
        })
        .await?;

    info!("Updated employee {}", employee.id);

    Ok(HttpResponse::Ok().json(EmployeeResponse {
        message: Some("Employee updated successfully"),
        data: employee,
    }))
}

/// Flips the stored status. The submitted value is only validated.
pub async fn update_employee_status(
    store: web::Data<EmployeeStore>,
    path: web::Path<EmployeePath>,
    _status: ValidatedJson<StatusUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner().id;

    let employee = store
        .modify(|employees| {
            let employee = find_employee(employees, &id)?;
            employee.toggle_status();
            Ok(employee.clone())
        })
        .await?;

    info!("Employee {} is now {}", employee.id, employee.status);

    Ok(HttpResponse::Ok().json(EmployeeResponse {
        message: Some("Status changed successfully"),
        data: employee,
    }))
}

pub async fn search_employees(
    store: web::Data<EmployeeStore>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let needle = match query.into_inner().q {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return Err(AppError::BadRequest("q is required".to_string())),
    };

    let employees: Vec<Employee> = store
        .list()
        .await
        .into_iter()
        .filter(|employee| employee.name_contains(&needle))
        .collect();

    Ok(HttpResponse::Ok().json(EmployeeResponse {
        message: None,
        data: employees,
    }))
}
