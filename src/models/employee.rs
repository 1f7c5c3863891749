use serde::{Deserialize, Deserializer, Serialize, Serializer};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    InActive,
}

impl Status {
    pub fn toggled(self) -> Self {
        match self {
            Status::Active => Status::InActive,
            Status::InActive => Status::Active,
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Status::Active),
            "InActive" => Ok(Status::InActive),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => f.write_str("Active"),
            Status::InActive => f.write_str("InActive"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Employee {
    // Files written by the old service used an upper-case key.
    #[serde(alias = "ID")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[serde(serialize_with = "serialize_salary", deserialize_with = "deserialize_salary")]
    pub salary: f64,
    pub created_at: String,
    pub status: Status,
}

/// Update body after validation. `None` means the field was not supplied.
#[derive(Debug, Default, Clone)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub salary: Option<f64>,
    pub status: Option<Status>,
}

impl Employee {
    /// Overwrites fields from `changes`. Empty strings and a zero salary
    /// count as "not supplied" and leave the stored value alone.
    pub fn apply_changes(&mut self, changes: EmployeeChanges) {
        if let Some(first_name) = changes.first_name.filter(|s| !s.is_empty()) {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name.filter(|s| !s.is_empty()) {
            self.last_name = last_name;
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(gender) = changes.gender {
            self.gender = gender;
        }
        if let Some(salary) = changes.salary.filter(|s| *s != 0.0) {
            self.salary = salary;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
    }

    pub fn toggle_status(&mut self) {
        self.status = self.status.toggled();
    }

    pub fn name_contains(&self, needle_lowercase: &str) -> bool {
        self.first_name.to_lowercase().contains(needle_lowercase)
            || self.last_name.to_lowercase().contains(needle_lowercase)
    }
}

/// Local wall-clock time as `YYYY-M-D H:M:S`, no component padded.
pub fn current_timestamp() -> String {
    format_timestamp(&Local::now())
}

fn format_timestamp(now: &DateTime<Local>) -> String {
    now.format("%Y-%-m-%-d %-H:%-M:%-S").to_string()
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%a %b %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Accepts the date spellings clients of the old service sent: ISO and
/// slash-separated dates, English month names, and full datetimes with or
/// without an offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok().map(|dt| dt.date_naive()))
}

/// Accepts a JSON number or a string holding one.
pub fn parse_salary(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{}'", raw)))
}

fn deserialize_salary<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    parse_salary(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid salary {}", raw)))
}

fn serialize_salary<S>(salary: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if salary.fract() == 0.0 && salary.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*salary as i64)
    } else {
        serializer.serialize_f64(*salary)
    }
}
