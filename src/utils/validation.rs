use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};
use crate::errors::AppError;
use crate::models::employee::{parse_date, parse_salary, Gender, Status};

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()?;
    Ok(())
}

/// JSON body that has already passed its `Validate` rules. Extraction fails
/// with a 400 before the handler body runs.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let json = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let payload = json.await?.into_inner();
            validate_payload(&payload)?;
            Ok(ValidatedJson(payload))
        })
    }
}

pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    gender
        .parse::<Gender>()
        .map(|_| ())
        .map_err(|_| invalid("gender", "Gender must be either 'male' or 'female'"))
}

pub fn validate_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<Status>()
        .map(|_| ())
        .map_err(|_| invalid("status", "Status must be either 'Active' or 'InActive'"))
}

pub fn validate_date(date: &str) -> Result<(), ValidationError> {
    parse_date(date)
        .map(|_| ())
        .ok_or_else(|| invalid("date", "Date of birth must be a valid date"))
}

pub fn validate_salary(salary: &serde_json::Value) -> Result<(), ValidationError> {
    parse_salary(salary)
        .map(|_| ())
        .ok_or_else(|| invalid("number", "Salary must be a number"))
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gender_must_be_known() {
        assert!(validate_gender("male").is_ok());
        assert!(validate_gender("female").is_ok());
        assert!(validate_gender("Male").is_err());
        assert!(validate_gender("").is_err());
    }

    #[test]
    fn status_must_be_known() {
        assert!(validate_status("Active").is_ok());
        assert!(validate_status("InActive").is_ok());
        let err = validate_status("Inactive").unwrap_err();
        assert_eq!(err.code, "status");
    }

    #[test]
    fn date_and_salary_rules() {
        assert!(validate_date("1990-01-01").is_ok());
        assert!(validate_date("1990-13-01").is_err());
        assert!(validate_salary(&json!(5000)).is_ok());
        assert!(validate_salary(&json!("5000")).is_ok());
        assert!(validate_salary(&json!(null)).is_err());
    }
}
