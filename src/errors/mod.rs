use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use validator::ValidationErrors;
use log::error;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Validation(ValidationErrors),
    NotFound(String),
    Storage(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

#[derive(Serialize)]
struct BadRequestResponse<'a> {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Validation(errs) => write!(f, "Validation Error: {}", errs),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errs: ValidationErrors) -> Self {
        AppError::Validation(errs)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(BadRequestResponse {
                message: "Bad request",
                errors: None,
            }),
            AppError::Validation(errs) => HttpResponse::BadRequest().json(BadRequestResponse {
                message: "Bad request",
                errors: Some(errs),
            }),
            AppError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
                error: "Employee not found",
            }),
            AppError::Storage(_) => {
                // Detail stays in the log, never in the body.
                error!("{}", self);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Something went wrong",
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn storage_errors_hide_their_detail() {
        let (status, body) = body_json(AppError::Storage("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "Something went wrong" }));
    }

    #[actix_web::test]
    async fn bad_request_has_plain_message() {
        let (status, body) = body_json(AppError::BadRequest("missing q".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "message": "Bad request" }));
    }

    #[actix_web::test]
    async fn not_found_maps_to_404() {
        let (status, body) = body_json(AppError::NotFound("abc".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Employee not found");
    }

    #[test]
    fn io_errors_become_storage_errors() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, AppError::Storage(ref msg) if msg == "boom"));
    }
}
