use actix_web::{error::{JsonPayloadError, PathError, QueryPayloadError}, web, HttpRequest};
use log::debug;
use crate::errors::AppError;
use crate::handlers::employee;

/// Mounts the employee API and the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api/employees")
                .route("/search", web::get().to(employee::search_employees))
                .route("", web::post().to(employee::create_employee))
                .route("", web::get().to(employee::get_employees))
                .route("/{id}", web::patch().to(employee::update_employee))
                .route("/{id}/status", web::patch().to(employee::update_employee_status)),
        );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected JSON body: {}", err);
    AppError::BadRequest(err.to_string()).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected query string: {}", err);
    AppError::BadRequest(err.to_string()).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected path: {}", err);
    AppError::BadRequest(err.to_string()).into()
}
