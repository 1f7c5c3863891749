mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod utils;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use crate::config::AppConfig;
use crate::db::EmployeeStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;

    let store = web::Data::new(EmployeeStore::new(config.data_file.clone()));
    info!("Using employee file {}", store.path().display());

    let address = config.bind_address();
    info!("Server listening on {}", address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await
}
