mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppConfig,
    services::image_service::{HttpImageHost, ImageHost},
    utils::error::AppError,
};

fn startup_error(context: &str, e: AppError) -> std::io::Error {
    log::error!("❌ {}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    log::info!("🚀 Starting Event Registration Service...");
    log::info!("📊 Store backend: {:?}", config.store_backend);

    let db = database::Database::new(&config)
        .await
        .map_err(|e| startup_error("Failed to open spreadsheet store", e))?;

    log::info!("✅ Spreadsheet store ready");

    let image_host: Arc<dyn ImageHost> = Arc::new(
        HttpImageHost::new(&config).map_err(|e| startup_error("Failed to build image host", e))?,
    );

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config.clone());
    let images_data: web::Data<dyn ImageHost> = web::Data::from(image_host);

    // Base64 images travel inside JSON bodies
    let json_limit = config.max_image_bytes * 2 + 64 * 1024;

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", config.host, config.port);

    let allowed_origins = config.allowed_origins.clone();

    // Start HTTP server
    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::CONTENT_DISPOSITION,
            ])
            .supports_credentials()
            .max_age(3600);

        let json_config = web::JsonConfig::default()
            .limit(json_limit)
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into());

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .app_data(images_data.clone())
            .app_data(json_config)
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
