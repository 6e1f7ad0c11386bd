pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod public;
pub mod registrations;
pub mod swagger;


use crate::{
    middleware::auth::AuthMiddleware,
    services::auth_service::Role,
    utils::error::AppError,
};
use actix_web::{web, HttpResponse, ResponseError};

/// Logs a failed call at a level matching who is at fault and renders it.
pub fn failure(context: &str, e: AppError) -> HttpResponse {
    if e.is_client_error() {
        log::warn!("❌ {} failed: {}", context, e);
    } else {
        log::error!("❌ {} failed: {}", context, e);
    }
    e.error_response()
}

/// Registers every route; shared by `main` and the endpoint tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(health::health_check))
        // Auth endpoints
        .service(
            web::scope("/api/v1/auth")
                .route("/login", web::post().to(auth::login))
                .route("/logout", web::post().to(auth::logout))
                .service(
                    web::resource("/session")
                        .wrap(AuthMiddleware::any())
                        .route(web::get().to(auth::session)),
                ),
        )
        // ==================== ADMIN ====================
        .service(
            web::scope("/api/v1/admin")
                .wrap(AuthMiddleware::require(Role::Admin))
                .route("/companies", web::get().to(admin::list_companies))
                .route("/companies", web::post().to(admin::create_company))
                .route("/companies/{username}", web::get().to(admin::get_company))
                .route("/companies/{username}", web::patch().to(admin::update_company))
                .route("/companies/{username}", web::delete().to(admin::delete_company)),
        )
        // ==================== COMPANY DASHBOARD ====================
        .service(
            web::scope("/api/v1/company")
                .wrap(AuthMiddleware::require(Role::Company))
                .route("/profile", web::get().to(events::get_profile))
                .route("/events", web::get().to(events::list_events))
                .route("/events", web::post().to(events::create_event))
                .route("/events/{event}", web::get().to(events::get_event))
                .route("/events/{event}", web::patch().to(events::update_event))
                .route("/events/{event}", web::delete().to(events::delete_event))
                .route("/events/{event}/registrations", web::get().to(registrations::list_registrations))
                .route("/events/{event}/registrations/{email}", web::patch().to(registrations::update_status))
                .route("/events/{event}/registrations/{email}", web::delete().to(registrations::delete_registration))
                .route("/events/{event}/export", web::get().to(registrations::export_registrations)),
        )
        // ==================== PUBLIC FORM ====================
        .service(
            web::scope("/api/v1/public")
                .route("/{company}/events", web::get().to(public::list_events))
                .route("/{company}/events/{event}", web::get().to(public::get_event))
                .route("/{company}/events/{event}/register", web::post().to(public::register)),
        );
}
