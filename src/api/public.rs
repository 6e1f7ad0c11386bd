// Unauthenticated endpoints behind the public registration form

use actix_web::{web, HttpResponse};
use crate::{
    api::failure,
    config::AppConfig,
    database::Database,
    models::PublicEventInfo,
    services::{
        event_service::{self, PublicEventsResponse},
        image_service::ImageHost,
        registration_service::{self, RegisterRequest, RegisterResponse},
    },
};

#[utoipa::path(
    get,
    path = "/api/v1/public/{company}/events",
    tag = "Public",
    params(("company" = String, Path, description = "Company username")),
    responses(
        (status = 200, description = "Open events of the company", body = PublicEventsResponse),
        (status = 404, description = "Unknown or disabled company")
    )
)]
pub async fn list_events(db: web::Data<Database>, company: web::Path<String>) -> HttpResponse {
    log::info!("🌐 GET /public/{}/events", company);

    match event_service::public_events(&db, &company).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure(&format!("Public events of {}", company), e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/public/{company}/events/{event}",
    tag = "Public",
    params(
        ("company" = String, Path, description = "Company username"),
        ("event" = String, Path, description = "Event name")
    ),
    responses(
        (status = 200, description = "Event open for registration", body = PublicEventInfo),
        (status = 404, description = "Unknown, disabled or closed event")
    )
)]
pub async fn get_event(db: web::Data<Database>, path: web::Path<(String, String)>) -> HttpResponse {
    let (company, event) = path.into_inner();
    log::info!("🌐 GET /public/{}/events/{}", company, event);

    match event_service::public_event(&db, &company, &event).await {
        Ok(info) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "event": info
        })),
        Err(e) => failure(&format!("Public event {}/{}", company, event), e),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/public/{company}/events/{event}/register",
    tag = "Public",
    params(
        ("company" = String, Path, description = "Company username"),
        ("event" = String, Path, description = "Event name")
    ),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration stored", body = RegisterResponse),
        (status = 400, description = "Invalid form data"),
        (status = 403, description = "Registrations closed"),
        (status = 404, description = "Unknown company or event"),
        (status = 409, description = "Email or phone already registered")
    )
)]
pub async fn register(
    db: web::Data<Database>,
    images: web::Data<dyn ImageHost>,
    config: web::Data<AppConfig>,
    path: web::Path<(String, String)>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let (company, event) = path.into_inner();
    log::info!("📝 POST /public/{}/events/{}/register - email: {}", company, event, request.email);

    match registration_service::register(&db, images.get_ref(), &config, &company, &event, request.into_inner()).await {
        Ok(registration) => {
            log::info!("✅ Registered {} for {}/{}", registration.email, company, event);
            HttpResponse::Created().json(RegisterResponse {
                success: true,
                event,
                registration,
            })
        }
        Err(e) => failure(&format!("Registration for {}/{}", company, event), e),
    }
}
