use actix_web::{web, HttpResponse};
use crate::{
    api::failure,
    config::AppConfig,
    database::Database,
    middleware::auth::Claims,
    models::CompanyInfo,
    services::{
        company_service,
        event_service::{self, CreateEventRequest, EventResponse, ListEventsResponse, UpdateEventRequest},
        image_service::ImageHost,
    },
};

/// Resolves the company of the current session or returns the error response.
macro_rules! session_company {
    ($db:expr, $user:expr) => {
        match $crate::services::company_service::session_company(&$db, &$user).await {
            Ok(company) => company,
            Err(e) => return $crate::api::failure("Company session", e),
        }
    };
}

pub(crate) use session_company;

/// GET /api/v1/company/profile
#[utoipa::path(
    get,
    path = "/api/v1/company/profile",
    tag = "Company",
    responses(
        (status = 200, description = "Profile of the logged-in company", body = CompanyInfo),
        (status = 401, description = "No valid company session")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_profile(user: web::ReqData<Claims>, db: web::Data<Database>) -> HttpResponse {
    log::info!("👤 GET /company/profile - {}", user.sub);
    let company = session_company!(db, user);

    match company_service::company_info(&db, &company.username).await {
        Ok(info) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "company": info
        })),
        Err(e) => failure("Fetching profile", e),
    }
}

/// GET /api/v1/company/events
#[utoipa::path(
    get,
    path = "/api/v1/company/events",
    tag = "Company",
    responses(
        (status = 200, description = "Events with registration counts", body = ListEventsResponse)
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_events(user: web::ReqData<Claims>, db: web::Data<Database>) -> HttpResponse {
    log::info!("📋 GET /company/events - {}", user.sub);
    let company = session_company!(db, user);

    match event_service::list_events(&db, &company).await {
        Ok(response) => {
            log::info!("✅ Listed {} events for {}", response.count, company.username);
            HttpResponse::Ok().json(response)
        }
        Err(e) => failure("Listing events", e),
    }
}

/// POST /api/v1/company/events
#[utoipa::path(
    post,
    path = "/api/v1/company/events",
    tag = "Company",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Invalid event name or image"),
        (status = 409, description = "Event already exists")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn create_event(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    images: web::Data<dyn ImageHost>,
    config: web::Data<AppConfig>,
    request: web::Json<CreateEventRequest>,
) -> HttpResponse {
    log::info!("📝 POST /company/events - {} creating '{}'", user.sub, request.name);
    let company = session_company!(db, user);

    match event_service::create_event(&db, images.get_ref(), &config, &company, request.into_inner()).await {
        Ok(event) => HttpResponse::Created().json(EventResponse { success: true, event }),
        Err(e) => failure("Creating event", e),
    }
}

/// GET /api/v1/company/events/{event}
#[utoipa::path(
    get,
    path = "/api/v1/company/events/{event}",
    tag = "Company",
    params(("event" = String, Path, description = "Event name")),
    responses(
        (status = 200, description = "Event details", body = EventResponse),
        (status = 404, description = "Unknown event")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_event(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    event: web::Path<String>,
) -> HttpResponse {
    log::info!("🔍 GET /company/events/{} - {}", event, user.sub);
    let company = session_company!(db, user);

    match event_service::event_info(&db, &company, &event).await {
        Ok(event) => HttpResponse::Ok().json(EventResponse { success: true, event }),
        Err(e) => failure(&format!("Fetching event {}", event), e),
    }
}

/// PATCH /api/v1/company/events/{event}
#[utoipa::path(
    patch,
    path = "/api/v1/company/events/{event}",
    tag = "Company",
    params(("event" = String, Path, description = "Event name")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 404, description = "Unknown event")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn update_event(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    images: web::Data<dyn ImageHost>,
    config: web::Data<AppConfig>,
    event: web::Path<String>,
    request: web::Json<UpdateEventRequest>,
) -> HttpResponse {
    log::info!("🔧 PATCH /company/events/{} - {}", event, user.sub);
    let company = session_company!(db, user);

    match event_service::update_event(&db, images.get_ref(), &config, &company, &event, request.into_inner()).await {
        Ok(updated) => HttpResponse::Ok().json(EventResponse {
            success: true,
            event: updated,
        }),
        Err(e) => failure(&format!("Updating event {}", event), e),
    }
}

/// DELETE /api/v1/company/events/{event}
#[utoipa::path(
    delete,
    path = "/api/v1/company/events/{event}",
    tag = "Company",
    params(("event" = String, Path, description = "Event name")),
    responses(
        (status = 200, description = "Event and its registrations removed"),
        (status = 404, description = "Unknown event")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn delete_event(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    event: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️  DELETE /company/events/{} - {}", event, user.sub);
    let company = session_company!(db, user);

    match event_service::delete_event(&db, &company, &event).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true
        })),
        Err(e) => failure(&format!("Deleting event {}", event), e),
    }
}
