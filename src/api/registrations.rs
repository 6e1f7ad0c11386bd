use actix_web::{http::header, web, HttpResponse};
use crate::{
    api::{events::session_company, failure},
    database::Database,
    middleware::auth::Claims,
    services::registration_service::{
        self, ListRegistrationsResponse, RegistrationFilter, RegistrationResponse, UpdateStatusRequest,
    },
};

/// GET /api/v1/company/events/{event}/registrations
#[utoipa::path(
    get,
    path = "/api/v1/company/events/{event}/registrations",
    tag = "Registrations",
    params(
        ("event" = String, Path, description = "Event name"),
        ("status" = Option<String>, Query, description = "pending, accepted, rejected or attended")
    ),
    responses(
        (status = 200, description = "Registrations of the event", body = ListRegistrationsResponse),
        (status = 404, description = "Unknown event")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_registrations(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    event: web::Path<String>,
    filter: web::Query<RegistrationFilter>,
) -> HttpResponse {
    log::info!("📋 GET /company/events/{}/registrations - {}", event, user.sub);
    let company = session_company!(db, user);

    match registration_service::list_registrations(&db, &company, &event, &filter).await {
        Ok(response) => {
            log::info!("✅ Listed {} registrations for {}", response.count, response.event);
            HttpResponse::Ok().json(response)
        }
        Err(e) => failure(&format!("Listing registrations of {}", event), e),
    }
}

/// PATCH /api/v1/company/events/{event}/registrations/{email}
#[utoipa::path(
    patch,
    path = "/api/v1/company/events/{event}/registrations/{email}",
    tag = "Registrations",
    params(
        ("event" = String, Path, description = "Event name"),
        ("email" = String, Path, description = "Registrant email")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = RegistrationResponse),
        (status = 404, description = "Unknown event or registration")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn update_status(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<(String, String)>,
    request: web::Json<UpdateStatusRequest>,
) -> HttpResponse {
    let (event, email) = path.into_inner();
    log::info!("🔧 PATCH /company/events/{}/registrations/{} -> {}", event, email, request.status);
    let company = session_company!(db, user);

    match registration_service::update_status(&db, &company, &event, &email, request.status).await {
        Ok(registration) => HttpResponse::Ok().json(RegistrationResponse {
            success: true,
            registration,
        }),
        Err(e) => failure(&format!("Updating registration {}", email), e),
    }
}

/// DELETE /api/v1/company/events/{event}/registrations/{email}
#[utoipa::path(
    delete,
    path = "/api/v1/company/events/{event}/registrations/{email}",
    tag = "Registrations",
    params(
        ("event" = String, Path, description = "Event name"),
        ("email" = String, Path, description = "Registrant email")
    ),
    responses(
        (status = 200, description = "Registration removed"),
        (status = 404, description = "Unknown event or registration")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn delete_registration(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (event, email) = path.into_inner();
    log::info!("🗑️  DELETE /company/events/{}/registrations/{}", event, email);
    let company = session_company!(db, user);

    match registration_service::delete_registration(&db, &company, &event, &email).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true
        })),
        Err(e) => failure(&format!("Deleting registration {}", email), e),
    }
}

/// GET /api/v1/company/events/{event}/export
#[utoipa::path(
    get,
    path = "/api/v1/company/events/{event}/export",
    tag = "Registrations",
    params(("event" = String, Path, description = "Event name")),
    responses(
        (status = 200, description = "CSV file with every registration", body = String, content_type = "text/csv"),
        (status = 404, description = "Unknown event")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn export_registrations(
    user: web::ReqData<Claims>,
    db: web::Data<Database>,
    event: web::Path<String>,
) -> HttpResponse {
    log::info!("📤 GET /company/events/{}/export - {}", event, user.sub);
    let company = session_company!(db, user);

    match registration_service::export_csv(&db, &company, &event).await {
        Ok((file_name, contents)) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ))
            .body(contents),
        Err(e) => failure(&format!("Exporting {}", event), e),
    }
}
