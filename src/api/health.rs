use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use crate::database::Database;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the spreadsheet store cannot be read
    pub status: String,
    pub service: String,
    pub version: String,
    pub store_reachable: bool,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and spreadsheet store are up", body = HealthResponse),
        (status = 503, description = "Spreadsheet store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(db: web::Data<Database>) -> HttpResponse {
    let store_reachable = match db.sheets().list_tabs(db.root_sheet_id()).await {
        Ok(_) => true,
        Err(e) => {
            log::error!("❌ Health check could not read the root spreadsheet: {}", e);
            false
        }
    };

    let body = HealthResponse {
        status: if store_reachable { "healthy" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_reachable,
        timestamp: chrono::Utc::now().timestamp(),
    };

    if store_reachable {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
