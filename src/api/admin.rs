use actix_web::{web, HttpResponse};
use crate::{
    api::failure,
    config::AppConfig,
    database::Database,
    middleware::auth::Claims,
    services::{
        company_service::{self, CompanyResponse, CreateCompanyRequest, ListCompaniesResponse, UpdateCompanyRequest},
        image_service::ImageHost,
    },
};

/// GET /api/v1/admin/companies
#[utoipa::path(
    get,
    path = "/api/v1/admin/companies",
    tag = "Admin",
    responses(
        (status = 200, description = "All companies", body = ListCompaniesResponse),
        (status = 403, description = "Not an administrator")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_companies(user: web::ReqData<Claims>, db: web::Data<Database>) -> HttpResponse {
    log::info!("📋 GET /admin/companies - by {}", user.sub);

    match company_service::list_companies(&db).await {
        Ok(response) => {
            log::info!("✅ Listed {} companies", response.count);
            HttpResponse::Ok().json(response)
        }
        Err(e) => failure("Listing companies", e),
    }
}

/// POST /api/v1/admin/companies
#[utoipa::path(
    post,
    path = "/api/v1/admin/companies",
    tag = "Admin",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CompanyResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already taken")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn create_company(
    db: web::Data<Database>,
    images: web::Data<dyn ImageHost>,
    config: web::Data<AppConfig>,
    request: web::Json<CreateCompanyRequest>,
) -> HttpResponse {
    log::info!("📝 POST /admin/companies - username: {}", request.username);

    match company_service::create_company(&db, images.get_ref(), &config, request.into_inner()).await {
        Ok(company) => HttpResponse::Created().json(CompanyResponse {
            success: true,
            company,
        }),
        Err(e) => failure("Creating company", e),
    }
}

/// GET /api/v1/admin/companies/{username}
#[utoipa::path(
    get,
    path = "/api/v1/admin/companies/{username}",
    tag = "Admin",
    params(("username" = String, Path, description = "Company username")),
    responses(
        (status = 200, description = "Company details", body = CompanyResponse),
        (status = 404, description = "Unknown company")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_company(db: web::Data<Database>, username: web::Path<String>) -> HttpResponse {
    log::info!("🔍 GET /admin/companies/{}", username);

    match company_service::company_info(&db, &username).await {
        Ok(company) => HttpResponse::Ok().json(CompanyResponse {
            success: true,
            company,
        }),
        Err(e) => failure(&format!("Fetching company {}", username), e),
    }
}

/// PATCH /api/v1/admin/companies/{username}
#[utoipa::path(
    patch,
    path = "/api/v1/admin/companies/{username}",
    tag = "Admin",
    params(("username" = String, Path, description = "Company username")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = CompanyResponse),
        (status = 404, description = "Unknown company")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn update_company(
    db: web::Data<Database>,
    images: web::Data<dyn ImageHost>,
    config: web::Data<AppConfig>,
    username: web::Path<String>,
    request: web::Json<UpdateCompanyRequest>,
) -> HttpResponse {
    log::info!("🔧 PATCH /admin/companies/{}", username);

    match company_service::update_company(&db, images.get_ref(), &config, &username, request.into_inner()).await {
        Ok(company) => HttpResponse::Ok().json(CompanyResponse {
            success: true,
            company,
        }),
        Err(e) => failure(&format!("Updating company {}", username), e),
    }
}

/// DELETE /api/v1/admin/companies/{username}
#[utoipa::path(
    delete,
    path = "/api/v1/admin/companies/{username}",
    tag = "Admin",
    params(("username" = String, Path, description = "Company username")),
    responses(
        (status = 200, description = "Company and its spreadsheet removed"),
        (status = 404, description = "Unknown company")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn delete_company(db: web::Data<Database>, username: web::Path<String>) -> HttpResponse {
    log::info!("🗑️  DELETE /admin/companies/{}", username);

    match company_service::delete_company(&db, &username).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true
        })),
        Err(e) => failure(&format!("Deleting company {}", username), e),
    }
}
