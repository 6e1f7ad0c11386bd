use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    web, HttpResponse,
};
use crate::{
    api::failure,
    config::AppConfig,
    database::Database,
    middleware::auth::Claims,
    services::auth_service::{self, LoginRequest, LoginResponse, SessionResponse, SESSION_COOKIE},
};

fn session_cookie(config: &AppConfig, token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(CookieDuration::hours(config.session_ttl_hours))
        .finish()
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Company account disabled")
    )
)]
pub async fn login(
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/login - username: {}", request.username);

    match auth_service::login(&db, &config, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {} ({:?})", response.username, response.role);
            HttpResponse::Ok()
                .cookie(session_cookie(&config, response.token.clone()))
                .json(response)
        }
        Err(e) => failure(&format!("Login for {}", request.username), e),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout() -> HttpResponse {
    log::info!("👋 POST /auth/logout");

    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "success": true
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No valid session")
    ),
    security(
        ("session_cookie" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn session(user: web::ReqData<Claims>) -> HttpResponse {
    log::info!("👤 GET /auth/session - {}", user.sub);

    HttpResponse::Ok().json(SessionResponse {
        success: true,
        username: user.sub.clone(),
        role: user.role,
        expires_at: user.exp as i64,
    })
}
