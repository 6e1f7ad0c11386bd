use crate::{
    config::AppConfig,
    database::Database,
    models::{Company, COMPANIES_TAB},
    utils::error::AppError,
};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Company,
}

// Session claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // username
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub jti: String,           // JWT ID
    pub aud: String,           // audience
    pub iss: String,           // issuer
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub role: Role,
    pub username: String,
    pub name: String,
    pub expires_at: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SessionResponse {
    pub success: bool,
    pub username: String,
    pub role: Role,
    pub expires_at: i64,
}

pub fn hash_password(config: &AppConfig, password: &str) -> Result<String, AppError> {
    Ok(hash(password, config.bcrypt_cost)?)
}

// Generate session token
pub fn generate_session_token(
    config: &AppConfig,
    username: &str,
    role: Role,
    company_id: Option<String>,
) -> Result<(String, i64), AppError> {
    let now = Utc::now();
    let exp = (now + Duration::hours(config.session_ttl_hours)).timestamp();

    let claims = Claims {
        sub: username.to_string(),
        role,
        company_id,
        iat: now.timestamp() as usize,
        exp: exp as usize,
        jti: Uuid::new_v4().to_string(),
        aud: config.session_audience.clone(),
        iss: config.session_issuer.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_ref()),
    )
    .map_err(|e| AppError::Config(format!("Failed to generate token: {}", e)))?;

    Ok((token, exp))
}

// Verify session token
pub fn verify_token(config: &AppConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.session_audience.as_str()]);
    validation.set_issuer(&[config.session_issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))
}

/// ADMIN_PASSWORD may be given in plain text or as a bcrypt hash.
fn verify_admin_password(config: &AppConfig, password: &str) -> Result<bool, AppError> {
    if config.admin_password.starts_with("$2") {
        Ok(verify(password, &config.admin_password)?)
    } else {
        Ok(password == config.admin_password)
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

// Admin or company login
pub async fn login(
    db: &Database,
    config: &AppConfig,
    request: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    let username = request.username.trim().to_lowercase();
    if username.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidRequest("username and password are required".to_string()));
    }

    if username == config.admin_username {
        if !verify_admin_password(config, &request.password)? {
            return Err(invalid_credentials());
        }

        let (token, expires_at) = generate_session_token(config, &username, Role::Admin, None)?;
        return Ok(LoginResponse {
            success: true,
            token,
            role: Role::Admin,
            name: "Administrator".to_string(),
            username,
            expires_at,
        });
    }

    let company = db
        .find_row(db.root_sheet_id(), COMPANIES_TAB, |row| {
            Company::row_matches_username(row, &username)
        })
        .await?
        .and_then(|(_, row)| Company::from_row(&row))
        .ok_or_else(invalid_credentials)?;

    if !verify(&request.password, &company.password_hash).unwrap_or(false) {
        return Err(invalid_credentials());
    }

    if !company.enabled {
        return Err(AppError::Forbidden("Company account is disabled".to_string()));
    }

    let (token, expires_at) =
        generate_session_token(config, &company.username, Role::Company, Some(company.id.clone()))?;

    Ok(LoginResponse {
        success: true,
        token,
        role: Role::Company,
        username: company.username,
        name: company.name,
        expires_at,
    })
}
