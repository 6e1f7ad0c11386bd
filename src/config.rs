use crate::utils::error::AppError;
use std::env;

/// Which spreadsheet backend the service talks to.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Google,
    Memory,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub root_sheet_id: String,
    pub service_account_email: String,
    pub private_key: String,
    pub share_with_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub admin_username: String,
    pub admin_password: String,
    pub session_secret: String,
    pub bcrypt_cost: u32,
    pub session_ttl_hours: i64,
    pub session_issuer: String,
    pub session_audience: String,
    pub cookie_secure: bool,
    pub allowed_origins: Vec<String>,
    pub store_backend: StoreBackend,
    pub google: Option<GoogleConfig>,
    pub image_host_url: String,
    pub image_host_key: Option<String>,
    pub max_image_bytes: usize,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("{} must be set", name)))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let store_backend = match var_or("STORE_BACKEND", "google").to_lowercase().as_str() {
            "google" => StoreBackend::Google,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::Config(format!(
                    "STORE_BACKEND must be 'google' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let google = if store_backend == StoreBackend::Google {
            Some(GoogleConfig {
                root_sheet_id: required_var("ROOT_SHEET_ID")?,
                service_account_email: required_var("GOOGLE_SERVICE_ACCOUNT_EMAIL")?,
                // .env files usually carry the PEM on one line with literal \n
                private_key: required_var("GOOGLE_PRIVATE_KEY")?.replace("\\n", "\n"),
                share_with_email: optional_var("SHARE_WITH_EMAIL"),
            })
        } else {
            None
        };

        let allowed_origins = var_or("ALLOWED_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", 3002)?,
            admin_username: var_or("ADMIN_USERNAME", "admin").trim().to_lowercase(),
            admin_password: required_var("ADMIN_PASSWORD")?,
            session_secret: required_var("SESSION_SECRET")?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", 12)?,
            session_issuer: var_or("SESSION_ISSUER", "event-registration"),
            session_audience: var_or("SESSION_AUDIENCE", "event-registration-web"),
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
            allowed_origins,
            store_backend,
            google,
            image_host_url: var_or("IMAGE_HOST_URL", "https://api.imgbb.com/1/upload"),
            image_host_key: optional_var("IMAGE_HOST_KEY"),
            max_image_bytes: parse_var("MAX_IMAGE_BYTES", 5 * 1024 * 1024)?,
        })
    }

    /// Configuration used by unit tests: memory store, no image host.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            admin_username: "admin".to_string(),
            admin_password: "admin-password".to_string(),
            session_secret: "test-secret".to_string(),
            bcrypt_cost: 4,
            session_ttl_hours: 1,
            session_issuer: "event-registration".to_string(),
            session_audience: "event-registration-web".to_string(),
            cookie_secure: false,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            store_backend: StoreBackend::Memory,
            google: None,
            image_host_url: "http://localhost/upload".to_string(),
            image_host_key: None,
            max_image_bytes: 1024,
        }
    }
}
