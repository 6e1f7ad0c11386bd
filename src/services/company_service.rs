// ==================== COMPANIES (ADMIN) ====================
// One row per company in the root spreadsheet's `companies` tab; each
// company gets its own spreadsheet with an `events` index tab.

use crate::{
    config::AppConfig,
    database::Database,
    models::{Company, CompanyInfo, COMPANIES_TAB, EVENTS_TAB, EVENT_HEADER},
    services::{auth_service::{hash_password, Claims}, image_service::{self, ImageHost}},
    utils::{error::AppError, validation},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==================== REQUEST/RESPONSE MODELS ====================

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    /// Data URL or base64 image
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub password: Option<String>,
    pub enabled: Option<bool>,
    /// New image, or "" to remove the current one
    pub image: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CompanyResponse {
    pub success: bool,
    pub company: CompanyInfo,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListCompaniesResponse {
    pub success: bool,
    pub companies: Vec<CompanyInfo>,
    pub count: usize,
}

// ==================== LOOKUPS ====================

/// Company row and its index, by username.
pub async fn find_company(db: &Database, username: &str) -> Result<Option<(usize, Company)>, AppError> {
    let username = username.trim().to_lowercase();
    let found = db
        .find_row(db.root_sheet_id(), COMPANIES_TAB, |row| {
            Company::row_matches_username(row, &username)
        })
        .await?;

    Ok(found.and_then(|(index, row)| Company::from_row(&row).map(|c| (index, c))))
}

pub async fn get_company(db: &Database, username: &str) -> Result<(usize, Company), AppError> {
    find_company(db, username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company '{}' not found", username)))
}

/// The company behind a company session. Sessions of companies that were
/// disabled, deleted or re-created since login are refused.
pub async fn session_company(db: &Database, claims: &Claims) -> Result<Company, AppError> {
    let company = find_company(db, &claims.sub)
        .await?
        .map(|(_, company)| company)
        .ok_or_else(|| AppError::Unauthorized("Company no longer exists".to_string()))?;

    if claims.company_id.as_deref() != Some(company.id.as_str()) {
        return Err(AppError::Unauthorized("Session does not match company".to_string()));
    }
    if !company.enabled {
        return Err(AppError::Unauthorized("Company account is disabled".to_string()));
    }

    Ok(company)
}

async fn count_events(db: &Database, company: &Company) -> Result<usize, AppError> {
    let rows = db.sheets().read_rows(&company.sheet_id, EVENTS_TAB).await?;
    Ok(rows.iter().filter(|row| row.first().map_or(false, |c| !c.trim().is_empty())).count())
}

// ==================== SERVICE FUNCTIONS ====================

pub async fn list_companies(db: &Database) -> Result<ListCompaniesResponse, AppError> {
    let rows = db.sheets().read_rows(db.root_sheet_id(), COMPANIES_TAB).await?;
    let mut companies = Vec::new();

    for company in rows.iter().filter_map(|row| Company::from_row(row)) {
        let mut info = CompanyInfo::from(&company);
        info.events = match count_events(db, &company).await {
            Ok(count) => Some(count),
            Err(e) => {
                log::warn!("⚠️ Could not count events of {}: {}", company.username, e);
                None
            }
        };
        companies.push(info);
    }

    let count = companies.len();
    Ok(ListCompaniesResponse {
        success: true,
        companies,
        count,
    })
}

pub async fn create_company(
    db: &Database,
    images: &dyn ImageHost,
    config: &AppConfig,
    request: CreateCompanyRequest,
) -> Result<CompanyInfo, AppError> {
    let name = validation::required("name", &request.name)?;
    let username = validation::normalize_username(&request.username)?;
    validation::validate_password(&request.password)?;

    if username == config.admin_username {
        return Err(AppError::Conflict(format!("Username '{}' is reserved", username)));
    }

    // Cheap check before spending an upload on a taken username
    if find_company(db, &username).await?.is_some() {
        return Err(AppError::Conflict(format!("Username '{}' is already taken", username)));
    }

    let image = image_service::upload_optional(
        images,
        config,
        &format!("company-{}", username),
        request.image.as_deref(),
    )
    .await?;
    let password_hash = hash_password(config, &request.password)?;

    let _guard = db.write_guard().await;

    if find_company(db, &username).await?.is_some() {
        return Err(AppError::Conflict(format!("Username '{}' is already taken", username)));
    }

    let sheet_id = db
        .sheets()
        .create_book(&format!("{} ({})", name, username), EVENTS_TAB, &EVENT_HEADER)
        .await?;

    let company = Company {
        id: Uuid::new_v4().to_string(),
        name,
        username,
        password_hash,
        image,
        enabled: true,
        sheet_id,
        created_at: Utc::now().to_rfc3339(),
    };

    db.sheets()
        .append_row(db.root_sheet_id(), COMPANIES_TAB, company.to_row())
        .await?;

    log::info!("✅ Company created: {} ({})", company.username, company.id);

    let mut info = CompanyInfo::from(&company);
    info.events = Some(0);
    Ok(info)
}

pub async fn company_info(db: &Database, username: &str) -> Result<CompanyInfo, AppError> {
    let (_, company) = get_company(db, username).await?;
    let mut info = CompanyInfo::from(&company);
    info.events = Some(count_events(db, &company).await?);
    Ok(info)
}

pub async fn update_company(
    db: &Database,
    images: &dyn ImageHost,
    config: &AppConfig,
    username: &str,
    request: UpdateCompanyRequest,
) -> Result<CompanyInfo, AppError> {
    let name = request
        .name
        .as_deref()
        .map(|n| validation::required("name", n))
        .transpose()?;

    let password_hash = match request.password.as_deref() {
        Some(password) => {
            validation::validate_password(password)?;
            Some(hash_password(config, password)?)
        }
        None => None,
    };

    get_company(db, username).await?;

    // Some("") removes the image, Some(data) replaces it
    let image = match request.image.as_deref() {
        Some(data) if data.trim().is_empty() => Some(None),
        Some(data) => Some(
            image_service::upload_optional(images, config, &format!("company-{}", username), Some(data))
                .await?,
        ),
        None => None,
    };

    let _guard = db.write_guard().await;
    let (index, mut company) = get_company(db, username).await?;

    if let Some(name) = name {
        company.name = name;
    }
    if let Some(password_hash) = password_hash {
        company.password_hash = password_hash;
    }
    if let Some(enabled) = request.enabled {
        company.enabled = enabled;
    }
    if let Some(image) = image {
        company.image = image;
    }

    db.sheets()
        .update_row(db.root_sheet_id(), COMPANIES_TAB, index, company.to_row())
        .await?;

    log::info!("✅ Company updated: {}", company.username);
    Ok(CompanyInfo::from(&company))
}

pub async fn delete_company(db: &Database, username: &str) -> Result<(), AppError> {
    let _guard = db.write_guard().await;
    let (index, company) = get_company(db, username).await?;

    db.sheets()
        .delete_row(db.root_sheet_id(), COMPANIES_TAB, index)
        .await?;

    if let Err(e) = db.sheets().delete_book(&company.sheet_id).await {
        log::warn!("⚠️ Company {} removed but its spreadsheet was not deleted: {}", company.username, e);
    }

    log::info!("🗑️ Company deleted: {}", company.username);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::{MemoryBackend, SheetBackend};
    use crate::models::COMPANY_HEADER;
    use crate::services::image_service::DecodedImage;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Image host double that hands out predictable URLs
    pub struct FakeImageHost;

    #[async_trait]
    impl ImageHost for FakeImageHost {
        async fn upload(&self, name: &str, image: &DecodedImage) -> Result<String, AppError> {
            Ok(format!("https://img.test/{}.{}", name, image.mime.trim_start_matches("image/")))
        }
    }

    /// Image host that is never expected to be reached
    pub struct RefusingHost;

    #[async_trait]
    impl ImageHost for RefusingHost {
        async fn upload(&self, _name: &str, _image: &DecodedImage) -> Result<String, AppError> {
            Err(AppError::Upstream("image host should not be called".to_string()))
        }
    }

    pub fn png_data_url() -> String {
        use base64::{engine::general_purpose::STANDARD, Engine};
        format!("data:image/png;base64,{}", STANDARD.encode([0x89, b'P', b'N', b'G', 0, 0]))
    }

    pub async fn memory_db() -> Database {
        let backend = Arc::new(MemoryBackend::new());
        let root = backend.create_book("root", COMPANIES_TAB, &COMPANY_HEADER).await.unwrap();
        Database::with_backend(backend, &root)
    }

    pub fn create_request(username: &str) -> CreateCompanyRequest {
        CreateCompanyRequest {
            name: "Acme Events".to_string(),
            username: username.to_string(),
            password: "password-123".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = memory_db().await;
        let config = AppConfig::for_tests();

        let info = create_company(&db, &FakeImageHost, &config, create_request("Acme")).await.unwrap();
        assert_eq!(info.username, "acme");
        assert!(info.enabled);

        let list = list_companies(&db).await.unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.companies[0].events, Some(0));

        let (_, company) = get_company(&db, "ACME").await.unwrap();
        let tabs = db.sheets().list_tabs(&company.sheet_id).await.unwrap();
        assert_eq!(tabs, vec![EVENTS_TAB.to_string()]);
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let db = memory_db().await;
        let config = AppConfig::for_tests();

        create_company(&db, &FakeImageHost, &config, create_request("acme")).await.unwrap();
        let duplicate = create_company(&db, &FakeImageHost, &config, create_request("ACME")).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        let reserved = create_company(&db, &FakeImageHost, &config, create_request("admin")).await;
        assert!(matches!(reserved, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let db = memory_db().await;
        let config = AppConfig::for_tests();

        let mut short_password = create_request("acme");
        short_password.password = "short".to_string();
        assert!(create_company(&db, &FakeImageHost, &config, short_password).await.is_err());

        let mut bad_image = create_request("acme");
        bad_image.image = Some("data:image/png;base64,aGVsbG8=".to_string());
        let result = create_company(&db, &FakeImageHost, &config, bad_image).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));

        assert_eq!(list_companies(&db).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = memory_db().await;
        let config = AppConfig::for_tests();
        create_company(&db, &FakeImageHost, &config, create_request("acme")).await.unwrap();

        let update = UpdateCompanyRequest {
            name: Some("Acme Intl".to_string()),
            enabled: Some(false),
            ..Default::default()
        };
        let info = update_company(&db, &FakeImageHost, &config, "acme", update).await.unwrap();
        assert_eq!(info.name, "Acme Intl");
        assert!(!info.enabled);

        delete_company(&db, "acme").await.unwrap();
        assert!(find_company(&db, "acme").await.unwrap().is_none());
        assert!(matches!(delete_company(&db, "acme").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_image_removes_it() {
        let db = memory_db().await;
        let config = AppConfig::for_tests();
        let mut request = create_request("acme");
        request.image = Some(png_data_url());
        let info = create_company(&db, &FakeImageHost, &config, request).await.unwrap();
        assert_eq!(info.image.as_deref(), Some("https://img.test/company-acme.png"));

        let update = UpdateCompanyRequest {
            image: Some(String::new()),
            ..Default::default()
        };
        let info = update_company(&db, &RefusingHost, &config, "acme", update).await.unwrap();
        assert_eq!(info.image, None);
        assert_eq!(get_company(&db, "acme").await.unwrap().1.image, None);
    }

    #[tokio::test]
    async fn test_delete_removes_spreadsheet() {
        let db = memory_db().await;
        let config = AppConfig::for_tests();
        create_company(&db, &FakeImageHost, &config, create_request("acme")).await.unwrap();
        let (_, company) = get_company(&db, "acme").await.unwrap();

        delete_company(&db, "acme").await.unwrap();
        assert!(db.sheets().list_tabs(&company.sheet_id).await.is_err());
    }

    #[tokio::test]
    async fn test_no_upload_for_taken_or_unknown_company() {
        let db = memory_db().await;
        let config = AppConfig::for_tests();
        create_company(&db, &FakeImageHost, &config, create_request("acme")).await.unwrap();

        let mut duplicate = create_request("acme");
        duplicate.image = Some(png_data_url());
        let result = create_company(&db, &RefusingHost, &config, duplicate).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let update = UpdateCompanyRequest {
            image: Some(png_data_url()),
            ..Default::default()
        };
        let result = update_company(&db, &RefusingHost, &config, "nobody", update).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    fn company_claims(config: &AppConfig, company: &Company) -> Claims {
        let (token, _) = crate::services::auth_service::generate_session_token(
            config,
            &company.username,
            crate::services::auth_service::Role::Company,
            Some(company.id.clone()),
        )
        .unwrap();
        crate::services::auth_service::verify_token(config, &token).unwrap()
    }

    #[tokio::test]
    async fn test_session_of_deleted_or_recreated_company() {
        let db = memory_db().await;
        let config = AppConfig::for_tests();
        create_company(&db, &FakeImageHost, &config, create_request("acme")).await.unwrap();
        let (_, company) = get_company(&db, "acme").await.unwrap();
        let claims = company_claims(&config, &company);
        assert_eq!(session_company(&db, &claims).await.unwrap().id, company.id);

        delete_company(&db, "acme").await.unwrap();
        let deleted = session_company(&db, &claims).await;
        assert!(matches!(deleted, Err(AppError::Unauthorized(_))));

        create_company(&db, &FakeImageHost, &config, create_request("acme")).await.unwrap();
        let recreated = session_company(&db, &claims).await;
        assert!(matches!(recreated, Err(AppError::Unauthorized(_))));
    }
}
