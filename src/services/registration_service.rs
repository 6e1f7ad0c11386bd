// ==================== REGISTRATIONS ====================
// Public sign-ups append a row to the event's tab; companies review,
// update the status of, delete and export those rows.

use crate::{
    config::AppConfig,
    database::Database,
    models::{Company, Event, Gender, Registration, RegistrationStatus, REGISTRATION_HEADER},
    services::{
        company_service,
        event_service::{self, get_event},
        image_service::{self, ImageHost},
    },
    utils::{csv, error::AppError, validation},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ==================== REQUEST/RESPONSE MODELS ====================

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub gender: String,
    pub college: String,
    pub national_id: String,
    /// Data URL or base64 image
    pub image: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub event: String,
    pub registration: Registration,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationFilter {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListRegistrationsResponse {
    pub success: bool,
    pub event: String,
    pub registrations: Vec<Registration>,
    pub count: usize,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    pub status: RegistrationStatus,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegistrationResponse {
    pub success: bool,
    pub registration: Registration,
}

/// Validated sign-up fields, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
struct ValidRegistration {
    name: String,
    phone: String,
    email: String,
    gender: Gender,
    college: String,
    national_id: String,
}

fn validate(request: &RegisterRequest) -> Result<ValidRegistration, AppError> {
    let gender = match request.gender.trim().to_lowercase().as_str() {
        "male" => Gender::Male,
        "female" => Gender::Female,
        _ => return Err(AppError::InvalidRequest("gender must be 'male' or 'female'".to_string())),
    };

    Ok(ValidRegistration {
        name: validation::required("name", &request.name)?,
        phone: validation::normalize_phone(&request.phone)?,
        email: validation::normalize_email(&request.email)?,
        gender,
        college: validation::required("college", &request.college)?,
        national_id: validation::validate_national_id(&request.national_id)?,
    })
}

/// Which field of an existing registration collides with the new one.
fn find_duplicate(existing: &[Registration], email: &str, phone: &str) -> Option<&'static str> {
    let digits = validation::phone_digits(phone);
    existing.iter().find_map(|r| {
        if r.email.eq_ignore_ascii_case(email) {
            Some("email")
        } else if !digits.is_empty() && validation::phone_digits(&r.phone) == digits {
            Some("phone")
        } else {
            None
        }
    })
}

async fn read_registrations(db: &Database, company: &Company, tab: &str) -> Result<Vec<Registration>, AppError> {
    let rows = db.sheets().read_rows(&company.sheet_id, tab).await?;
    Ok(rows.iter().filter_map(|row| Registration::from_row(row)).collect())
}

/// Row index of the registration with `email`, counted over raw sheet rows.
async fn find_registration(
    db: &Database,
    company: &Company,
    tab: &str,
    email: &str,
) -> Result<(usize, Registration), AppError> {
    let email = email.trim().to_lowercase();
    db.find_row(&company.sheet_id, tab, |row| {
        Registration::from_row(row).map_or(false, |r| r.email == email)
    })
    .await?
    .and_then(|(index, row)| Registration::from_row(&row).map(|r| (index, r)))
    .ok_or_else(|| AppError::NotFound(format!("Registration '{}' not found", email)))
}

fn ensure_unique(existing: &[Registration], valid: &ValidRegistration) -> Result<(), AppError> {
    match find_duplicate(existing, &valid.email, &valid.phone) {
        Some(field) => Err(AppError::Conflict(format!(
            "A registration with this {} already exists",
            field
        ))),
        None => Ok(()),
    }
}

/// Company and event of a public sign-up, refused unless both are enabled.
async fn open_event(db: &Database, company_username: &str, event_name: &str) -> Result<(Company, Event), AppError> {
    let (_, company) = company_service::find_company(db, company_username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company '{}' not found", company_username)))?;
    if !company.enabled {
        return Err(AppError::Forbidden("Registrations for this company are closed".to_string()));
    }

    let (_, event) = get_event(db, &company, event_name).await?;
    if !event.enabled {
        return Err(AppError::Forbidden(format!("Registrations for '{}' are closed", event.name)));
    }

    Ok((company, event))
}

// ==================== SERVICE FUNCTIONS ====================

/// Public sign-up for an event.
pub async fn register(
    db: &Database,
    images: &dyn ImageHost,
    config: &AppConfig,
    company_username: &str,
    event_name: &str,
    request: RegisterRequest,
) -> Result<Registration, AppError> {
    let (company, event) = open_event(db, company_username, event_name).await?;

    let valid = validate(&request)?;

    // Cheap check before spending an upload on a duplicate
    ensure_unique(&read_registrations(db, &company, &event.name).await?, &valid)?;

    let image = image_service::upload_optional(
        images,
        config,
        &format!("{}-{}-{}", company.username, event.name, valid.national_id),
        request.image.as_deref(),
    )
    .await?;

    let _guard = db.write_guard().await;
    // The event may have been closed or deleted while the image was uploading
    let (company, event) = open_event(db, company_username, event_name).await?;
    ensure_unique(&read_registrations(db, &company, &event.name).await?, &valid)?;

    let registration = Registration {
        name: valid.name,
        phone: valid.phone,
        email: valid.email,
        gender: valid.gender.as_str().to_string(),
        college: valid.college,
        status: RegistrationStatus::Pending,
        national_id: valid.national_id,
        timestamp: Utc::now().to_rfc3339(),
        image,
    };

    db.sheets()
        .append_row(&company.sheet_id, &event.name, registration.to_row())
        .await?;

    log::info!("✅ Registration stored: {} / {} / {}", company.username, event.name, registration.email);
    Ok(registration)
}

pub async fn list_registrations(
    db: &Database,
    company: &Company,
    event_name: &str,
    filter: &RegistrationFilter,
) -> Result<ListRegistrationsResponse, AppError> {
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<RegistrationStatus>().map_err(AppError::InvalidRequest))
        .transpose()?;

    let (_, event) = get_event(db, company, event_name).await?;
    let registrations: Vec<Registration> = read_registrations(db, company, &event.name)
        .await?
        .into_iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .collect();

    let count = registrations.len();
    Ok(ListRegistrationsResponse {
        success: true,
        event: event.name,
        registrations,
        count,
    })
}

pub async fn update_status(
    db: &Database,
    company: &Company,
    event_name: &str,
    email: &str,
    status: RegistrationStatus,
) -> Result<Registration, AppError> {
    let _guard = db.write_guard().await;
    let (_, event) = get_event(db, company, event_name).await?;
    let (index, mut registration) = find_registration(db, company, &event.name, email).await?;

    registration.status = status;
    db.sheets()
        .update_row(&company.sheet_id, &event.name, index, registration.to_row())
        .await?;

    log::info!("✅ Registration {} in {} marked {}", registration.email, event.name, status);
    Ok(registration)
}

pub async fn delete_registration(
    db: &Database,
    company: &Company,
    event_name: &str,
    email: &str,
) -> Result<(), AppError> {
    let _guard = db.write_guard().await;
    let (_, event) = get_event(db, company, event_name).await?;
    let (index, registration) = find_registration(db, company, &event.name, email).await?;

    db.sheets()
        .delete_row(&company.sheet_id, &event.name, index)
        .await?;

    log::info!("🗑️ Registration {} removed from {}", registration.email, event.name);
    Ok(())
}

/// CSV export of an event's registrations: (file name, contents).
pub async fn export_csv(db: &Database, company: &Company, event_name: &str) -> Result<(String, String), AppError> {
    let info = event_service::event_info(db, company, event_name).await?;
    let rows: Vec<Vec<String>> = read_registrations(db, company, &info.name)
        .await?
        .iter()
        .map(Registration::to_row)
        .collect();

    let file_name = format!(
        "{}-{}.csv",
        company.username,
        info.name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect::<String>()
    );

    Ok((file_name, csv::to_csv(&REGISTRATION_HEADER, &rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        company_service::{
            create_company, get_company, update_company, UpdateCompanyRequest,
            tests::{create_request, memory_db, png_data_url, FakeImageHost},
        },
        event_service::{count_registrations, create_event, delete_event, update_event, CreateEventRequest, UpdateEventRequest},
        image_service::DecodedImage,
    };
    use async_trait::async_trait;

    /// Closes or deletes the event while its image is being uploaded.
    struct RacingHost {
        db: Database,
        company: Company,
        delete: bool,
    }

    #[async_trait]
    impl ImageHost for RacingHost {
        async fn upload(&self, name: &str, image: &DecodedImage) -> Result<String, AppError> {
            if self.delete {
                delete_event(&self.db, &self.company, "Expo").await?;
            } else {
                let closed = UpdateEventRequest {
                    enabled: Some(false),
                    ..Default::default()
                };
                update_event(&self.db, &FakeImageHost, &AppConfig::for_tests(), &self.company, "Expo", closed).await?;
            }
            FakeImageHost.upload(name, image).await
        }
    }

    async fn fixture() -> (Database, Company, AppConfig) {
        let db = memory_db().await;
        let config = AppConfig::for_tests();
        create_company(&db, &FakeImageHost, &config, create_request("acme")).await.unwrap();
        let (_, company) = get_company(&db, "acme").await.unwrap();
        let request = CreateEventRequest {
            name: "Expo".to_string(),
            image: None,
        };
        create_event(&db, &FakeImageHost, &config, &company, request).await.unwrap();
        (db, company, config)
    }

    pub fn sign_up(email: &str, phone: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Mona Adel".to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            gender: "Female".to_string(),
            college: "Engineering".to_string(),
            national_id: "29801011234567".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_duplicate_detection() {
        let existing = vec![Registration {
            name: "A".into(),
            phone: "+20 100 123 4567".into(),
            email: "a@x.io".into(),
            gender: "male".into(),
            college: "C".into(),
            status: RegistrationStatus::Pending,
            national_id: "1".into(),
            timestamp: "t".into(),
            image: None,
        }];
        assert_eq!(find_duplicate(&existing, "A@X.io", "999"), Some("email"));
        assert_eq!(find_duplicate(&existing, "b@x.io", "+201001234567"), Some("phone"));
        assert_eq!(find_duplicate(&existing, "b@x.io", "01001234567"), None);
    }

    #[test]
    fn test_validation() {
        let valid = validate(&sign_up(" Mona@Example.com ", "0100-123-4567")).unwrap();
        assert_eq!(valid.email, "mona@example.com");
        assert_eq!(valid.phone, "01001234567");
        assert_eq!(valid.gender, Gender::Female);

        let mut bad_gender = sign_up("m@x.io", "01001234567");
        bad_gender.gender = "other".to_string();
        assert!(validate(&bad_gender).is_err());

        let mut missing_college = sign_up("m@x.io", "01001234567");
        missing_college.college = "  ".to_string();
        assert!(validate(&missing_college).is_err());
    }

    #[tokio::test]
    async fn test_register_and_reject_duplicates() {
        let (db, company, config) = fixture().await;

        let stored = register(&db, &FakeImageHost, &config, "acme", "expo", sign_up("mona@x.io", "01001234567"))
            .await
            .unwrap();
        assert_eq!(stored.status, RegistrationStatus::Pending);
        assert_eq!(stored.gender, "female");

        let same_email = register(&db, &FakeImageHost, &config, "acme", "Expo", sign_up("MONA@x.io", "01111111111")).await;
        assert!(matches!(same_email, Err(AppError::Conflict(_))));

        let same_phone = register(&db, &FakeImageHost, &config, "acme", "Expo", sign_up("other@x.io", "0100 123 4567")).await;
        assert!(matches!(same_phone, Err(AppError::Conflict(_))));

        let list = list_registrations(&db, &company, "Expo", &RegistrationFilter { status: None }).await.unwrap();
        assert_eq!(list.count, 1);
    }

    #[tokio::test]
    async fn test_disabled_event_or_company_rejects() {
        let (db, company, config) = fixture().await;

        let closed = UpdateEventRequest {
            enabled: Some(false),
            ..Default::default()
        };
        update_event(&db, &FakeImageHost, &config, &company, "Expo", closed).await.unwrap();
        let result = register(&db, &FakeImageHost, &config, "acme", "Expo", sign_up("a@x.io", "01001234567")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let reopened = UpdateEventRequest {
            enabled: Some(true),
            ..Default::default()
        };
        update_event(&db, &FakeImageHost, &config, &company, "Expo", reopened).await.unwrap();
        let disable_company = UpdateCompanyRequest {
            enabled: Some(false),
            ..Default::default()
        };
        update_company(&db, &FakeImageHost, &config, "acme", disable_company).await.unwrap();
        let result = register(&db, &FakeImageHost, &config, "acme", "Expo", sign_up("a@x.io", "01001234567")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let unknown = register(&db, &FakeImageHost, &config, "acme", "Gala", sign_up("a@x.io", "01001234567")).await;
        assert!(matches!(unknown, Err(AppError::Forbidden(_)) | Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_status_update_filter_and_delete() {
        let (db, company, config) = fixture().await;
        register(&db, &FakeImageHost, &config, "acme", "Expo", sign_up("a@x.io", "01001234567")).await.unwrap();
        register(&db, &FakeImageHost, &config, "acme", "Expo", sign_up("b@x.io", "01007654321")).await.unwrap();

        let updated = update_status(&db, &company, "Expo", "B@X.IO", RegistrationStatus::Accepted).await.unwrap();
        assert_eq!(updated.status, RegistrationStatus::Accepted);

        let accepted = RegistrationFilter { status: Some("accepted".to_string()) };
        let list = list_registrations(&db, &company, "Expo", &accepted).await.unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.registrations[0].email, "b@x.io");

        let bogus = RegistrationFilter { status: Some("maybe".to_string()) };
        assert!(list_registrations(&db, &company, "Expo", &bogus).await.is_err());

        delete_registration(&db, &company, "Expo", "a@x.io").await.unwrap();
        let all = list_registrations(&db, &company, "Expo", &RegistrationFilter { status: None }).await.unwrap();
        assert_eq!(all.count, 1);

        let missing = update_status(&db, &company, "Expo", "a@x.io", RegistrationStatus::Rejected).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_export_csv() {
        let (db, company, config) = fixture().await;
        let mut request = sign_up("a@x.io", "01001234567");
        request.college = "Arts, Cairo".to_string();
        register(&db, &FakeImageHost, &config, "acme", "Expo", request).await.unwrap();

        let (file_name, contents) = export_csv(&db, &company, "expo").await.unwrap();
        assert_eq!(file_name, "acme-Expo.csv");

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("name,phone,email,gender,college,status"));
        assert!(lines[1].contains("\"Arts, Cairo\""));
        assert!(lines[1].contains(",pending,"));
    }

    #[tokio::test]
    async fn test_event_closed_during_upload_rejects() {
        let (db, company, config) = fixture().await;
        let host = RacingHost {
            db: db.clone(),
            company: company.clone(),
            delete: false,
        };
        let mut request = sign_up("a@x.io", "01001234567");
        request.image = Some(png_data_url());

        let result = register(&db, &host, &config, "acme", "Expo", request).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let (_, event) = get_event(&db, &company, "Expo").await.unwrap();
        assert!(!event.enabled);
        assert_eq!(count_registrations(&db, &company, &event).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_event_deleted_during_upload_is_not_found() {
        let (db, company, config) = fixture().await;
        let host = RacingHost {
            db: db.clone(),
            company: company.clone(),
            delete: true,
        };
        let mut request = sign_up("a@x.io", "01001234567");
        request.image = Some(png_data_url());

        let result = register(&db, &host, &config, "acme", "Expo", request).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
