// ==================== EVENTS ====================
// Events are listed in the company spreadsheet's `events` tab; each one
// also owns a tab (same title as the event) with its registrations.

use crate::{
    config::AppConfig,
    database::Database,
    models::{Company, Event, EventInfo, PublicEventInfo, Registration, EVENTS_TAB, REGISTRATION_HEADER},
    services::{company_service, image_service::{self, ImageHost}},
    utils::{error::AppError, validation},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ==================== REQUEST/RESPONSE MODELS ====================

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateEventRequest {
    pub name: String,
    /// Data URL or base64 image
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateEventRequest {
    pub enabled: Option<bool>,
    /// New image, or "" to remove the current one
    pub image: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EventResponse {
    pub success: bool,
    pub event: EventInfo,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListEventsResponse {
    pub success: bool,
    pub events: Vec<EventInfo>,
    pub count: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PublicEventsResponse {
    pub success: bool,
    pub company: String,
    pub company_image: Option<String>,
    pub events: Vec<PublicEventInfo>,
}

// ==================== LOOKUPS ====================

/// Event row and its index in the events tab, case-insensitive by name.
pub async fn find_event(db: &Database, company: &Company, name: &str) -> Result<Option<(usize, Event)>, AppError> {
    let found = db
        .find_row(&company.sheet_id, EVENTS_TAB, |row| Event::row_matches_name(row, name))
        .await?;

    Ok(found.and_then(|(index, row)| Event::from_row(&row).map(|e| (index, e))))
}

pub async fn get_event(db: &Database, company: &Company, name: &str) -> Result<(usize, Event), AppError> {
    find_event(db, company, name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", name.trim())))
}

pub async fn count_registrations(db: &Database, company: &Company, event: &Event) -> Result<usize, AppError> {
    let rows = db.sheets().read_rows(&company.sheet_id, &event.name).await?;
    // Cleared rows come back blank and are not registrations
    Ok(rows.iter().filter_map(|row| Registration::from_row(row)).count())
}

/// Enabled company looked up for the public pages; disabled ones read as missing.
pub async fn public_company(db: &Database, username: &str) -> Result<Company, AppError> {
    match company_service::find_company(db, username).await? {
        Some((_, company)) if company.enabled => Ok(company),
        _ => Err(AppError::NotFound(format!("Company '{}' not found", username))),
    }
}

// ==================== SERVICE FUNCTIONS ====================

pub async fn list_events(db: &Database, company: &Company) -> Result<ListEventsResponse, AppError> {
    let rows = db.sheets().read_rows(&company.sheet_id, EVENTS_TAB).await?;
    let mut events = Vec::new();

    for event in rows.iter().filter_map(|row| Event::from_row(row)) {
        let registrations = count_registrations(db, company, &event).await?;
        events.push(EventInfo::new(event, registrations));
    }

    let count = events.len();
    Ok(ListEventsResponse {
        success: true,
        events,
        count,
    })
}

pub async fn event_info(db: &Database, company: &Company, name: &str) -> Result<EventInfo, AppError> {
    let (_, event) = get_event(db, company, name).await?;
    let registrations = count_registrations(db, company, &event).await?;
    Ok(EventInfo::new(event, registrations))
}

pub async fn create_event(
    db: &Database,
    images: &dyn ImageHost,
    config: &AppConfig,
    company: &Company,
    request: CreateEventRequest,
) -> Result<EventInfo, AppError> {
    let name = validation::normalize_event_name(&request.name)?;

    if find_event(db, company, &name).await?.is_some() {
        return Err(AppError::Conflict(format!("Event '{}' already exists", name)));
    }

    let image = image_service::upload_optional(
        images,
        config,
        &format!("{}-{}", company.username, name),
        request.image.as_deref(),
    )
    .await?;

    let _guard = db.write_guard().await;

    if find_event(db, company, &name).await?.is_some() {
        return Err(AppError::Conflict(format!("Event '{}' already exists", name)));
    }

    // A tab left behind by a half-finished delete still owns the title
    let tabs = db.sheets().list_tabs(&company.sheet_id).await?;
    if tabs.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
        return Err(AppError::Conflict(format!("A tab named '{}' already exists", name)));
    }

    db.sheets()
        .create_tab(&company.sheet_id, &name, &REGISTRATION_HEADER)
        .await?;

    let event = Event {
        name,
        image,
        enabled: true,
        created_at: Utc::now().to_rfc3339(),
    };

    db.sheets()
        .append_row(&company.sheet_id, EVENTS_TAB, event.to_row())
        .await?;

    log::info!("✅ Event created: {} / {}", company.username, event.name);
    Ok(EventInfo::new(event, 0))
}

pub async fn update_event(
    db: &Database,
    images: &dyn ImageHost,
    config: &AppConfig,
    company: &Company,
    name: &str,
    request: UpdateEventRequest,
) -> Result<EventInfo, AppError> {
    get_event(db, company, name).await?;

    let image = match request.image.as_deref() {
        Some(data) if data.trim().is_empty() => Some(None),
        Some(data) => Some(
            image_service::upload_optional(
                images,
                config,
                &format!("{}-{}", company.username, name.trim()),
                Some(data),
            )
            .await?,
        ),
        None => None,
    };

    let _guard = db.write_guard().await;
    let (index, mut event) = get_event(db, company, name).await?;

    if let Some(enabled) = request.enabled {
        event.enabled = enabled;
    }
    if let Some(image) = image {
        event.image = image;
    }

    db.sheets()
        .update_row(&company.sheet_id, EVENTS_TAB, index, event.to_row())
        .await?;

    let registrations = count_registrations(db, company, &event).await?;
    log::info!("✅ Event updated: {} / {}", company.username, event.name);
    Ok(EventInfo::new(event, registrations))
}

pub async fn delete_event(db: &Database, company: &Company, name: &str) -> Result<(), AppError> {
    let _guard = db.write_guard().await;
    let (index, event) = get_event(db, company, name).await?;

    db.sheets()
        .delete_row(&company.sheet_id, EVENTS_TAB, index)
        .await?;

    if let Err(e) = db.sheets().delete_tab(&company.sheet_id, &event.name).await {
        log::warn!("⚠️ Event {} removed from index but its tab remains: {}", event.name, e);
    }

    log::info!("🗑️ Event deleted: {} / {}", company.username, event.name);
    Ok(())
}

pub async fn public_events(db: &Database, company_username: &str) -> Result<PublicEventsResponse, AppError> {
    let company = public_company(db, company_username).await?;
    let rows = db.sheets().read_rows(&company.sheet_id, EVENTS_TAB).await?;

    let events = rows
        .iter()
        .filter_map(|row| Event::from_row(row))
        .filter(|event| event.enabled)
        .map(|event| PublicEventInfo {
            name: event.name,
            image: event.image,
            company: company.name.clone(),
            company_image: company.image.clone(),
        })
        .collect();

    Ok(PublicEventsResponse {
        success: true,
        company: company.name,
        company_image: company.image,
        events,
    })
}

pub async fn public_event(db: &Database, company_username: &str, name: &str) -> Result<PublicEventInfo, AppError> {
    let company = public_company(db, company_username).await?;

    match find_event(db, &company, name).await? {
        Some((_, event)) if event.enabled => Ok(PublicEventInfo {
            name: event.name,
            image: event.image,
            company: company.name,
            company_image: company.image,
        }),
        _ => Err(AppError::NotFound(format!("Event '{}' not found", name.trim()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::company_service::{
        create_company, get_company, update_company, UpdateCompanyRequest,
        tests::{create_request, memory_db, png_data_url, FakeImageHost, RefusingHost},
    };
    use base64::{engine::general_purpose::STANDARD, Engine};

    async fn company_fixture() -> (Database, Company) {
        let db = memory_db().await;
        let config = AppConfig::for_tests();
        create_company(&db, &FakeImageHost, &config, create_request("acme")).await.unwrap();
        let (_, company) = get_company(&db, "acme").await.unwrap();
        (db, company)
    }

    fn event_request(name: &str) -> CreateEventRequest {
        CreateEventRequest {
            name: name.to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_list_and_count() {
        let (db, company) = company_fixture().await;
        let config = AppConfig::for_tests();

        let png = STANDARD.encode([0x89, b'P', b'N', b'G', 0, 0]);
        let request = CreateEventRequest {
            name: "  Career Fair ".to_string(),
            image: Some(format!("data:image/png;base64,{}", png)),
        };
        let event = create_event(&db, &FakeImageHost, &config, &company, request).await.unwrap();
        assert_eq!(event.name, "Career Fair");
        assert_eq!(event.image.as_deref(), Some("https://img.test/acme-Career Fair.png"));

        db.sheets()
            .append_row(&company.sheet_id, "Career Fair", vec!["Ann".into(), "0100".into()])
            .await
            .unwrap();

        let list = list_events(&db, &company).await.unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.events[0].registrations, 1);

        let info = event_info(&db, &company, "career fair").await.unwrap();
        assert_eq!(info.registrations, 1);
    }

    #[tokio::test]
    async fn test_duplicate_and_invalid_names() {
        let (db, company) = company_fixture().await;
        let config = AppConfig::for_tests();

        create_event(&db, &FakeImageHost, &config, &company, event_request("Expo")).await.unwrap();
        let duplicate = create_event(&db, &FakeImageHost, &config, &company, event_request("EXPO")).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        let reserved = create_event(&db, &FakeImageHost, &config, &company, event_request("events")).await;
        assert!(matches!(reserved, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_disable_hides_from_public_listing() {
        let (db, company) = company_fixture().await;
        let config = AppConfig::for_tests();
        create_event(&db, &FakeImageHost, &config, &company, event_request("Expo")).await.unwrap();
        create_event(&db, &FakeImageHost, &config, &company, event_request("Hackathon")).await.unwrap();

        let update = UpdateEventRequest {
            enabled: Some(false),
            ..Default::default()
        };
        let updated = update_event(&db, &FakeImageHost, &config, &company, "expo", update).await.unwrap();
        assert!(!updated.enabled);

        let public = public_events(&db, "acme").await.unwrap();
        let names: Vec<_> = public.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Hackathon"]);

        assert!(matches!(public_event(&db, "acme", "Expo").await, Err(AppError::NotFound(_))));
        assert!(public_event(&db, "acme", "hackathon").await.is_ok());
        assert!(matches!(public_events(&db, "nobody").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_tab() {
        let (db, company) = company_fixture().await;
        let config = AppConfig::for_tests();
        create_event(&db, &FakeImageHost, &config, &company, event_request("Expo")).await.unwrap();

        delete_event(&db, &company, "Expo").await.unwrap();
        assert_eq!(list_events(&db, &company).await.unwrap().count, 0);
        assert_eq!(db.sheets().list_tabs(&company.sheet_id).await.unwrap(), vec![EVENTS_TAB]);
        assert!(matches!(delete_event(&db, &company, "Expo").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_blank_rows_are_not_counted() {
        let (db, company) = company_fixture().await;
        let config = AppConfig::for_tests();
        create_event(&db, &FakeImageHost, &config, &company, event_request("Expo")).await.unwrap();

        db.sheets().append_row(&company.sheet_id, "Expo", vec![]).await.unwrap();
        db.sheets()
            .append_row(&company.sheet_id, "Expo", vec!["".into(), "".into(), "".into()])
            .await
            .unwrap();

        let info = event_info(&db, &company, "Expo").await.unwrap();
        assert_eq!(info.registrations, 0);
    }

    #[tokio::test]
    async fn test_empty_image_removes_it() {
        let (db, company) = company_fixture().await;
        let config = AppConfig::for_tests();
        let request = CreateEventRequest {
            name: "Expo".to_string(),
            image: Some(png_data_url()),
        };
        let event = create_event(&db, &FakeImageHost, &config, &company, request).await.unwrap();
        assert!(event.image.is_some());

        let update = UpdateEventRequest {
            image: Some(" ".to_string()),
            ..Default::default()
        };
        let updated = update_event(&db, &RefusingHost, &config, &company, "Expo", update).await.unwrap();
        assert_eq!(updated.image, None);
        assert_eq!(get_event(&db, &company, "Expo").await.unwrap().1.image, None);
    }

    #[tokio::test]
    async fn test_no_upload_for_unknown_event() {
        let (db, company) = company_fixture().await;
        let config = AppConfig::for_tests();

        let update = UpdateEventRequest {
            image: Some(png_data_url()),
            ..Default::default()
        };
        let result = update_event(&db, &RefusingHost, &config, &company, "Gala", update).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_disabled_company_has_no_public_events() {
        let (db, company) = company_fixture().await;
        let config = AppConfig::for_tests();
        create_event(&db, &FakeImageHost, &config, &company, event_request("Expo")).await.unwrap();

        let disable = UpdateCompanyRequest {
            enabled: Some(false),
            ..Default::default()
        };
        update_company(&db, &FakeImageHost, &config, "acme", disable).await.unwrap();

        assert!(matches!(public_events(&db, "acme").await, Err(AppError::NotFound(_))));
        assert!(matches!(public_event(&db, "acme", "Expo").await, Err(AppError::NotFound(_))));
    }
}
