use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Registration API",
        version = "1.0.0",
        description = "Multi-tenant event registration. \n\n**Authentication:** dashboard endpoints need a session, sent as the `session` cookie set by `/api/v1/auth/login` or as a Bearer token.\n\n**Roles:**\n- `admin` manages companies\n- `company` manages its events and registrations\n- public form endpoints need no session"
    ),
    paths(
        // Auth
        crate::api::auth::login,
        crate::api::auth::logout,
        crate::api::auth::session,

        // Health
        crate::api::health::health_check,

        // Admin
        crate::api::admin::list_companies,
        crate::api::admin::create_company,
        crate::api::admin::get_company,
        crate::api::admin::update_company,
        crate::api::admin::delete_company,

        // Company dashboard
        crate::api::events::get_profile,
        crate::api::events::list_events,
        crate::api::events::create_event,
        crate::api::events::get_event,
        crate::api::events::update_event,
        crate::api::events::delete_event,
        crate::api::registrations::list_registrations,
        crate::api::registrations::update_status,
        crate::api::registrations::delete_registration,
        crate::api::registrations::export_registrations,

        // Public form
        crate::api::public::list_events,
        crate::api::public::get_event,
        crate::api::public::register,
    ),
    components(
        schemas(
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::LoginResponse,
            crate::services::auth_service::SessionResponse,
            crate::services::auth_service::Role,
            crate::api::health::HealthResponse,
            crate::models::CompanyInfo,
            crate::models::EventInfo,
            crate::models::PublicEventInfo,
            crate::models::Registration,
            crate::models::RegistrationStatus,
            crate::models::Gender,
            crate::services::company_service::CreateCompanyRequest,
            crate::services::company_service::UpdateCompanyRequest,
            crate::services::company_service::CompanyResponse,
            crate::services::company_service::ListCompaniesResponse,
            crate::services::event_service::CreateEventRequest,
            crate::services::event_service::UpdateEventRequest,
            crate::services::event_service::EventResponse,
            crate::services::event_service::ListEventsResponse,
            crate::services::event_service::PublicEventsResponse,
            crate::services::registration_service::RegisterRequest,
            crate::services::registration_service::RegisterResponse,
            crate::services::registration_service::ListRegistrationsResponse,
            crate::services::registration_service::UpdateStatusRequest,
            crate::services::registration_service::RegistrationResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout and session inspection for administrators and companies."),
        (name = "Health", description = "Health check."),
        (name = "Admin", description = "Company management. Requires the admin role."),
        (name = "Company", description = "Company profile and event management. Requires the company role."),
        (name = "Registrations", description = "Review, status changes and CSV export of an event's registrations."),
        (name = "Public", description = "Endpoints used by the public registration form."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token returned by /api/v1/auth/login"))
                        .build()
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
            );
        }
    }
}
