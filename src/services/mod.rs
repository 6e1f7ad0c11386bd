pub mod auth_service;
pub mod company_service;
pub mod event_service;
pub mod image_service;
pub mod registration_service;
