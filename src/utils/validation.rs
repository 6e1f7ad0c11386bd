// Field validation shared by the admin, company and public endpoints

use crate::utils::error::AppError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-z0-9_-]{3,32}$").unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").unwrap();
    static ref NATIONAL_ID_RE: Regex = Regex::new(r"^[0-9]{14}$").unwrap();
}

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_EVENT_NAME_LEN: usize = 100;
pub const RESERVED_TAB: &str = "events";

/// Trims a required text field, rejecting empty values.
pub fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Lowercases and validates a company username.
pub fn normalize_username(username: &str) -> Result<String, AppError> {
    let normalized = username.trim().to_lowercase();
    if !USERNAME_RE.is_match(&normalized) {
        return Err(AppError::InvalidRequest(
            "username must be 3-32 characters of a-z, 0-9, '_' or '-'".to_string(),
        ));
    }
    Ok(normalized)
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Event names double as tab titles, so they follow the sheet title rules.
pub fn normalize_event_name(name: &str) -> Result<String, AppError> {
    let trimmed = required("name", name)?;

    if trimmed.chars().count() > MAX_EVENT_NAME_LEN {
        return Err(AppError::InvalidRequest(format!(
            "event name must be at most {} characters",
            MAX_EVENT_NAME_LEN
        )));
    }
    if trimmed.chars().any(|c| matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\')) {
        return Err(AppError::InvalidRequest(
            "event name may not contain [ ] : * ? / \\".to_string(),
        ));
    }
    if trimmed.eq_ignore_ascii_case(RESERVED_TAB) {
        return Err(AppError::InvalidRequest(format!("'{}' is a reserved name", RESERVED_TAB)));
    }
    Ok(trimmed)
}

pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let normalized = required("email", email)?.to_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(AppError::InvalidRequest("email is not valid".to_string()));
    }
    Ok(normalized)
}

/// Keeps only digits (and a leading '+'), accepting 7 to 15 digits.
pub fn normalize_phone(phone: &str) -> Result<String, AppError> {
    let trimmed = required("phone", phone)?;
    let plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    let only_allowed = trimmed
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (c == '+' && i == 0));

    if !only_allowed || digits.len() < 7 || digits.len() > 15 {
        return Err(AppError::InvalidRequest("phone is not valid".to_string()));
    }
    Ok(if plus { format!("+{}", digits) } else { digits })
}

/// Digits of a phone number, used for duplicate detection.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn validate_national_id(national_id: &str) -> Result<String, AppError> {
    let trimmed = required("national_id", national_id)?;
    if !NATIONAL_ID_RE.is_match(&trimmed) {
        return Err(AppError::InvalidRequest("national_id must be 14 digits".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert_eq!(normalize_username("  Acme_Events ").unwrap(), "acme_events");
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("has space").is_err());
    }

    #[test]
    fn test_event_name_rules() {
        assert_eq!(normalize_event_name("  Tech Day 2026 ").unwrap(), "Tech Day 2026");
        assert!(normalize_event_name("   ").is_err());
        assert!(normalize_event_name("a/b").is_err());
        assert!(normalize_event_name("Events").is_err());
        assert!(normalize_event_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(normalize_phone("+20 100-123-4567").unwrap(), "+201001234567");
        assert_eq!(normalize_phone("01001234567").unwrap(), "01001234567");
        assert!(normalize_phone("12345").is_err());
        assert_eq!(normalize_phone("1234567").unwrap(), "1234567");
        assert_eq!(normalize_phone("+123456789012345").unwrap(), "+123456789012345");
        assert!(normalize_phone("123456").is_err());
        assert!(normalize_phone("1234567890123456").is_err());
        assert!(normalize_phone("0100abc4567").is_err());
        assert_eq!(phone_digits("+20 100"), "20100");
    }

    #[test]
    fn test_email_and_national_id() {
        assert_eq!(normalize_email(" Jane@Example.COM ").unwrap(), "jane@example.com");
        assert!(normalize_email("jane@example").is_err());
        assert!(validate_national_id("29801011234567").is_ok());
        assert!(validate_national_id("2980101123456").is_err());
    }
}
