use super::row::{cell, format_bool, optional_cell, parse_bool};
use serde::{Deserialize, Serialize};

/// Tab of the root spreadsheet holding one row per company
pub const COMPANIES_TAB: &str = "companies";

pub const COMPANY_HEADER: [&str; 8] = [
    "id",
    "name",
    "username",
    "password",
    "image",
    "enabled",
    "sheet_id",
    "created_at",
];

const COL_ID: usize = 0;
const COL_NAME: usize = 1;
const COL_USERNAME: usize = 2;
const COL_PASSWORD: usize = 3;
const COL_IMAGE: usize = 4;
const COL_ENABLED: usize = 5;
const COL_SHEET_ID: usize = 6;
const COL_CREATED_AT: usize = 7;

/// A tenant. Owns one spreadsheet (`sheet_id`) holding its events.
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub image: Option<String>,
    pub enabled: bool,
    pub sheet_id: String,
    pub created_at: String,
}

impl Company {
    /// Rows without a username or sheet id are skipped.
    pub fn from_row(row: &[String]) -> Option<Self> {
        let username = cell(row, COL_USERNAME).to_lowercase();
        let sheet_id = cell(row, COL_SHEET_ID);
        if username.is_empty() || sheet_id.is_empty() {
            return None;
        }

        Some(Self {
            id: cell(row, COL_ID),
            name: cell(row, COL_NAME),
            username,
            password_hash: cell(row, COL_PASSWORD),
            image: optional_cell(row, COL_IMAGE),
            enabled: parse_bool(&cell(row, COL_ENABLED)),
            sheet_id,
            created_at: cell(row, COL_CREATED_AT),
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.username.clone(),
            self.password_hash.clone(),
            self.image.clone().unwrap_or_default(),
            format_bool(self.enabled),
            self.sheet_id.clone(),
            self.created_at.clone(),
        ]
    }

    /// True when the row at hand belongs to `username`.
    pub fn row_matches_username(row: &[String], username: &str) -> bool {
        cell(row, COL_USERNAME).eq_ignore_ascii_case(username)
    }
}

/// Company as shown to the admin and company dashboards
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CompanyInfo {
    pub id: String,
    pub name: String,
    pub username: String,
    pub image: Option<String>,
    pub enabled: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<usize>,
}

impl From<&Company> for CompanyInfo {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id.clone(),
            name: company.name.clone(),
            username: company.username.clone(),
            image: company.image.clone(),
            enabled: company.enabled,
            created_at: company.created_at.clone(),
            events: None,
        }
    }
}
