use super::row::{cell, format_bool, optional_cell, parse_bool};
use serde::{Deserialize, Serialize};

/// Index tab inside every company spreadsheet
pub const EVENTS_TAB: &str = "events";

pub const EVENT_HEADER: [&str; 4] = ["name", "image", "enabled", "created_at"];

const COL_NAME: usize = 0;
const COL_IMAGE: usize = 1;
const COL_ENABLED: usize = 2;
const COL_CREATED_AT: usize = 3;

/// An event; its registrations live in a tab titled with `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub image: Option<String>,
    pub enabled: bool,
    pub created_at: String,
}

impl Event {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let name = cell(row, COL_NAME);
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name,
            image: optional_cell(row, COL_IMAGE),
            enabled: parse_bool(&cell(row, COL_ENABLED)),
            created_at: cell(row, COL_CREATED_AT),
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.image.clone().unwrap_or_default(),
            format_bool(self.enabled),
            self.created_at.clone(),
        ]
    }

    pub fn row_matches_name(row: &[String], name: &str) -> bool {
        cell(row, COL_NAME).eq_ignore_ascii_case(name.trim())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EventInfo {
    pub name: String,
    pub image: Option<String>,
    pub enabled: bool,
    pub created_at: String,
    pub registrations: usize,
}

impl EventInfo {
    pub fn new(event: Event, registrations: usize) -> Self {
        Self {
            name: event.name,
            image: event.image,
            enabled: event.enabled,
            created_at: event.created_at,
            registrations,
        }
    }
}

/// What the public registration form sees
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublicEventInfo {
    pub name: String,
    pub image: Option<String>,
    pub company: String,
    pub company_image: Option<String>,
}
