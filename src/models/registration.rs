use super::row::{cell, optional_cell};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const REGISTRATION_HEADER: [&str; 9] = [
    "name",
    "phone",
    "email",
    "gender",
    "college",
    "status",
    "national_id",
    "timestamp",
    "image",
];

const COL_NAME: usize = 0;
const COL_PHONE: usize = 1;
const COL_EMAIL: usize = 2;
const COL_GENDER: usize = 3;
const COL_COLLEGE: usize = 4;
const COL_STATUS: usize = 5;
const COL_NATIONAL_ID: usize = 6;
const COL_TIMESTAMP: usize = 7;
const COL_IMAGE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Accepted,
    Rejected,
    Attended,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Accepted => "accepted",
            RegistrationStatus::Rejected => "rejected",
            RegistrationStatus::Attended => "attended",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(RegistrationStatus::Pending),
            "accepted" => Ok(RegistrationStatus::Accepted),
            "rejected" => Ok(RegistrationStatus::Rejected),
            "attended" => Ok(RegistrationStatus::Attended),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// One registrant of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub gender: String,
    pub college: String,
    pub status: RegistrationStatus,
    pub national_id: String,
    pub timestamp: String,
    pub image: Option<String>,
}

impl Registration {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let email = cell(row, COL_EMAIL).to_lowercase();
        let phone = cell(row, COL_PHONE);
        if email.is_empty() && phone.is_empty() {
            return None;
        }

        // Cells edited by hand in the sheet may hold anything
        let status = cell(row, COL_STATUS)
            .parse()
            .unwrap_or(RegistrationStatus::Pending);

        Some(Self {
            name: cell(row, COL_NAME),
            phone,
            email,
            gender: cell(row, COL_GENDER),
            college: cell(row, COL_COLLEGE),
            status,
            national_id: cell(row, COL_NATIONAL_ID),
            timestamp: cell(row, COL_TIMESTAMP),
            image: optional_cell(row, COL_IMAGE),
        })
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.phone.clone(),
            self.email.clone(),
            self.gender.clone(),
            self.college.clone(),
            self.status.to_string(),
            self.national_id.clone(),
            self.timestamp.clone(),
            self.image.clone().unwrap_or_default(),
        ]
    }
}
