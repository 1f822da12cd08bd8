// ── Account domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// An end-user of the booking platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub lastname: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub travel_preferences: Vec<String>,
    pub points: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.lastname)
    }
}

/// A back-office operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub join_date: Option<DateTime<Utc>>,
    pub last_active: Option<DateTime<Utc>>,
}

/// Result of a successful admin login. The token itself goes straight to
/// the credential store and is not part of this value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginOutcome {
    pub message: String,
    pub admin: Option<Admin>,
}

/// Acknowledgement for password-recovery steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    pub message: String,
}
