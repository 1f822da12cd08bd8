// ── Trip & event domain types ──

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// A bookable trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: EntityId,
    pub destination: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub price: f64,
    /// Discount in percent.
    pub reduction: f64,
    pub is_available: bool,
    pub trip_type: String,
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Trip {
    /// Price after the percentage reduction.
    pub fn discounted_price(&self) -> f64 {
        self.price * (1.0 - self.reduction.clamp(0.0, 100.0) / 100.0)
    }

    /// Length of the trip in days, when both dates are known.
    pub fn duration_days(&self) -> Option<i64> {
        Some((self.end_date? - self.start_date?).num_days())
    }
}

/// A one-off event (concert, excursion, workshop).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: Option<NaiveDate>,
    /// Free-form start time as entered by the organiser (`"18:30"`).
    pub time: String,
    pub price: f64,
    pub is_active: bool,
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
