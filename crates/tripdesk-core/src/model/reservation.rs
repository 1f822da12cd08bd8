// ── Reservation domain types ──

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;

/// Lifecycle of a trip or event booking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Paid,
}

impl ReservationStatus {
    pub fn is_final(self) -> bool {
        matches!(self, Self::Cancelled | Self::Paid)
    }
}

/// The trip a reservation points at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub id: EntityId,
    pub destination: String,
}

/// The customer who made a reservation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: EntityId,
    pub name: String,
    pub lastname: String,
    pub email: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.lastname).trim().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripReservation {
    pub id: EntityId,
    pub trip: TripSummary,
    pub customer: Customer,
    pub status: ReservationStatus,
    pub number_of_people: u64,
    pub total_price: f64,
    pub payment_method: String,
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Flattened event booking, shaped for the reservations table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReservation {
    pub id: EntityId,
    pub client_first_name: String,
    pub client_last_name: String,
    pub reservation_date: Option<NaiveDate>,
    pub event_name: String,
    pub persons: u64,
    pub status: ReservationStatus,
    pub total_price: f64,
    pub payment_method: String,
    pub notes: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "Confirmed".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Confirmed
        );
        assert_eq!(ReservationStatus::Paid.to_string(), "paid");
        assert!("refunded".parse::<ReservationStatus>().is_err());
        assert!(ReservationStatus::Cancelled.is_final());
    }
}
