// Trip and event reservation documents.

use serde_json::{Value, json};

use super::NormalizeError;
use super::fields::Fields;
use crate::model::{Customer, EventReservation, ReservationStatus, TripReservation, TripSummary};

fn status(f: &Fields<'_>) -> ReservationStatus {
    f.string("status")
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

pub fn trip_reservation(value: &Value) -> Result<TripReservation, NormalizeError> {
    let f = Fields::of(value, "reservation")?;

    let trip = match f.object("tripId") {
        Some(t) => TripSummary {
            id: t.id(),
            destination: t.text("destination"),
        },
        None => TripSummary {
            id: f.reference("tripId").unwrap_or_default(),
            destination: String::new(),
        },
    };
    let customer = match f.object("userId") {
        Some(u) => Customer {
            id: u.id(),
            name: u.text("name"),
            lastname: u.text("lastname"),
            email: u.text("email"),
        },
        None => Customer {
            id: f.reference("userId").unwrap_or_default(),
            ..Customer::default()
        },
    };

    Ok(TripReservation {
        id: f.id(),
        trip,
        customer,
        status: status(&f),
        number_of_people: f.count("numberOfPeople"),
        total_price: f.number_or("totalPrice", 0.0),
        payment_method: f.text("paymentMethod"),
        notes: f.text("notes"),
        created_at: f.datetime("createdAt"),
    })
}

/// Event bookings are flattened for display: the customer's name and the
/// event title are pulled out of the populated references.
pub fn event_reservation(value: &Value) -> Result<EventReservation, NormalizeError> {
    let f = Fields::of(value, "event reservation")?;
    let user = f.object("userId");
    let event = f.object("eventId");

    Ok(EventReservation {
        id: f.id(),
        client_first_name: user
            .as_ref()
            .and_then(|u| u.string("name"))
            .unwrap_or_else(|| "Unknown".to_owned()),
        client_last_name: user
            .as_ref()
            .and_then(|u| u.string("lastname"))
            .unwrap_or_else(|| "User".to_owned()),
        reservation_date: f.date("createdAt"),
        event_name: event
            .as_ref()
            .and_then(|e| e.string("title"))
            .unwrap_or_else(|| "Unknown Event".to_owned()),
        persons: f.count("numberOfPeople"),
        status: status(&f),
        total_price: f.number_or("totalPrice", 0.0),
        payment_method: f.text("paymentMethod"),
        notes: f.text("notes"),
    })
}

pub fn status_body(status: ReservationStatus) -> Value {
    json!({ "status": status.to_string() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn populated_trip_reservation() {
        let raw = json!({
            "_id": "r1",
            "tripId": { "_id": "t1", "destination": "Tabarka" },
            "userId": { "_id": "u1", "name": "Sami", "lastname": "Trabelsi" },
            "status": "confirmed",
            "numberOfPeople": 3,
            "totalPrice": "960.5",
            "createdAt": "2025-04-02T10:00:00Z",
        });
        let r = trip_reservation(&raw).unwrap();
        assert_eq!(r.trip.destination, "Tabarka");
        assert_eq!(r.customer.full_name(), "Sami Trabelsi");
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert_eq!(r.number_of_people, 3);
        assert!((r.total_price - 960.5).abs() < f64::EPSILON);
        assert_eq!(r.payment_method, "");
    }

    #[test]
    fn unpopulated_references_and_unknown_status() {
        let raw = json!({ "_id": "r2", "tripId": "t9", "userId": "u9", "status": "refunded" });
        let r = trip_reservation(&raw).unwrap();
        assert_eq!(r.trip.id.as_str(), "t9");
        assert_eq!(r.customer.id.as_str(), "u9");
        assert_eq!(r.status, ReservationStatus::Pending);
    }

    #[test]
    fn event_reservation_is_flattened() {
        let raw = json!({
            "_id": "er1",
            "userId": { "name": "Nour" },
            "eventId": { "title": "Jazz à Carthage" },
            "createdAt": "2025-05-20T08:15:00.000Z",
            "numberOfPeople": 2,
            "status": "paid",
            "totalPrice": 70,
        });
        let r = event_reservation(&raw).unwrap();
        assert_eq!(r.client_first_name, "Nour");
        assert_eq!(r.client_last_name, "User");
        assert_eq!(r.event_name, "Jazz à Carthage");
        assert_eq!(r.reservation_date, NaiveDate::from_ymd_opt(2025, 5, 20));
        assert_eq!(r.persons, 2);
        assert_eq!(r.status, ReservationStatus::Paid);
    }

    #[test]
    fn event_reservation_defaults() {
        let r = event_reservation(&json!({})).unwrap();
        assert_eq!(r.client_first_name, "Unknown");
        assert_eq!(r.client_last_name, "User");
        assert_eq!(r.event_name, "Unknown Event");
        assert_eq!(r.persons, 0);
        assert_eq!(r.reservation_date, None);
    }

    #[test]
    fn status_body_uses_wire_name() {
        assert_eq!(
            status_body(ReservationStatus::Cancelled),
            json!({ "status": "cancelled" })
        );
    }
}
