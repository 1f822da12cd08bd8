// Trip and event documents.

use serde_json::Value;
use tripdesk_api::FormPayload;

use super::NormalizeError;
use super::fields::Fields;
use crate::model::{Event, Trip};
use crate::requests::{EventInput, TripInput};

pub fn trip(value: &Value) -> Result<Trip, NormalizeError> {
    let f = Fields::of(value, "trip")?;
    Ok(Trip {
        id: f.id(),
        destination: f.text("destination"),
        description: f.text("description"),
        start_date: f.date("debutDate").or_else(|| f.date("startDate")),
        end_date: f.date("endDate"),
        price: f.number_or("price", 0.0),
        reduction: f.number_or("reduction", 0.0),
        is_available: f
            .bool("isActive")
            .or_else(|| f.bool("isAvailable"))
            .unwrap_or(false),
        trip_type: f.text("tripType"),
        image: f.string("image"),
        created_at: f.datetime("createdAt"),
        updated_at: f.datetime("updatedAt"),
    })
}

pub fn trip_form(input: &TripInput) -> FormPayload {
    FormPayload::new()
        .text("destination", input.destination.trim())
        .text("description", input.description.trim())
        .text_opt("debutDate", input.start_date.map(|d| d.to_string()))
        .text_opt("endDate", input.end_date.map(|d| d.to_string()))
        .text("price", input.price.to_string())
        .text("reduction", input.reduction.to_string())
        .text("isActive", input.is_available.to_string())
        .text("tripType", input.trip_type.trim())
        .file_opt("image", input.image.clone())
}

pub fn event(value: &Value) -> Result<Event, NormalizeError> {
    let f = Fields::of(value, "event")?;
    Ok(Event {
        id: f.id(),
        title: f.text("title"),
        description: f.text("description"),
        location: f.text("location"),
        date: f.date("date"),
        time: f.text("time"),
        price: f.number_or("price", 0.0),
        is_active: f.bool_or("isActive", false),
        image: f.string("image"),
        created_at: f.datetime("createdAt"),
        updated_at: f.datetime("updatedAt"),
    })
}

pub fn event_form(input: &EventInput) -> FormPayload {
    FormPayload::new()
        .text("title", input.title.trim())
        .text("description", input.description.trim())
        .text("location", input.location.trim())
        .text_opt("date", input.date.map(|d| d.to_string()))
        .text("time", input.time.trim())
        .text("price", input.price.to_string())
        .text("isActive", input.is_active.to_string())
        .file_opt("image", input.image.clone())
}
