//! Backend ⇄ frontend shape translation.
//!
//! Every entity has a to-frontend function (`trip`, `survey`, ...) that maps
//! a raw JSON document into the stable model type, and, where the entity is
//! writable, a to-backend function (`trip_form`, `survey_body`, ...) that
//! encodes an input with backend field names.
//!
//! To-frontend functions are total over JSON objects: absent or malformed
//! fields are replaced by defaults. Only non-object input is an error.
//! This module is the only place that knows backend field names.

mod account;
mod community;
mod dashboard;
mod fields;
mod reservation;
mod reward;
mod survey;
mod trip;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use thiserror::Error;

pub use account::{
    acknowledgement, admin, admin_form, forgot_password_body, login_body, login_outcome,
    login_token, otp_body, reset_password_body, user, user_form,
};
pub use community::{comment, comment_body, like_result, post, post_form};
pub use dashboard::{counters, revenue_point, trip_stats, user_stats};
pub use reservation::{event_reservation, status_body, trip_reservation};
pub use reward::{reward, reward_form};
pub use survey::{
    question, question_body, response, response_body, submission_body, survey, survey_body,
    survey_response,
};
pub use trip::{event, event_form, trip, trip_form};

/// A to-frontend normalizer.
pub type Normalizer<T> = fn(&Value) -> Result<T, NormalizeError>;

/// A response did not have the shape an operation expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("expected {entity} to be an object, found {found}")]
    NotAnObject {
        entity: &'static str,
        found: &'static str,
    },

    #[error("expected a list, found {found}")]
    NotAList { found: &'static str },

    #[error("item {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<NormalizeError>,
    },

    #[error("response has no payload at {expected}")]
    MissingPayload { expected: String },
}

/// What to do when a response cannot be normalized.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NormalizationMode {
    /// Fail the operation with `CoreError::Normalization`.
    Strict,
    /// Log a warning and return an empty list or `None`.
    #[default]
    Lenient,
}

/// Normalize every element of an array payload.
pub fn list_of<T>(payload: &Value, item: Normalizer<T>) -> Result<Vec<T>, NormalizeError> {
    let items = payload.as_array().ok_or(NormalizeError::NotAList {
        found: fields::kind_of(payload),
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, value)| {
            item(value).map_err(|e| NormalizeError::Item {
                index,
                source: Box::new(e),
            })
        })
        .collect()
}

/// Like [`list_of`], but a lone object is treated as a one-element list.
pub fn list_or_single<T>(payload: &Value, item: Normalizer<T>) -> Result<Vec<T>, NormalizeError> {
    if payload.is_object() {
        item(payload).map(|one| vec![one])
    } else {
        list_of(payload, item)
    }
}
