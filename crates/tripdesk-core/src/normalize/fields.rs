// Lenient accessors over a backend JSON object.
//
// Every getter is total: absent, `null` and wrongly typed values fall back
// to `None` or a default, never an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use super::NormalizeError;
use crate::model::EntityId;

pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Borrow `value` as an object, or report what it was instead.
    pub(crate) fn of(value: &'a Value, entity: &'static str) -> Result<Self, NormalizeError> {
        value
            .as_object()
            .map(|map| Self { map })
            .ok_or_else(|| NormalizeError::NotAnObject {
                entity,
                found: kind_of(value),
            })
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    /// Nested object, if `key` holds one.
    pub(crate) fn object(&self, key: &str) -> Option<Fields<'a>> {
        self.get(key)
            .and_then(Value::as_object)
            .map(|map| Fields { map })
    }

    /// String value; numbers and booleans are stringified. Empty strings
    /// count as absent.
    pub(crate) fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_string).filter(|s| !s.is_empty())
    }

    pub(crate) fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_owned())
    }

    pub(crate) fn text(&self, key: &str) -> String {
        self.string_or(key, "")
    }

    /// First non-empty string among `keys`.
    pub(crate) fn first_string(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.string(key))
    }

    /// Document id from `_id`, falling back to `id`.
    pub(crate) fn id(&self) -> EntityId {
        EntityId::from(self.first_string(&["_id", "id"]).unwrap_or_default())
    }

    /// Id of a reference field that is either a bare id or a populated
    /// document.
    pub(crate) fn reference(&self, key: &str) -> Option<EntityId> {
        match self.get(key)? {
            Value::Object(map) => {
                let id = Fields { map }.id();
                (!id.is_empty()).then_some(id)
            }
            other => scalar_string(other)
                .filter(|s| !s.is_empty())
                .map(EntityId::from),
        }
    }

    /// Number, accepting numeric strings.
    pub(crate) fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(coerce_number)
    }

    pub(crate) fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    /// Non-negative whole number; fractions are truncated, negatives clamp
    /// to zero.
    pub(crate) fn count(&self, key: &str) -> u64 {
        self.number(key).map_or(0, to_count)
    }

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub(crate) fn integer(&self, key: &str) -> i64 {
        // Float-to-int `as` saturates, which is the clamp we want.
        self.number(key).map_or(0, |n| n.trunc() as i64)
    }

    /// Boolean, accepting `"true"`/`"false"` strings.
    pub(crate) fn bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub(crate) fn bool_or(&self, key: &str, default: bool) -> bool {
        self.bool(key).unwrap_or(default)
    }

    /// Array elements, or an empty slice.
    pub(crate) fn array(&self, key: &str) -> &'a [Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// String elements of an array; non-string elements are stringified
    /// or skipped.
    pub(crate) fn strings(&self, key: &str) -> Vec<String> {
        self.array(key).iter().filter_map(scalar_string).collect()
    }

    /// Numeric elements of an array.
    pub(crate) fn numbers(&self, key: &str) -> Vec<f64> {
        self.array(key).iter().filter_map(coerce_number).collect()
    }

    pub(crate) fn datetime(&self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(parse_datetime)
    }

    /// Calendar date; timestamps are truncated to their date part.
    pub(crate) fn date(&self, key: &str) -> Option<NaiveDate> {
        let value = self.get(key)?;
        if let Some(s) = value.as_str() {
            if let Some(date) = s.get(..10).and_then(|d| d.parse::<NaiveDate>().ok()) {
                return Some(date);
            }
        }
        parse_datetime(value).map(|dt| dt.date_naive())
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.map.iter()
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub(crate) fn to_count(n: f64) -> u64 {
    if n > 0.0 { n.trunc() as u64 } else { 0 }
}

fn parse_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|naive| naive.and_utc())
                })
                .or_else(|| {
                    s.parse::<NaiveDate>()
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|naive| naive.and_utc())
                })
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn coercions() {
        let value = json!({
            "price": " 12.50 ",
            "qty": 3.9,
            "neg": -4,
            "flag": "TRUE",
            "empty": "",
            "nil": null,
            "tags": ["a", 2, null, {"x": 1}],
        });
        let f = Fields::of(&value, "test").unwrap();
        assert_eq!(f.number("price"), Some(12.5));
        assert_eq!(f.count("qty"), 3);
        assert_eq!(f.count("neg"), 0);
        assert_eq!(f.integer("neg"), -4);
        assert_eq!(f.bool("flag"), Some(true));
        assert_eq!(f.string("empty"), None);
        assert_eq!(f.string_or("nil", "Unknown"), "Unknown");
        assert_eq!(f.strings("tags"), vec!["a".to_owned(), "2".to_owned()]);
        assert!(f.array("missing").is_empty());
    }

    #[test]
    fn ids_and_references() {
        let value = json!({
            "_id": "abc",
            "tripId": { "_id": "t1", "destination": "Tabarka" },
            "userId": "u9",
        });
        let f = Fields::of(&value, "test").unwrap();
        assert_eq!(f.id(), EntityId::from("abc"));
        assert_eq!(f.reference("tripId"), Some(EntityId::from("t1")));
        assert_eq!(f.reference("userId"), Some(EntityId::from("u9")));
        assert_eq!(f.reference("eventId"), None);
    }

    #[test]
    fn dates() {
        let value = json!({
            "iso": "2025-06-01T09:30:00.000Z",
            "plain": "2025-06-01",
            "millis": 1_748_770_200_000_i64,
            "junk": "soon",
        });
        let f = Fields::of(&value, "test").unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(f.date("iso"), Some(expected));
        assert_eq!(f.date("plain"), Some(expected));
        assert_eq!(f.datetime("millis").map(|d| d.date_naive()), Some(expected));
        assert_eq!(f.datetime("junk"), None);
        assert_eq!(f.date("junk"), None);
    }

    #[test]
    fn non_objects_are_rejected() {
        let err = Fields::of(&json!([1]), "Trip").err().unwrap();
        assert_eq!(
            err,
            NormalizeError::NotAnObject {
                entity: "Trip",
                found: "an array"
            }
        );
    }
}
