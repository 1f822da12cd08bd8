// Response envelope compatibility shim.
//
// The backend wraps payloads inconsistently: `{ success, data }`, a named
// field such as `{ surveys: [...] }`, `{ data: { responses } }`, or no
// wrapper at all. Each operation declares the location it expects; all
// loose probing for alternative shapes lives here and nowhere else.

use std::fmt;

use serde_json::Value;

/// Where an operation's payload lives inside the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{ "success": true, "data": <payload> }`
    Data,
    /// `{ "<key>": <payload> }`
    Named(&'static str),
    /// `{ "data": { "<key>": <payload> } }`
    NestedData(&'static str),
    /// The body is the payload.
    Bare,
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => f.write_str("`data`"),
            Self::Named(key) => write!(f, "`{key}`"),
            Self::NestedData(key) => write!(f, "`data.{key}`"),
            Self::Bare => f.write_str("a bare body"),
        }
    }
}

impl Envelope {
    /// Payload at the declared location only.
    pub fn locate<'a>(&self, body: &'a Value) -> Option<&'a Value> {
        let found = match self {
            Self::Data => field(body, "data"),
            Self::Named(key) => field(body, key),
            Self::NestedData(key) => field(body, "data").and_then(|data| field(data, key)),
            Self::Bare => Some(body).filter(|body| !body.is_null()),
        };
        found.filter(|value| !value.is_null())
    }

    /// Payload at the declared location, falling back to the other shapes
    /// the backend is known to emit.
    ///
    /// Returns the payload and the envelope it was actually found under.
    pub fn locate_loose<'a>(&self, body: &'a Value) -> Option<(&'a Value, Envelope)> {
        if let Some(found) = self.locate(body) {
            return Some((found, *self));
        }

        let key = match self {
            Self::Named(key) | Self::NestedData(key) => Some(*key),
            Self::Data | Self::Bare => None,
        };

        let mut fallbacks = vec![Self::Data];
        if let Some(key) = key {
            fallbacks.push(Self::Named(key));
            fallbacks.push(Self::NestedData(key));
        }

        let hit = fallbacks
            .into_iter()
            .filter(|candidate| candidate != self)
            .find_map(|candidate| candidate.locate(body).map(|found| (found, candidate)));
        if hit.is_some() {
            return hit;
        }

        // A bare body only counts when it is not itself an envelope.
        if !is_envelope(body) && *self != Self::Bare {
            return Self::Bare.locate(body).map(|found| (found, Self::Bare));
        }
        None
    }
}

/// Backend-reported failure inside a 2xx body (`{ "success": false }`).
///
/// Returns the backend message, or a generic one when none was sent.
pub fn rejection(body: &Value) -> Option<String> {
    match body.get("success") {
        Some(Value::Bool(false)) => Some(
            message(body).unwrap_or_else(|| "The server reported a failure.".to_owned()),
        ),
        _ => None,
    }
}

/// The `message` field of an object body, if any.
pub fn message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

fn field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.as_object().and_then(|map| map.get(key))
}

fn is_envelope(body: &Value) -> bool {
    body.as_object()
        .is_some_and(|map| map.contains_key("success") || map.contains_key("data"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strict_location_only() {
        let body = json!({ "success": true, "data": [1, 2] });
        assert_eq!(Envelope::Data.locate(&body), Some(&json!([1, 2])));
        assert_eq!(Envelope::Named("surveys").locate(&body), None);

        let nested = json!({ "data": { "responses": [] } });
        assert_eq!(
            Envelope::NestedData("responses").locate(&nested),
            Some(&json!([]))
        );
    }

    #[test]
    fn loose_accepts_bare_array_for_named_list() {
        let body = json!([{ "_id": "s1" }]);
        let (found, via) = Envelope::Named("surveys").locate_loose(&body).unwrap();
        assert_eq!(found, &body);
        assert_eq!(via, Envelope::Bare);
    }

    #[test]
    fn loose_tries_data_before_bare() {
        let body = json!({ "success": true, "data": { "title": "x" } });
        let (found, via) = Envelope::Named("survey").locate_loose(&body).unwrap();
        assert_eq!(found, &json!({ "title": "x" }));
        assert_eq!(via, Envelope::Data);
    }

    #[test]
    fn loose_never_returns_an_empty_envelope_as_payload() {
        let body = json!({ "success": true, "message": "ok" });
        assert_eq!(Envelope::Named("rewards").locate_loose(&body), None);
    }

    #[test]
    fn null_payload_counts_as_missing() {
        let body = json!({ "success": true, "data": null });
        assert_eq!(Envelope::Data.locate(&body), None);
    }

    #[test]
    fn rejection_reads_success_flag() {
        assert_eq!(
            rejection(&json!({ "success": false, "message": "Trip not available" })),
            Some("Trip not available".to_owned())
        );
        assert_eq!(rejection(&json!({ "success": true })), None);
        assert_eq!(rejection(&json!([])), None);
    }
}
