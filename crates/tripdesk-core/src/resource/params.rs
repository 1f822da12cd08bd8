use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde_json::Value;
use tripdesk_api::{FormPayload, RequestBody};

use crate::model::EntityId;

/// Arguments of one operation call: path placeholders, query string, body.
#[derive(Debug, Clone, Default)]
pub struct Params {
    path: BTreeMap<&'static str, String>,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the `{id}` placeholder.
    pub fn id(id: &EntityId) -> Self {
        Self::new().path("id", id.as_str())
    }

    pub fn path(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path.insert(name, value.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form(mut self, form: FormPayload) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Path parameter lookup; query parameters are consulted second so tag
    /// rules can reference either.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.path.get(name).map(String::as_str).or_else(|| {
            self.query
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        })
    }

    pub(crate) fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub(crate) fn into_body(self) -> RequestBody {
        self.body
    }

    /// Canonical argument string for cache keys. Bodies are not part of it.
    ///
    /// Names and values are form-encoded so that no value can forge a
    /// separator.
    pub(crate) fn cache_args(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.path {
            if !out.is_empty() {
                out.push('&');
            }
            let _ = write!(out, "{}={}", escape(name), escape(value));
        }
        let mut query: Vec<_> = self.query.iter().collect();
        query.sort();
        for (name, value) in query {
            if !out.is_empty() {
                out.push('&');
            }
            let _ = write!(out, "?{}={}", escape(name), escape(value));
        }
        out
    }
}

fn escape(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_args_are_order_independent() {
        let a = Params::new().query("userId", "u1").query("page", "2").path("id", "7");
        let b = Params::new().path("id", "7").query("page", "2").query("userId", "u1");
        assert_eq!(a.cache_args(), b.cache_args());
        assert_eq!(a.cache_args(), "id=7&?page=2&?userId=u1");
    }

    #[test]
    fn cache_args_escape_separators() {
        let forged = Params::new().query("a", "1&?b=2");
        let honest = Params::new().query("a", "1").query("b", "2");
        assert_ne!(forged.cache_args(), honest.cache_args());
        assert_eq!(forged.cache_args(), "?a=1%26%3Fb%3D2");

        let by_path = Params::new().path("id", "7&?page=2");
        let by_query = Params::new().path("id", "7").query("page", "2");
        assert_ne!(by_path.cache_args(), by_query.cache_args());
    }

    #[test]
    fn lookup_falls_back_to_query() {
        let params = Params::new().query("questionId", "q9");
        assert_eq!(params.get("questionId"), Some("q9"));
        assert_eq!(params.get("id"), None);
    }
}
