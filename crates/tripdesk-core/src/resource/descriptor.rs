use std::collections::BTreeSet;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use tripdesk_api::{AuthScope, Envelope, Method};

use super::params::Params;

use crate::cache::Tag;
use crate::error::CoreError;

/// Characters escaped in a single path segment (WHATWG path set plus `/`
/// and `%`).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// What an operation does to cached state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum OperationKind {
    /// Cacheable read. Declares read-tags only.
    Query,
    /// Write. Must declare at least one write-tag.
    Mutation,
    /// Call that touches no cached resource (password reset and the like).
    Action,
}

/// How a tag is derived from an operation's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRule {
    /// `Kind` with no id.
    Kind(&'static str),
    /// `Kind:{param}`.
    ById(&'static str, &'static str),
    /// `Kind:{prefix}{param}`, e.g. `Response:survey-42`.
    Prefixed(&'static str, &'static str, &'static str),
}

impl TagRule {
    fn resolve(self, operation: &str, params: &Params) -> Result<Tag, CoreError> {
        let lookup = |param: &'static str| {
            params.get(param).ok_or_else(|| CoreError::MissingParam {
                operation: operation.to_owned(),
                param: param.to_owned(),
            })
        };
        Ok(match self {
            Self::Kind(kind) => Tag::new(kind),
            Self::ById(kind, param) => Tag::with_id(kind, lookup(param)?),
            Self::Prefixed(kind, prefix, param) => {
                Tag::with_id(kind, format!("{prefix}{}", lookup(param)?))
            }
        })
    }
}

/// One endpoint of a resource.
#[derive(Debug, Clone)]
pub struct OperationDef {
    name: &'static str,
    kind: OperationKind,
    method: Method,
    path: &'static str,
    envelope: Envelope,
    auth: Option<AuthScope>,
    provides: Vec<TagRule>,
    invalidates: Vec<TagRule>,
}

impl OperationDef {
    fn new(name: &'static str, kind: OperationKind, method: Method, path: &'static str) -> Self {
        Self {
            name,
            kind,
            method,
            path,
            envelope: Envelope::Data,
            auth: None,
            provides: Vec::new(),
            invalidates: Vec::new(),
        }
    }

    /// A `GET` query.
    pub fn query(name: &'static str, path: &'static str) -> Self {
        Self::new(name, OperationKind::Query, Method::Get, path)
    }

    pub fn mutation(name: &'static str, method: Method, path: &'static str) -> Self {
        Self::new(name, OperationKind::Mutation, method, path)
    }

    pub fn action(name: &'static str, method: Method, path: &'static str) -> Self {
        Self::new(name, OperationKind::Action, method, path)
    }

    /// Where the payload lives in the response body. Defaults to `data`.
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Override the resource's credential scope.
    pub fn auth(mut self, auth: AuthScope) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Add a read-tag.
    pub fn provides(mut self, rule: TagRule) -> Self {
        self.provides.push(rule);
        self
    }

    /// Add a write-tag.
    pub fn invalidates(mut self, rule: TagRule) -> Self {
        self.invalidates.push(rule);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn payload_envelope(&self) -> Envelope {
        self.envelope
    }

    pub fn read_tags(&self) -> &[TagRule] {
        &self.provides
    }

    pub fn write_tags(&self) -> &[TagRule] {
        &self.invalidates
    }

    pub(crate) fn resolve_read_tags(&self, qualified: &str, params: &Params) -> Result<Vec<Tag>, CoreError> {
        self.provides.iter().map(|rule| rule.resolve(qualified, params)).collect()
    }

    pub(crate) fn resolve_write_tags(&self, qualified: &str, params: &Params) -> Result<Vec<Tag>, CoreError> {
        self.invalidates.iter().map(|rule| rule.resolve(qualified, params)).collect()
    }

    /// Substitute `{param}` placeholders.
    pub(crate) fn render_path(&self, qualified: &str, params: &Params) -> Result<String, CoreError> {
        let mut out = String::with_capacity(self.path.len());
        let mut rest = self.path;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            out.push_str(&rest[..open]);
            let param = &rest[open + 1..close];
            let value = params.get(param).ok_or_else(|| CoreError::MissingParam {
                operation: qualified.to_owned(),
                param: param.to_owned(),
            })?;
            out.extend(utf8_percent_encode(value, PATH_SEGMENT));
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Declarative description of one backend resource.
///
/// Built once at startup; [`build`](Self::build) enforces the caching
/// contract so that no client can ship a mutation invisible to readers.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    name: &'static str,
    base_path: &'static str,
    auth: AuthScope,
    operations: Vec<OperationDef>,
}

impl ResourceDescriptor {
    pub fn new(name: &'static str, base_path: &'static str) -> Self {
        Self {
            name,
            base_path,
            auth: AuthScope::Shared,
            operations: Vec::new(),
        }
    }

    pub fn auth(mut self, auth: AuthScope) -> Self {
        self.auth = auth;
        self
    }

    pub fn operation(mut self, operation: OperationDef) -> Self {
        self.operations.push(operation);
        self
    }

    /// Validate the descriptor.
    pub fn build(self) -> Result<Self, CoreError> {
        let fail = |reason: String| CoreError::Descriptor {
            resource: self.name.to_owned(),
            reason,
        };

        if !self.base_path.starts_with('/') {
            return Err(fail(format!("base path '{}' must start with '/'", self.base_path)));
        }

        let mut seen = BTreeSet::new();
        for op in &self.operations {
            if !seen.insert(op.name) {
                return Err(fail(format!("operation '{}' is declared twice", op.name)));
            }
            match op.kind {
                OperationKind::Query if !op.invalidates.is_empty() => {
                    return Err(fail(format!("query '{}' declares write-tags", op.name)));
                }
                OperationKind::Mutation if op.invalidates.is_empty() => {
                    return Err(fail(format!("mutation '{}' declares no write-tags", op.name)));
                }
                OperationKind::Mutation if !op.method.is_mutating() => {
                    return Err(fail(format!("mutation '{}' uses a read-only method", op.name)));
                }
                OperationKind::Action if !op.invalidates.is_empty() || !op.provides.is_empty() => {
                    return Err(fail(format!("action '{}' must not declare tags", op.name)));
                }
                _ => {}
            }
        }
        Ok(self)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_path(&self) -> &'static str {
        self.base_path
    }

    pub fn default_auth(&self) -> AuthScope {
        self.auth
    }

    pub fn operations(&self) -> &[OperationDef] {
        &self.operations
    }

    pub fn find(&self, name: &str) -> Result<&OperationDef, CoreError> {
        self.operations
            .iter()
            .find(|op| op.name == name)
            .ok_or_else(|| CoreError::Internal(format!("{} has no operation '{name}'", self.name)))
    }

    /// Credential scope for `operation`.
    pub fn auth_for(&self, operation: &OperationDef) -> AuthScope {
        operation.auth.unwrap_or(self.auth)
    }

    /// `resource.operation`, used in keys and logs.
    pub fn qualified(&self, operation: &OperationDef) -> String {
        format!("{}.{}", self.name, operation.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn widgets() -> ResourceDescriptor {
        ResourceDescriptor::new("widget", "/widget")
            .operation(OperationDef::query("list", "/get").provides(TagRule::Kind("Widget")))
            .operation(
                OperationDef::mutation("delete", Method::Delete, "/delete/{id}")
                    .invalidates(TagRule::Kind("Widget")),
            )
    }

    #[test]
    fn valid_descriptor_builds() {
        let built = widgets().build().unwrap();
        assert_eq!(built.operations().len(), 2);
        assert_eq!(built.auth_for(built.find("list").unwrap()), AuthScope::Shared);
    }

    #[test]
    fn mutation_without_write_tags_is_rejected() {
        let err = widgets()
            .operation(OperationDef::mutation("create", Method::Post, "/add"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("mutation 'create' declares no write-tags"));
    }

    #[test]
    fn mutation_over_get_is_rejected() {
        let err = widgets()
            .operation(OperationDef::mutation("touch", Method::Get, "/touch").invalidates(TagRule::Kind("Widget")))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("mutation 'touch' uses a read-only method"));
    }

    #[test]
    fn query_with_write_tags_is_rejected() {
        let err = ResourceDescriptor::new("widget", "/widget")
            .operation(OperationDef::query("list", "/get").invalidates(TagRule::Kind("Widget")))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::Descriptor { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = widgets()
            .operation(OperationDef::query("list", "/all"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn actions_may_skip_tags() {
        ResourceDescriptor::new("account", "/admin")
            .operation(OperationDef::action("forgot_password", Method::Post, "/forgot-password"))
            .build()
            .unwrap();
    }

    #[test]
    fn path_rendering_substitutes_and_encodes() {
        let op = OperationDef::query("by_status", "/reservations/status/{status}/{id}");
        let params = Params::new().path("status", "pending").path("id", "a b");
        let slashed = Params::new().path("status", "a/b?c").path("id", "x+y");
        assert_eq!(
            op.render_path("reservation.by_status", &slashed).unwrap(),
            "/reservations/status/a%2Fb%3Fc/x+y"
        );
        assert_eq!(
            op.render_path("reservation.by_status", &params).unwrap(),
            "/reservations/status/pending/a%20b"
        );

        let err = op.render_path("reservation.by_status", &Params::new()).unwrap_err();
        assert!(matches!(err, CoreError::MissingParam { ref param, .. } if param == "status"));
    }

    #[test]
    fn tag_rules_resolve_against_params() {
        let params = Params::new().path("surveyId", "s1");
        let op = OperationDef::query("for_survey", "/get-by-survey/{surveyId}")
            .provides(TagRule::Prefixed("Response", "survey-", "surveyId"))
            .provides(TagRule::Kind("Response"));
        let tags = op.resolve_read_tags("response.for_survey", &params).unwrap();
        assert_eq!(tags, vec![Tag::with_id("Response", "survey-s1"), Tag::new("Response")]);
    }
}
