use thiserror::Error;

/// Top-level error type for the `tripdesk-api` crate.
///
/// Every outgoing call fails with exactly one of these. Nothing here is
/// retried; `tripdesk-core` hands them to the caller unchanged.
#[derive(Debug, Clone, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// No response arrived within the configured client-side timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The backend could not be reached at all (DNS, refused, reset).
    #[error("Backend unreachable: {reason}")]
    NetworkUnavailable { reason: String },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("request failed"))]
    Http {
        status: u16,
        body: String,
        message: Option<String>,
    },

    // ── Request construction ────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A request could not be assembled (bad header value, bad MIME type).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl Error {
    /// HTTP status code, when the backend produced a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if the backend rejected the credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if retrying the same call later might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NetworkUnavailable { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Text suitable for showing to an operator.
    ///
    /// Client errors carry the backend's own `message`; server errors and
    /// connection failures get a generic description.
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout { .. } => "The server took too long to respond.".into(),
            Self::NetworkUnavailable { .. } => "The server is unreachable.".into(),
            Self::Http {
                status, message, ..
            } if *status < 500 => message
                .clone()
                .unwrap_or_else(|| format!("Request rejected (HTTP {status}).")),
            Self::Http { .. } => "The server failed to process the request.".into(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn http(status: u16, message: Option<&str>) -> Error {
        Error::Http {
            status,
            body: String::new(),
            message: message.map(str::to_owned),
        }
    }

    #[test]
    fn client_errors_surface_backend_message() {
        assert_eq!(
            http(400, Some("Price must be positive")).user_message(),
            "Price must be positive"
        );
        assert_eq!(http(422, None).user_message(), "Request rejected (HTTP 422).");
    }

    #[test]
    fn server_errors_are_generic() {
        assert_eq!(
            http(500, Some("TypeError: cannot read properties of undefined")).user_message(),
            "The server failed to process the request."
        );
    }

    #[test]
    fn classification() {
        assert!(http(404, None).is_not_found());
        assert!(http(401, None).is_auth_failure());
        assert!(http(503, None).is_transient());
        assert!(!http(400, None).is_transient());
        assert!(Error::Timeout { timeout_ms: 10 }.is_transient());
        assert_eq!(
            Error::NetworkUnavailable {
                reason: "connection refused".into()
            }
            .user_message(),
            "The server is unreachable."
        );
    }
}
