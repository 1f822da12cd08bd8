// ── Core error types ──
//
// User-facing errors from tripdesk-core. Transport errors are wrapped
// unchanged so callers can still match on timeout / unreachable / status.

use thiserror::Error;

use crate::normalize::NormalizeError;
use crate::validate::ValidationErrors;

/// Errors returned by resource clients and the [`Backend`](crate::Backend).
///
/// `Clone` because an errored query hands the same error to every
/// subscriber.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    #[error(transparent)]
    Transport(#[from] tripdesk_api::Error),

    /// 2xx response whose body says `success: false`.
    #[error("{operation} was rejected: {message}")]
    Rejected { operation: String, message: String },

    // ── Data ─────────────────────────────────────────────────────────
    /// Strict mode only; lenient mode substitutes an empty value.
    #[error("Unexpected response from {operation}: {source}")]
    Normalization {
        operation: String,
        #[source]
        source: NormalizeError,
    },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    // ── Wiring ───────────────────────────────────────────────────────
    #[error("Invalid resource descriptor '{resource}': {reason}")]
    Descriptor { resource: String, reason: String },

    #[error("Operation '{operation}' is missing path parameter '{param}'")]
    MissingParam { operation: String, param: String },

    #[error("Login response for {operation} did not include a token")]
    MissingToken { operation: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status of a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// A transport 404. Normalization fallbacks never produce this.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_not_found())
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_auth_failure())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Text suitable for an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(e) => e.user_message(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Validation(errors) => errors.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn not_found_only_for_transport_404() {
        let err = CoreError::from(tripdesk_api::Error::Http {
            status: 404,
            body: String::new(),
            message: Some("Trip not found".into()),
        });
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "Trip not found");

        let err = CoreError::Normalization {
            operation: "trip.get".into(),
            source: NormalizeError::MissingPayload {
                expected: "`data`".into(),
            },
        };
        assert!(!err.is_not_found());
    }
}
