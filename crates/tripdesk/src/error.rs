//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tripdesk_config::ConfigError;
use tripdesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend")]
    #[diagnostic(
        code(tripdesk::connection_failed),
        help(
            "Check that the backend is running and the URL is right.\n\
             Try: tripdesk --base-url http://localhost:5001 dashboard users"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {millis}ms")]
    #[diagnostic(
        code(tripdesk::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { millis: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not authorized: {message}")]
    #[diagnostic(
        code(tripdesk::auth_failed),
        help("Your session may have expired. Run: tripdesk login")
    )]
    AuthFailed { message: String },

    #[error("Login failed: {message}")]
    #[diagnostic(code(tripdesk::login_failed))]
    LoginFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(tripdesk::not_found),
        help("Run: tripdesk {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("The backend rejected the request: {message}")]
    #[diagnostic(code(tripdesk::rejected))]
    Rejected { message: String },

    #[error("Backend error: {message}")]
    #[diagnostic(code(tripdesk::api_error))]
    ApiError { status: Option<u16>, message: String },

    #[error("Unexpected response shape from {operation}")]
    #[diagnostic(
        code(tripdesk::unexpected_response),
        help("Rerun without --strict to show empty data instead.\nDetail: {detail}")
    )]
    UnexpectedResponse { operation: String, detail: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid input")]
    #[diagnostic(code(tripdesk::invalid_input), help("{details}"))]
    InvalidInput { details: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tripdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(tripdesk::config),
        help("Create a config with: tripdesk config init")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(tripdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(tripdesk::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::LoginFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::InvalidInput { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport(tripdesk_api::Error::Timeout { timeout_ms }) => {
                CliError::Timeout { millis: timeout_ms }
            }

            CoreError::Transport(tripdesk_api::Error::NetworkUnavailable { reason }) => {
                CliError::ConnectionFailed { reason }
            }

            CoreError::Transport(ref api) if api.is_auth_failure() => CliError::AuthFailed {
                message: api.user_message(),
            },

            CoreError::Transport(api) => CliError::ApiError {
                status: api.status(),
                message: api.user_message(),
            },

            CoreError::Rejected { message, .. } => CliError::Rejected { message },

            CoreError::Normalization { operation, source } => CliError::UnexpectedResponse {
                operation,
                detail: source.to_string(),
            },

            CoreError::Validation(errors) => CliError::InvalidInput {
                details: errors
                    .iter()
                    .map(|(field, message)| format!("{field}: {message}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::MissingToken { .. } => CliError::LoginFailed {
                message: "the backend did not return a token".into(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            other @ (CoreError::Descriptor { .. }
            | CoreError::MissingParam { .. }
            | CoreError::Internal(_)) => CliError::Internal(other.to_string()),
        }
    }
}
