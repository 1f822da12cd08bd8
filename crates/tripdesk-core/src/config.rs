use std::time::Duration;

use url::Url;

use crate::cache::DEFAULT_KEEP_UNUSED;
use crate::normalize::NormalizationMode;

/// Backend URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Credential lifetime applied on login when none is configured.
pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Runtime settings for a [`Backend`](crate::Backend).
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub normalization: NormalizationMode,
    /// How long an unobserved cache entry survives.
    pub keep_unused: Duration,
    /// Lifetime given to credentials obtained by login. `None` never expires.
    pub credential_ttl: Option<Duration>,
}

impl BackendConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: tripdesk_api::DEFAULT_TIMEOUT,
            normalization: NormalizationMode::default(),
            keep_unused: DEFAULT_KEEP_UNUSED,
            credential_ttl: Some(DEFAULT_CREDENTIAL_TTL),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization = mode;
        self
    }

    pub fn with_keep_unused(mut self, keep_unused: Duration) -> Self {
        self.keep_unused = keep_unused;
        self
    }

    pub fn with_credential_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.credential_ttl = ttl;
        self
    }
}
