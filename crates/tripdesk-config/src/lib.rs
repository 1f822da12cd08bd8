//! Shared configuration for tripdesk tools.
//!
//! TOML profiles, environment overrides, persisted credential slots
//! (env + OS keyring), and translation to `tripdesk_core::BackendConfig`.
//! The CLI layers its flag overrides on top of this.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use tripdesk_api::{Credential, CredentialStore, Role};
use tripdesk_core::{BackendConfig, DEFAULT_BASE_URL, NormalizationMode};

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "tripdesk";

/// Prefix of environment overrides (`TRIPDESK_DEFAULTS__TIMEOUT=5`).
pub const ENV_PREFIX: &str = "TRIPDESK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("credential storage failed: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("stored credential is corrupt: {0}")]
    CorruptCredential(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is selected.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, then `default_profile`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile. The implicit `default` profile always exists.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile {
                profile: name.into(),
            }),
        }
    }
}

/// Values applied when a profile leaves a field unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub normalization: NormalizationMode,

    /// Seconds an unobserved cache entry is kept.
    #[serde(default = "default_keep_unused")]
    pub keep_unused: u64,

    /// Hours a login stays valid.
    #[serde(default = "default_credential_ttl")]
    pub credential_ttl: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            normalization: NormalizationMode::default(),
            keep_unused: default_keep_unused(),
            credential_ttl: default_credential_ttl(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_keep_unused() -> u64 {
    60
}
fn default_credential_ttl() -> u64 {
    24
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Backend root URL (e.g., "http://localhost:5001").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Admin e-mail offered at login.
    pub email: Option<String>,

    pub timeout: Option<u64>,

    pub normalization: Option<NormalizationMode>,

    pub keep_unused: Option<u64>,

    /// Hours; `0` keeps logins until logout.
    pub credential_ttl: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            email: None,
            timeout: None,
            normalization: None,
            keep_unused: None,
            credential_ttl: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tripdesk", "tripdesk").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tripdesk");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file (missing files are treated as empty).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Backend config ──────────────────────────────────────────────────

/// Build a `BackendConfig` from a profile, falling back to `defaults`.
pub fn profile_to_backend_config(profile: &Profile, defaults: &Defaults) -> Result<BackendConfig, ConfigError> {
    let url: url::Url = profile
        .base_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {}", profile.base_url),
        })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let ttl_hours = profile.credential_ttl.unwrap_or(defaults.credential_ttl);
    let credential_ttl = (ttl_hours > 0).then(|| Duration::from_secs(ttl_hours.saturating_mul(3600)));

    Ok(BackendConfig::new(url)
        .with_timeout(Duration::from_secs(timeout))
        .with_normalization(profile.normalization.unwrap_or(defaults.normalization))
        .with_keep_unused(Duration::from_secs(profile.keep_unused.unwrap_or(defaults.keep_unused)))
        .with_credential_ttl(credential_ttl))
}

// ── Credential persistence ──────────────────────────────────────────

/// Keyring payload for one role's token.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

fn keyring_entry(profile_name: &str, role: Role) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{role}-token"))?)
}

fn token_env_var(role: Role) -> String {
    format!("{ENV_PREFIX}{}_TOKEN", role.to_string().to_uppercase())
}

/// Read one role's credential: env var first, then the keyring.
///
/// Env tokens never expire. Expired keyring entries are ignored.
pub fn resolve_credential(profile_name: &str, role: Role) -> Option<Credential> {
    if let Ok(token) = std::env::var(token_env_var(role)) {
        if !token.is_empty() {
            return Some(Credential::new(token, role));
        }
    }

    let raw = keyring_entry(profile_name, role).ok()?.get_password().ok()?;
    match serde_json::from_str::<StoredCredential>(&raw) {
        Ok(stored) => {
            let mut credential = Credential::new(stored.token, role);
            if let Some(at) = stored.expires_at {
                credential = credential.expiring_at(at);
            }
            (!credential.is_expired()).then_some(credential)
        }
        Err(e) => {
            debug!(profile = profile_name, %role, error = %e, "ignoring unreadable keyring entry");
            None
        }
    }
}

/// Credential store populated from env and keyring for `profile_name`.
pub fn load_credentials(profile_name: &str) -> CredentialStore {
    let store = CredentialStore::new();
    for role in [Role::Admin, Role::User] {
        if let Some(credential) = resolve_credential(profile_name, role) {
            store.set(credential);
        }
    }
    store
}

/// Persist a credential in the OS keyring.
pub fn save_credential(profile_name: &str, credential: &Credential) -> Result<(), ConfigError> {
    let stored = StoredCredential {
        token: credential.token.expose_secret().to_owned(),
        expires_at: credential.expires_at,
    };
    keyring_entry(profile_name, credential.role)?.set_password(&serde_json::to_string(&stored)?)?;
    Ok(())
}

/// Remove both roles' credentials from the keyring. Missing entries are fine.
pub fn clear_credentials(profile_name: &str) -> Result<(), ConfigError> {
    for role in [Role::Admin, Role::User] {
        match keyring_entry(profile_name, role)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        figment::Jail::expect_with(|jail| {
            let config = load_config_from(&jail.directory().join("absent.toml")).unwrap();
            assert_eq!(config.default_profile.as_deref(), Some("default"));
            assert_eq!(config.defaults.timeout, 10);
            assert_eq!(config.defaults.normalization, NormalizationMode::Lenient);
            assert!(config.profiles.is_empty());
            Ok(())
        });
    }

    #[test]
    fn file_and_env_are_layered() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "staging"

                [defaults]
                timeout = 15

                [profiles.staging]
                base_url = "https://staging.tripdesk.test"
                normalization = "strict"
                "#,
            )?;
            jail.set_env("TRIPDESK_DEFAULTS__KEEP_UNUSED", "5");

            let config = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(config.active_profile_name(None), "staging");
            assert_eq!(config.defaults.timeout, 15);
            assert_eq!(config.defaults.keep_unused, 5);

            let profile = config.profile("staging").unwrap();
            let backend = profile_to_backend_config(&profile, &config.defaults).unwrap();
            assert_eq!(backend.base_url.as_str(), "https://staging.tripdesk.test/");
            assert_eq!(backend.timeout, Duration::from_secs(15));
            assert_eq!(backend.normalization, NormalizationMode::Strict);
            assert_eq!(backend.keep_unused, Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        assert!(config.profile("default").is_ok());
        assert!(matches!(
            config.profile("prod"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let defaults = Defaults::default();
        let bad_url = Profile {
            base_url: "not a url".into(),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_backend_config(&bad_url, &defaults),
            Err(ConfigError::Validation { ref field, .. }) if field == "base_url"
        ));

        let zero_timeout = Profile {
            timeout: Some(0),
            ..Profile::default()
        };
        assert!(profile_to_backend_config(&zero_timeout, &defaults).is_err());
    }

    #[test]
    fn zero_ttl_means_no_expiry() {
        let profile = Profile {
            credential_ttl: Some(0),
            ..Profile::default()
        };
        let backend = profile_to_backend_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(backend.credential_ttl, None);

        let backend = profile_to_backend_config(&Profile::default(), &Defaults::default()).unwrap();
        assert_eq!(backend.credential_ttl, Some(Duration::from_secs(24 * 3600)));
    }

    #[test]
    fn save_then_load_round_trips_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                base_url: "http://10.0.0.5:5001".into(),
                email: Some("ops@tripdesk.test".into()),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("base_url = \"http://10.0.0.5:5001\""));

        let loaded: Config = toml::from_str(&text).unwrap();
        let profile = loaded.profile("default").unwrap();
        assert_eq!(profile.email.as_deref(), Some("ops@tripdesk.test"));
        assert_eq!(loaded.defaults.output, "table");
    }

    #[test]
    fn env_token_variable_names() {
        assert_eq!(token_env_var(Role::Admin), "TRIPDESK_ADMIN_TOKEN");
        assert_eq!(token_env_var(Role::User), "TRIPDESK_USER_TOKEN");
    }
}
