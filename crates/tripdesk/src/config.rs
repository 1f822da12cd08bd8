//! CLI configuration: a thin layer over `tripdesk_config`.
//!
//! Applies `GlobalOpts` overrides (--base-url, --timeout, --strict) on top
//! of the selected profile.

use tripdesk_core::{Backend, BackendConfig, NormalizationMode};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use tripdesk_config::{
    Config, Profile, clear_credentials, config_path, load_config_or_default, load_credentials,
    save_config, save_credential,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Translate the selected profile + global flags into a `BackendConfig`.
pub fn resolve_backend_config(global: &GlobalOpts, config: &Config) -> Result<BackendConfig, CliError> {
    let name = active_profile_name(global, config);
    let mut profile = config.profile(&name)?;

    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.strict {
        profile.normalization = Some(NormalizationMode::Strict);
    }

    let backend = tripdesk_config::profile_to_backend_config(&profile, &config.defaults)?;
    tracing::debug!(profile = %name, base_url = %backend.base_url, "resolved backend config");
    Ok(backend)
}

/// Build a `Backend` with the profile's stored tokens loaded.
pub fn connect(global: &GlobalOpts) -> Result<(Backend, String), CliError> {
    let config = load_config_or_default();
    let name = active_profile_name(global, &config);
    let backend_config = resolve_backend_config(global, &config)?;
    let backend = Backend::with_credentials(backend_config, load_credentials(&name))?;
    Ok((backend, name))
}
