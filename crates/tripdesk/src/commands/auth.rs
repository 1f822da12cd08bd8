//! Session commands: login, logout, whoami.

use dialoguer::Input;
use secrecy::SecretString;

use tripdesk_core::requests::LoginRequest;
use tripdesk_core::{Backend, Role};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::people::admin_detail;
use super::util;

/// Password source for non-interactive logins.
const PASSWORD_ENV: &str = "TRIPDESK_PASSWORD";

pub async fn login(
    backend: &Backend,
    profile: &str,
    email: Option<String>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let email = match email.or_else(|| profile_email(profile)) {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Admin e-mail")
            .interact_text()
            .map_err(|e| CliError::Io(std::io::Error::other(e)))?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => util::prompt_password("Password: ")?,
    };

    let request = LoginRequest {
        email,
        password: SecretString::from(password),
    };
    let session = backend.login(&request).await?;

    let credential = backend
        .credentials()
        .get(Role::Admin)
        .ok_or_else(|| CliError::Internal("login succeeded but no token was stored".into()))?;
    config::save_credential(profile, &credential)?;

    let who = session
        .outcome
        .admin
        .as_ref()
        .map_or_else(|| request.email.clone(), |a| a.name.clone());
    output::done(&format!("Logged in as {who} (profile '{profile}')"), global.quiet);
    Ok(())
}

pub fn logout(backend: &Backend, profile: &str, global: &GlobalOpts) -> Result<(), CliError> {
    backend.logout();
    config::clear_credentials(profile)?;
    output::done(&format!("Logged out of profile '{profile}'"), global.quiet);
    Ok(())
}

pub async fn whoami(backend: &Backend, global: &GlobalOpts) -> Result<(), CliError> {
    if !backend.is_authenticated() {
        return Err(CliError::AuthFailed {
            message: "not logged in".into(),
        });
    }
    let me = backend.admins().me().await?;
    let admin = Option::as_ref(&me).ok_or_else(|| CliError::AuthFailed {
        message: "the backend did not recognise the stored token".into(),
    })?;
    let out = output::render_single(&global.output, admin, admin_detail, |a| a.email.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

fn profile_email(profile: &str) -> Option<String> {
    config::load_config_or_default()
        .profile(profile)
        .ok()
        .and_then(|p| p.email)
}
