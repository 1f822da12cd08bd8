//! User and administrator command handlers.

use secrecy::SecretString;
use tabled::Tabled;

use tripdesk_core::Backend;
use tripdesk_core::model::{Admin, EntityId, User};
use tripdesk_core::requests::{AdminInput, ForgotPasswordRequest, OtpVerification, PasswordReset};

use crate::cli::{AdminsArgs, AdminsCommand, GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Points")]
    points: u64,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: format!("{} {}", u.name, u.lastname).trim().to_owned(),
            email: u.email.clone(),
            points: u.points,
        }
    }
}

#[derive(Tabled)]
struct AdminRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&Admin> for AdminRow {
    fn from(a: &Admin) -> Self {
        Self {
            id: a.id.to_string(),
            name: a.name.clone(),
            email: a.email.clone(),
            role: output::opt(a.role.as_ref()),
        }
    }
}

fn user_detail(u: &User) -> Vec<(&'static str, String)> {
    vec![
        ("ID", u.id.to_string()),
        ("Name", u.name.clone()),
        ("Last name", u.lastname.clone()),
        ("Email", u.email.clone()),
        ("Points", u.points.to_string()),
        ("Preferences", u.travel_preferences.join(", ")),
        ("Joined", output::opt(u.created_at.as_ref())),
    ]
}

pub(super) fn admin_detail(a: &Admin) -> Vec<(&'static str, String)> {
    vec![
        ("ID", a.id.to_string()),
        ("Name", a.name.clone()),
        ("Email", a.email.clone()),
        ("Role", output::opt(a.role.as_ref())),
        ("Department", output::opt(a.department.as_ref())),
        ("Location", output::opt(a.location.as_ref())),
        ("Last active", output::opt(a.last_active.as_ref())),
    ]
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_users(
    backend: &Backend,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let users = backend.users();
    match args.command {
        UsersCommand::List => {
            let list = users.list().await?;
            let out = output::render_list(&global.output, list.as_slice(), |u| UserRow::from(u), |u| {
                u.id.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        UsersCommand::Get { id } => {
            let id = EntityId::from(id);
            let user = util::found(&users.get(&id).await?, "user", &id, "users list")?;
            let out = output::render_single(&global.output, &user, user_detail, |u| {
                u.id.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete user {id}?"), global.yes)? {
                return Ok(());
            }
            users.delete(&EntityId::from(id)).await?;
            output::done("User deleted", global.quiet);
        }
    }
    Ok(())
}

pub async fn handle_admins(
    backend: &Backend,
    args: AdminsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let admins = backend.admins();
    match args.command {
        AdminsCommand::List => {
            let list = admins.list().await?;
            let out = output::render_list(&global.output, list.as_slice(), |a| AdminRow::from(a), |a| {
                a.id.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        AdminsCommand::Get { id } => {
            let id = EntityId::from(id);
            let admin = util::found(&admins.get(&id).await?, "admin", &id, "admins list")?;
            let out = output::render_single(&global.output, &admin, admin_detail, |a| {
                a.id.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        AdminsCommand::Create { name, email } => {
            let password = util::prompt_password("Password for the new admin: ")?;
            let input = AdminInput {
                name,
                email,
                password: Some(SecretString::from(password)),
                image: None,
            };
            match admins.create(&input).await? {
                Some(admin) => output::done(&format!("Admin {} created", admin.id), global.quiet),
                None => output::done("Admin created", global.quiet),
            }
        }

        AdminsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete admin {id}?"), global.yes)? {
                return Ok(());
            }
            admins.delete(&EntityId::from(id)).await?;
            output::done("Admin deleted", global.quiet);
        }

        AdminsCommand::ForgotPassword { email } => {
            let ack = admins.forgot_password(&ForgotPasswordRequest { email }).await?;
            output::done(&ack.message, global.quiet);
        }

        AdminsCommand::VerifyOtp { email, otp } => {
            let ack = admins.verify_otp(&OtpVerification { email, otp }).await?;
            output::done(&ack.message, global.quiet);
        }

        AdminsCommand::ResetPassword { email, otp } => {
            let password = util::prompt_password("New password: ")?;
            let request = PasswordReset {
                email,
                otp,
                new_password: SecretString::from(password),
            };
            let ack = admins.reset_password(&request).await?;
            output::done(&ack.message, global.quiet);
        }
    }
    Ok(())
}
