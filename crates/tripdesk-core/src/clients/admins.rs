use std::sync::Arc;

use secrecy::SecretString;
use tripdesk_api::{AuthScope, Envelope, Method};

use super::some;
use super::tags::ADMIN;
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{Acknowledgement, Admin, EntityId, LoginOutcome};
use crate::normalize;
use crate::requests::{AdminInput, ForgotPasswordRequest, LoginRequest, OtpVerification, PasswordReset};
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};
use crate::validate::Validate;

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    let anonymous = |op: OperationDef| op.envelope(Envelope::Bare).auth(AuthScope::Anonymous);

    ResourceDescriptor::new("admin", "/admin")
        .auth(AuthScope::Admin)
        // ── Account flows ──
        .operation(anonymous(
            OperationDef::mutation("login", Method::Post, "/login").invalidates(TagRule::Kind(ADMIN)),
        ))
        .operation(anonymous(OperationDef::action("forgot_password", Method::Post, "/forgot-password")))
        .operation(anonymous(OperationDef::action("verify_otp", Method::Post, "/verify-otp")))
        .operation(anonymous(OperationDef::action("reset_password", Method::Post, "/reset-password")))
        // ── Administrators ──
        .operation(OperationDef::query("me", "/me").provides(TagRule::Kind(ADMIN)))
        .operation(OperationDef::query("list", "/get").provides(TagRule::Kind(ADMIN)))
        .operation(OperationDef::query("get", "/get/{id}").provides(TagRule::Kind(ADMIN)))
        .operation(OperationDef::mutation("create", Method::Post, "/add").invalidates(TagRule::Kind(ADMIN)))
        .operation(OperationDef::mutation("update", Method::Put, "/update/{id}").invalidates(TagRule::Kind(ADMIN)))
        .operation(OperationDef::mutation("delete", Method::Delete, "/delete/{id}").invalidates(TagRule::Kind(ADMIN)))
        .build()
}

/// Result of a successful login. The token is kept out of
/// [`LoginOutcome`] so it is never cached or printed.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub outcome: LoginOutcome,
    pub token: SecretString,
}

/// Administrator accounts and the password-recovery flow.
#[derive(Debug, Clone)]
pub struct AdminsClient {
    resource: ResourceClient,
}

impl AdminsClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    /// Exchange credentials for a token. Does not store the token; use
    /// [`Backend::login`](crate::Backend::login) for that.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginSession, CoreError> {
        request.validate()?;
        let body = self
            .resource
            .mutate_raw("login", Params::new().json(normalize::login_body(request)))
            .await?;
        let token = normalize::login_token(&body).ok_or_else(|| CoreError::MissingToken {
            operation: "admin.login".into(),
        })?;
        let outcome = normalize::login_outcome(&body).unwrap_or_default();
        Ok(LoginSession { outcome, token })
    }

    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<Acknowledgement, CoreError> {
        request.validate()?;
        let params = Params::new().json(normalize::forgot_password_body(request));
        self.resource
            .mutate("forgot_password", params, normalize::acknowledgement)
            .await
    }

    pub async fn verify_otp(&self, request: &OtpVerification) -> Result<Acknowledgement, CoreError> {
        request.validate()?;
        let params = Params::new().json(normalize::otp_body(request));
        self.resource
            .mutate("verify_otp", params, normalize::acknowledgement)
            .await
    }

    pub async fn reset_password(&self, request: &PasswordReset) -> Result<Acknowledgement, CoreError> {
        request.validate()?;
        let params = Params::new().json(normalize::reset_password_body(request));
        self.resource
            .mutate("reset_password", params, normalize::acknowledgement)
            .await
    }

    /// The administrator owning the current credential.
    pub async fn me(&self) -> Result<Arc<Option<Admin>>, CoreError> {
        self.resource.one("me", Params::new(), normalize::admin).await
    }

    pub fn watch_me(&self) -> Result<QuerySubscription<Option<Admin>>, CoreError> {
        self.resource.watch_one("me", Params::new(), normalize::admin)
    }

    /// The backend answers with either one document or a list.
    pub async fn list(&self) -> Result<Arc<Vec<Admin>>, CoreError> {
        self.resource
            .query("list", Params::new(), |payload| {
                normalize::list_or_single(payload, normalize::admin)
            })
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<Admin>>, CoreError> {
        self.resource.one("get", Params::id(id), normalize::admin).await
    }

    pub async fn create(&self, input: &AdminInput) -> Result<Option<Admin>, CoreError> {
        input.validate()?;
        let params = Params::new().form(normalize::admin_form(input));
        self.resource.mutate("create", params, some(normalize::admin)).await
    }

    pub async fn update(&self, id: &EntityId, input: &AdminInput) -> Result<Option<Admin>, CoreError> {
        input.validate()?;
        let params = Params::id(id).form(normalize::admin_form(input));
        self.resource.mutate("update", params, some(normalize::admin)).await
    }

    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        self.resource.mutate_unit("delete", Params::id(id)).await
    }
}
