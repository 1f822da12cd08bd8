// Persisted credential slots shared by the transport and the session layer.
//
// Two independent slots (admin, end-user) are swapped atomically; reads on
// the request path never block writers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Role that owns a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::User => f.write_str("user"),
        }
    }
}

/// Which credential slot a resource reads its bearer token from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthScope {
    /// Admin token only.
    Admin,
    /// End-user token only.
    User,
    /// Admin token if present, otherwise the end-user token.
    #[default]
    Shared,
    /// Never attach a token.
    Anonymous,
}

/// A bearer token plus its owner and expiry.
#[derive(Debug, Clone)]
pub struct Credential {
    pub token: SecretString,
    pub role: Role,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: SecretString::from(token.into()),
            role,
            expires_at: None,
        }
    }

    pub fn from_secret(token: SecretString, role: Role) -> Self {
        Self {
            token,
            role,
            expires_at: None,
        }
    }

    /// Expire `ttl` from now. A TTL too large for the calendar means "never".
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self
    }

    pub fn expiring_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[derive(Default)]
struct Slots {
    admin: ArcSwapOption<Credential>,
    user: ArcSwapOption<Credential>,
}

impl Slots {
    fn slot(&self, role: Role) -> &ArcSwapOption<Credential> {
        match role {
            Role::Admin => &self.admin,
            Role::User => &self.user,
        }
    }
}

/// Cheaply cloneable handle to the process-wide credential slots.
#[derive(Clone, Default)]
pub struct CredentialStore {
    slots: Arc<Slots>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("admin", &self.slots.admin.load().is_some())
            .field("user", &self.slots.user.load().is_some())
            .finish()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a credential in the slot for its role, replacing any previous one.
    pub fn set(&self, credential: Credential) {
        self.slots
            .slot(credential.role)
            .store(Some(Arc::new(credential)));
    }

    pub fn clear(&self, role: Role) {
        self.slots.slot(role).store(None);
    }

    pub fn clear_all(&self) {
        self.clear(Role::Admin);
        self.clear(Role::User);
    }

    /// Live credential for `role`. An expired credential is dropped on read.
    pub fn get(&self, role: Role) -> Option<Arc<Credential>> {
        let slot = self.slots.slot(role);
        let current = slot.load_full()?;
        if current.is_expired() {
            tracing::debug!(%role, "credential expired; clearing slot");
            let _previous = slot.compare_and_swap(&Some(Arc::clone(&current)), None);
            return None;
        }
        Some(current)
    }

    /// Credential to attach for a request in `scope`.
    pub fn for_scope(&self, scope: AuthScope) -> Option<Arc<Credential>> {
        match scope {
            AuthScope::Admin => self.get(Role::Admin),
            AuthScope::User => self.get(Role::User),
            AuthScope::Shared => self.get(Role::Admin).or_else(|| self.get(Role::User)),
            AuthScope::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self, role: Role) -> bool {
        self.get(role).is_some()
    }
}
