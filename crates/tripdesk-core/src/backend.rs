// ── Backend facade ──
//
// Owns the transport, credential slots and query cache, and builds one
// typed client per resource on top of them.

use tracing::info;
use tripdesk_api::{Credential, CredentialStore, HttpTransport, Role, TransportConfig};

use crate::cache::{QueryCache, Tag};
use crate::clients::{
    self, AdminsClient, CommunityClient, DashboardClient, EventReservationsClient, EventsClient,
    LoginSession, QuestionsClient, ReservationsClient, ResponsesClient, RewardsClient,
    SurveysClient, TripsClient, UsersClient, tags,
};
use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::requests::LoginRequest;
use crate::resource::{ResourceClient, ResourceDescriptor};

/// Entry point of the data-access layer.
///
/// Cheap to clone. Each `Backend` has its own cache, so two instances never
/// share cached state.
#[derive(Debug, Clone)]
pub struct Backend {
    config: BackendConfig,
    credentials: CredentialStore,
    cache: QueryCache,
    trips: TripsClient,
    events: EventsClient,
    reservations: ReservationsClient,
    event_reservations: EventReservationsClient,
    surveys: SurveysClient,
    questions: QuestionsClient,
    responses: ResponsesClient,
    rewards: RewardsClient,
    users: UsersClient,
    admins: AdminsClient,
    community: CommunityClient,
    dashboard: DashboardClient,
}

impl Backend {
    pub fn new(config: BackendConfig) -> Result<Self, CoreError> {
        Self::with_credentials(config, CredentialStore::new())
    }

    /// Build against an existing credential store, e.g. one restored from
    /// the keyring.
    pub fn with_credentials(config: BackendConfig, credentials: CredentialStore) -> Result<Self, CoreError> {
        let transport_config = TransportConfig::new(config.base_url.clone()).with_timeout(config.timeout);
        let transport = HttpTransport::new(&transport_config, credentials.clone())?;
        Self::assemble(config, credentials, transport)
    }

    /// Build over a caller-supplied transport.
    pub fn with_transport(config: BackendConfig, transport: HttpTransport) -> Result<Self, CoreError> {
        let credentials = transport.credentials().clone();
        Self::assemble(config, credentials, transport)
    }

    fn assemble(
        config: BackendConfig,
        credentials: CredentialStore,
        transport: HttpTransport,
    ) -> Result<Self, CoreError> {
        let cache = QueryCache::new(config.keep_unused);
        let client = |descriptor: Result<ResourceDescriptor, CoreError>| {
            descriptor.map(|d| ResourceClient::new(d, transport.clone(), cache.clone(), config.normalization))
        };

        Ok(Self {
            trips: TripsClient::new(client(clients::trips_descriptor())?),
            events: EventsClient::new(client(clients::events_descriptor())?),
            reservations: ReservationsClient::new(client(clients::reservations_descriptor())?),
            event_reservations: EventReservationsClient::new(client(
                clients::event_reservations_descriptor(),
            )?),
            surveys: SurveysClient::new(client(clients::surveys_descriptor())?),
            questions: QuestionsClient::new(client(clients::questions_descriptor())?),
            responses: ResponsesClient::new(client(clients::responses_descriptor())?),
            rewards: RewardsClient::new(client(clients::rewards_descriptor())?),
            users: UsersClient::new(client(clients::users_descriptor())?),
            admins: AdminsClient::new(client(clients::admins_descriptor())?),
            community: CommunityClient::new(client(clients::community_descriptor())?),
            dashboard: DashboardClient::new(client(clients::dashboard_descriptor())?),
            config,
            credentials,
            cache,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Log in as an administrator and store the returned token.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginSession, CoreError> {
        let session = self.admins.login(request).await?;
        let mut credential = Credential::from_secret(session.token.clone(), Role::Admin);
        if let Some(ttl) = self.config.credential_ttl {
            credential = credential.with_ttl(ttl);
        }
        self.credentials.set(credential);
        // Refetch admin queries now that the new token is in place.
        self.cache.invalidate(&[Tag::new(tags::ADMIN)]);
        info!(email = %request.email, "logged in");
        Ok(session)
    }

    /// Forget every credential and drop all cached data.
    pub fn logout(&self) {
        self.credentials.clear_all();
        self.cache.clear();
        info!("logged out");
    }

    /// Whether a live admin credential is stored.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated(Role::Admin)
    }

    /// Cancel pending cache evictions and drop all entries.
    pub fn shutdown(&self) {
        self.cache.teardown();
    }

    // ── Clients ──────────────────────────────────────────────────────

    pub fn trips(&self) -> &TripsClient {
        &self.trips
    }

    pub fn events(&self) -> &EventsClient {
        &self.events
    }

    pub fn reservations(&self) -> &ReservationsClient {
        &self.reservations
    }

    pub fn event_reservations(&self) -> &EventReservationsClient {
        &self.event_reservations
    }

    pub fn surveys(&self) -> &SurveysClient {
        &self.surveys
    }

    pub fn questions(&self) -> &QuestionsClient {
        &self.questions
    }

    pub fn responses(&self) -> &ResponsesClient {
        &self.responses
    }

    pub fn rewards(&self) -> &RewardsClient {
        &self.rewards
    }

    pub fn users(&self) -> &UsersClient {
        &self.users
    }

    pub fn admins(&self) -> &AdminsClient {
        &self.admins
    }

    pub fn community(&self) -> &CommunityClient {
        &self.community
    }

    pub fn dashboard(&self) -> &DashboardClient {
        &self.dashboard
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;
    use crate::config::DEFAULT_BASE_URL;

    #[test]
    fn every_descriptor_is_valid() {
        for descriptor in [
            clients::trips_descriptor(),
            clients::events_descriptor(),
            clients::reservations_descriptor(),
            clients::event_reservations_descriptor(),
            clients::surveys_descriptor(),
            clients::questions_descriptor(),
            clients::responses_descriptor(),
            clients::rewards_descriptor(),
            clients::users_descriptor(),
            clients::admins_descriptor(),
            clients::community_descriptor(),
            clients::dashboard_descriptor(),
        ] {
            descriptor.unwrap();
        }
    }

    #[test]
    fn backend_builds_without_runtime() {
        let config = BackendConfig::new(Url::parse(DEFAULT_BASE_URL).unwrap());
        let backend = Backend::new(config).unwrap();
        assert!(!backend.is_authenticated());
        assert_eq!(backend.events().resource().descriptor().base_path(), "/events");
        assert!(backend.cache().is_empty());
    }
}
