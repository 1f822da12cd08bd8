// ── Generic resource client ──
//
// Every typed client delegates here. One code path renders the request,
// sends it, checks the envelope, normalizes, applies the fail-soft policy
// and invalidates write-tags.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use tripdesk_api::{ApiRequest, HttpTransport, RawResponse, envelope};

use super::descriptor::{OperationDef, OperationKind, ResourceDescriptor};
use super::params::Params;
use crate::cache::{QueryCache, QueryKey, QuerySubscription};
use crate::error::CoreError;
use crate::normalize::{NormalizationMode, NormalizeError, Normalizer, list_of};

/// Descriptor-driven client for one resource.
///
/// Cheap to clone: the descriptor is shared and the transport and cache
/// are handles.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    descriptor: Arc<ResourceDescriptor>,
    transport: HttpTransport,
    cache: QueryCache,
    mode: NormalizationMode,
}

impl ResourceClient {
    pub fn new(
        descriptor: ResourceDescriptor,
        transport: HttpTransport,
        cache: QueryCache,
        mode: NormalizationMode,
    ) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            transport,
            cache,
            mode,
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn mode(&self) -> NormalizationMode {
        self.mode
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Subscribe to a query. `decode` maps the located payload to `T`; on
    /// lenient failure `T::default()` is served instead.
    pub fn watch<T, D>(&self, operation: &str, params: Params, decode: D) -> Result<QuerySubscription<T>, CoreError>
    where
        T: Default + Any + Send + Sync,
        D: Fn(&Value) -> Result<T, NormalizeError> + Send + Sync + 'static,
    {
        let def = self.descriptor.find(operation)?;
        let qualified = self.descriptor.qualified(def);
        if def.kind() != OperationKind::Query {
            return Err(CoreError::Internal(format!("{qualified} is not a query")));
        }

        let key = QueryKey::new(qualified.clone(), params.cache_args());
        let tags = def.resolve_read_tags(&qualified, &params)?;
        let request = self.request(def, &qualified, params)?;

        let client = self.clone();
        let name = def.name();
        let decode = Arc::new(decode);
        Ok(self.cache.subscribe(key, tags, move || {
            let client = client.clone();
            let request = request.clone();
            let decode = Arc::clone(&decode);
            async move {
                let raw = client.transport.send(request).await?;
                client.decode(name, &raw, &*decode)
            }
        }))
    }

    /// Resolve a query once through the cache.
    pub async fn query<T, D>(&self, operation: &str, params: Params, decode: D) -> Result<Arc<T>, CoreError>
    where
        T: Default + Any + Send + Sync,
        D: Fn(&Value) -> Result<T, NormalizeError> + Send + Sync + 'static,
    {
        self.watch(operation, params, decode)?.settled().await
    }

    pub fn watch_list<T>(&self, operation: &str, params: Params, item: Normalizer<T>) -> Result<QuerySubscription<Vec<T>>, CoreError>
    where
        T: Any + Send + Sync,
    {
        self.watch(operation, params, move |payload| list_of(payload, item))
    }

    pub async fn list<T>(&self, operation: &str, params: Params, item: Normalizer<T>) -> Result<Arc<Vec<T>>, CoreError>
    where
        T: Any + Send + Sync,
    {
        self.watch_list(operation, params, item)?.settled().await
    }

    /// Single entity; `None` is the not-found sentinel of lenient mode.
    pub fn watch_one<T>(&self, operation: &str, params: Params, item: Normalizer<T>) -> Result<QuerySubscription<Option<T>>, CoreError>
    where
        T: Any + Send + Sync,
    {
        self.watch(operation, params, move |payload| item(payload).map(Some))
    }

    pub async fn one<T>(&self, operation: &str, params: Params, item: Normalizer<T>) -> Result<Arc<Option<T>>, CoreError>
    where
        T: Any + Send + Sync,
    {
        self.watch_one(operation, params, item)?.settled().await
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Run a mutation or action and decode its payload.
    pub async fn mutate<T, D>(&self, operation: &str, params: Params, decode: D) -> Result<T, CoreError>
    where
        T: Default,
        D: Fn(&Value) -> Result<T, NormalizeError>,
    {
        let (def, raw) = self.send_write(operation, params).await?;
        self.decode(def.name(), &raw, &decode)
    }

    /// Run a mutation or action whose payload is ignored.
    pub async fn mutate_unit(&self, operation: &str, params: Params) -> Result<(), CoreError> {
        self.send_write(operation, params).await.map(|_| ())
    }

    /// Like [`mutate`](Self::mutate) but hands back the raw body as well,
    /// for operations that carry data outside the payload (login tokens).
    pub async fn mutate_raw(&self, operation: &str, params: Params) -> Result<Value, CoreError> {
        self.send_write(operation, params).await.map(|(_, raw)| raw.body)
    }

    async fn send_write(&self, operation: &str, params: Params) -> Result<(&OperationDef, RawResponse), CoreError> {
        let def = self.descriptor.find(operation)?;
        let qualified = self.descriptor.qualified(def);
        if def.kind() == OperationKind::Query {
            return Err(CoreError::Internal(format!("{qualified} is a query")));
        }

        let tags = def.resolve_write_tags(&qualified, &params)?;
        let request = self.request(def, &qualified, params)?;
        let raw = self.transport.send(request).await?;

        if let Some(message) = envelope::rejection(&raw.body) {
            return Err(CoreError::Rejected {
                operation: qualified,
                message,
            });
        }
        if !tags.is_empty() {
            self.cache.invalidate(&tags);
        }
        Ok((def, raw))
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    fn request(&self, def: &OperationDef, qualified: &str, params: Params) -> Result<ApiRequest, CoreError> {
        let path = format!(
            "{}{}",
            self.descriptor.base_path(),
            def.render_path(qualified, &params)?
        );
        let mut request = ApiRequest::new(def.method(), path).with_auth(self.descriptor.auth_for(def));
        for (name, value) in params.query_pairs() {
            request = request.with_query(name.clone(), value.clone());
        }
        Ok(request.with_body(params.into_body()))
    }

    /// Locate, normalize and apply the fail-soft policy.
    fn decode<T, D>(&self, operation: &str, raw: &RawResponse, decode: &D) -> Result<T, CoreError>
    where
        T: Default,
        D: Fn(&Value) -> Result<T, NormalizeError> + ?Sized,
    {
        let def = self.descriptor.find(operation)?;
        if let Some(message) = envelope::rejection(&raw.body) {
            return Err(CoreError::Rejected {
                operation: self.descriptor.qualified(def),
                message,
            });
        }

        let declared = def.payload_envelope();
        let located = match self.mode {
            NormalizationMode::Strict => declared.locate(&raw.body),
            NormalizationMode::Lenient => declared.locate_loose(&raw.body).map(|(payload, found)| {
                if found != declared {
                    debug!(
                        resource = self.descriptor.name(),
                        operation,
                        declared = %declared,
                        found = %found,
                        "payload found outside its declared envelope"
                    );
                }
                payload
            }),
        };
        let outcome = located
            .ok_or_else(|| NormalizeError::MissingPayload {
                expected: declared.to_string(),
            })
            .and_then(decode);

        match (outcome, self.mode) {
            (Ok(value), _) => Ok(value),
            (Err(source), NormalizationMode::Strict) => Err(CoreError::Normalization {
                operation: self.descriptor.qualified(def),
                source,
            }),
            (Err(error), NormalizationMode::Lenient) => {
                warn!(
                    resource = self.descriptor.name(),
                    operation,
                    error = %error,
                    "response could not be normalized; serving empty value"
                );
                Ok(T::default())
            }
        }
    }
}
