// HTTP transport: base URL resolution, bearer auth, hard client-side timeout.
//
// One `reqwest::Client` is built per transport and shared by every resource
// client through cheap clones.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::credentials::CredentialStore;
use crate::envelope;
use crate::error::Error;
use crate::request::{ApiRequest, RequestBody};

/// Client-side timeout applied to every call unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("tripdesk/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl TransportConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_owned(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

/// A successful (2xx) response with its body decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed JSON; `null` for an empty body, a JSON string for a
    /// non-JSON body.
    pub body: Value,
}

/// Sends [`ApiRequest`]s to the backend.
///
/// Attaches `Authorization: Bearer <token>` from the credential store when
/// the request's scope has a live credential, and fails with
/// [`Error::Timeout`] once the configured timeout elapses regardless of the
/// connection state. Never retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    credentials: CredentialStore,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig, credentials: CredentialStore) -> Result<Self, Error> {
        let http = config.build_client()?;
        Ok(Self::with_client(
            http,
            config.base_url.clone(),
            config.timeout,
            credentials,
        ))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        timeout: Duration,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            timeout,
            credentials,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Resolve a backend path (`/trip/get/42`) against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Perform one call.
    pub async fn send(&self, request: ApiRequest) -> Result<RawResponse, Error> {
        let method = request.method;
        let path = request.path.clone();
        match tokio::time::timeout(self.timeout, self.dispatch(request)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(%method, path = %path, timeout_ms = self.timeout_ms(), "request timed out");
                Err(Error::Timeout {
                    timeout_ms: self.timeout_ms(),
                })
            }
        }
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<RawResponse, Error> {
        let url = self.url(&request.path)?;
        debug!("{} {url}", request.method);

        let mut builder = self.http.request(request.method.as_reqwest(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(credential) = self.credentials.for_scope(request.auth) {
            builder = builder.bearer_auth(credential.token.expose_secret());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form.into_multipart()?),
        };

        let resp = builder.send().await.map_err(|e| self.map_reqwest(&e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.map_reqwest(&e))?;
        let body = parse_body(&text);

        if status.is_success() {
            Ok(RawResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            debug!(status = status.as_u16(), "request failed");
            Err(Error::Http {
                status: status.as_u16(),
                message: envelope::message(&body),
                body: text,
            })
        }
    }

    fn map_reqwest(&self, err: &reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: self.timeout_ms(),
            }
        } else if err.is_builder() {
            Error::InvalidRequest(err.to_string())
        } else {
            Error::NetworkUnavailable {
                reason: err.to_string(),
            }
        }
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

/// Ensure the base URL ends with `/` so that `join` appends instead of
/// replacing the last path segment.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::with_client(
            reqwest::Client::new(),
            base.parse().unwrap(),
            DEFAULT_TIMEOUT,
            CredentialStore::new(),
        )
    }

    #[test]
    fn joins_paths_under_base_prefix() {
        let t = transport("http://localhost:5001/api");
        assert_eq!(
            t.url("/trip/get/42").unwrap().as_str(),
            "http://localhost:5001/api/trip/get/42"
        );
        assert_eq!(
            t.url("/question/").unwrap().as_str(),
            "http://localhost:5001/api/question/"
        );
    }

    #[test]
    fn bodies_are_decoded_leniently() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("[1]"), serde_json::json!([1]));
        assert_eq!(parse_body("Deleted"), Value::String("Deleted".into()));
    }
}
