// tripdesk-api: Async HTTP transport for the travel-booking admin backend

pub mod credentials;
pub mod envelope;
pub mod error;
pub mod request;
pub mod transport;

pub use credentials::{AuthScope, Credential, CredentialStore, Role};
pub use envelope::Envelope;
pub use error::Error;
pub use request::{ApiRequest, FilePart, FormPayload, Method, RequestBody};
pub use transport::{DEFAULT_TIMEOUT, HttpTransport, RawResponse, TransportConfig};
