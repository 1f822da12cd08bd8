//! Cached, normalized data-access layer for the travel-booking admin
//! backend.
//!
//! [`Backend`] is the entry point. It owns a [`QueryCache`] and hands it to
//! one typed client per resource. Every client is a declarative
//! [`ResourceDescriptor`] run by the generic [`ResourceClient`], so paths,
//! envelopes and cache tags live in data rather than code.
//!
//! ```no_run
//! # async fn demo() -> Result<(), tripdesk_core::CoreError> {
//! use tripdesk_core::{Backend, BackendConfig};
//!
//! let url = url::Url::parse("http://localhost:5001").map_err(tripdesk_api::Error::from)?;
//! let backend = Backend::new(BackendConfig::new(url))?;
//! let trips = backend.trips().list().await?;
//! println!("{} trips", trips.len());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod requests;
pub mod resource;
pub mod validate;

pub use backend::Backend;
pub use cache::{QueryCache, QueryKey, QueryState, QueryStatus, QueryStream, QuerySubscription, Tag};
pub use clients::LoginSession;
pub use config::{BackendConfig, DEFAULT_BASE_URL, DEFAULT_CREDENTIAL_TTL};
pub use error::CoreError;
pub use normalize::{NormalizationMode, NormalizeError};
pub use resource::{OperationDef, OperationKind, Params, ResourceClient, ResourceDescriptor, TagRule};
pub use validate::{Validate, ValidationErrors};

pub use tripdesk_api::{AuthScope, Credential, CredentialStore, FilePart, Role};
