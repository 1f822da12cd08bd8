//! Declarative resource descriptors and the generic client that runs them.

mod descriptor;
mod engine;
mod params;

pub use descriptor::{OperationDef, OperationKind, ResourceDescriptor, TagRule};
pub use engine::ResourceClient;
pub use params::Params;
