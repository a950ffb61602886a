//! Error types for the graph codec and node type registry.
//!
//! - [`SerializerError`]: Failures of a single node serializer.
//! - [`RegistryError`]: Failures while scanning plugins into the type catalog.
//! - [`NodeError`]: Failures raised by a live node instance.
//! - [`GraphError`]: Top-level errors for serialize/deserialize and configuration.

pub mod graph_error;
pub mod node_error;
pub mod registry_error;
pub mod serializer_error;

pub use graph_error::GraphError;
pub use node_error::NodeError;
pub use registry_error::RegistryError;
pub use serializer_error::SerializerError;

/// Convenience alias for graph-level results.
pub type GraphResult<T> = Result<T, GraphError>;
/// Convenience alias for per-node codec results.
pub type SerializerResult<T> = Result<T, SerializerError>;
