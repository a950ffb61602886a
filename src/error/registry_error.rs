//! Errors raised while building the node type catalog.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry conflict: {0}")]
    Conflict(String),
    #[error("Invalid node kind: {0}")]
    InvalidKind(String),
    #[error("Plugin '{plugin_id}' failed to register: {message}")]
    Plugin { plugin_id: String, message: String },
}
