use thiserror::Error;

use super::NodeError;

/// Errors produced by a [`NodeSerializer`](crate::serialization::NodeSerializer).
#[derive(Debug, Error)]
pub enum SerializerError {
    /// The serializer has no text form for this node type. Raised by the
    /// placeholder serializer, whose guards always reject.
    #[error("Serialization not supported for node type: {node_type}")]
    Unsupported { node_type: String },
    #[error("Invalid custom data: {0}")]
    InvalidData(String),
    #[error("Malformed fragment body: {0}")]
    Malformed(String),
}

impl SerializerError {
    /// Whether this error is a contract violation rather than bad input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, SerializerError::Unsupported { .. })
    }
}

impl From<NodeError> for SerializerError {
    fn from(e: NodeError) -> Self {
        SerializerError::InvalidData(e.to_string())
    }
}

impl From<serde_json::Error> for SerializerError {
    fn from(e: serde_json::Error) -> Self {
        SerializerError::Malformed(e.to_string())
    }
}
