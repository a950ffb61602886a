use thiserror::Error;

/// Errors raised by a live node instance
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Missing custom data field: {0}")]
    MissingField(String),
    #[error("Type error: field {field} expects {expected}")]
    TypeError { field: String, expected: String },
    #[error("Invalid custom data: {0}")]
    InvalidCustomData(String),
}
