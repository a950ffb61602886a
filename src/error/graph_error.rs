//! Graph-level error types.

use thiserror::Error;

use super::{RegistryError, SerializerError};

/// Errors that abort a whole serialize/deserialize call or configuration load.
///
/// Per-node and per-fragment problems never surface here; they are logged and
/// skipped by the codec.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serializer error: {0}")]
    Serializer(#[from] SerializerError),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Config parse error: {0}")]
    ConfigParse(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_error_display() {
        assert_eq!(
            GraphError::ConfigParse("x".into()).to_string(),
            "Config parse error: x"
        );
        assert_eq!(
            GraphError::InvalidConfig("y".into()).to_string(),
            "Invalid config: y"
        );
    }

    #[test]
    fn test_graph_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: GraphError = io.into();
        assert!(matches!(err, GraphError::Io(_)));
        assert!(err.to_string().contains("eof"));
    }

    #[test]
    fn test_graph_error_from_serializer() {
        let err: GraphError = SerializerError::Unsupported {
            node_type: "relay".into(),
        }
        .into();
        assert!(matches!(
            err,
            GraphError::Serializer(SerializerError::Unsupported { .. })
        ));
    }
}
