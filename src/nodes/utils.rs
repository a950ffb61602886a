//! Typed access to custom data fields for the bundled node types.

use crate::error::NodeError;
use crate::graph::{CustomData, CustomValue};

pub fn require_int(data: &CustomData, field: &str) -> Result<i64, NodeError> {
    let value = data
        .get(field)
        .ok_or_else(|| NodeError::MissingField(field.to_string()))?;
    value.as_int().ok_or_else(|| type_error(field, "integer"))
}

pub fn require_str<'a>(data: &'a CustomData, field: &str) -> Result<&'a str, NodeError> {
    let value = data
        .get(field)
        .ok_or_else(|| NodeError::MissingField(field.to_string()))?;
    value.as_str().ok_or_else(|| type_error(field, "string"))
}

pub fn optional_float(data: &CustomData, field: &str) -> Result<Option<f64>, NodeError> {
    match data.get(field) {
        None => Ok(None),
        Some(CustomValue::Float(f)) if f.is_finite() => Ok(Some(*f)),
        Some(_) => Err(type_error(field, "finite float")),
    }
}

/// Reject keys outside `allowed`; the bundled types have closed schemas.
pub fn reject_unknown_fields(data: &CustomData, allowed: &[&str]) -> Result<(), NodeError> {
    match data.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(NodeError::InvalidCustomData(format!(
            "unexpected field '{}'",
            key
        ))),
        None => Ok(()),
    }
}

fn type_error(field: &str, expected: &str) -> NodeError {
    NodeError::TypeError {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}
