//! Line-oriented property body shared by the built-in serializers.
//!
//! ```text
//! @pos 120 40
//! id = 3
//! text = "Where to?"
//! # comments are ignored
//! ```
//!
//! Values are JSON literals, so strings stay on one line and integers and
//! floats keep their distinction.

use crate::error::SerializerError;
use crate::graph::{CustomData, CustomValue, Position};

use super::node_serializer::NodeDeserializeResult;

const POSITION_PREFIX: &str = "@pos";
const COMMENT_PREFIX: char = '#';

/// Write custom data (and an optional position) as property lines.
pub fn encode_properties(
    data: &CustomData,
    position: Option<Position>,
) -> Result<String, SerializerError> {
    let mut lines = Vec::with_capacity(data.len() + 1);
    if let Some(pos) = position {
        if !pos.x.is_finite() || !pos.y.is_finite() {
            return Err(SerializerError::InvalidData(format!(
                "non-finite position ({}, {})",
                pos.x, pos.y
            )));
        }
        lines.push(format!("{} {} {}", POSITION_PREFIX, pos.x, pos.y));
    }
    for (key, value) in data {
        if !is_property_key(key) {
            return Err(SerializerError::InvalidData(format!(
                "key '{}' cannot be written as a property",
                key
            )));
        }
        if !value.is_finite() {
            return Err(SerializerError::InvalidData(format!(
                "non-finite float under '{}'",
                key
            )));
        }
        let literal = serde_json::to_string(value)
            .map_err(|e| SerializerError::InvalidData(e.to_string()))?;
        lines.push(format!("{} = {}", key, literal));
    }
    Ok(lines.join("\n"))
}

/// Read property lines back; any unrecognised line is an error.
pub fn decode_properties(text: &str) -> Result<NodeDeserializeResult, SerializerError> {
    let mut result = NodeDeserializeResult::default();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        if let Some(rest) = line.strip_prefix(POSITION_PREFIX) {
            result.position_hint = Some(parse_position(rest).map_err(|reason| {
                SerializerError::Malformed(format!("line {}: {}", number + 1, reason))
            })?);
            continue;
        }

        let (key, literal) = line.split_once('=').ok_or_else(|| {
            SerializerError::Malformed(format!("line {}: expected 'key = value'", number + 1))
        })?;
        let key = key.trim();
        if !is_property_key(key) {
            return Err(SerializerError::Malformed(format!(
                "line {}: invalid key '{}'",
                number + 1,
                key
            )));
        }
        let value: CustomValue = serde_json::from_str(literal.trim()).map_err(|e| {
            SerializerError::Malformed(format!("line {}: {}", number + 1, e))
        })?;
        if result.custom_data.insert(key.to_string(), value).is_some() {
            return Err(SerializerError::Malformed(format!(
                "line {}: duplicate key '{}'",
                number + 1,
                key
            )));
        }
    }

    Ok(result)
}

fn parse_position(rest: &str) -> Result<Position, String> {
    let mut coords = rest.split_whitespace().map(str::parse::<f32>);
    match (coords.next(), coords.next(), coords.next()) {
        (Some(Ok(x)), Some(Ok(y)), None) if x.is_finite() && y.is_finite() => {
            Ok(Position::new(x, y))
        }
        _ => Err(format!("expected '{} <x> <y>'", POSITION_PREFIX)),
    }
}

fn is_property_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
