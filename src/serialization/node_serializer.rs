//! Per-node-type serializer contract and the placeholder implementation.

use crate::error::SerializerError;
use crate::graph::{CustomData, GraphSerializationContext, NodeData, Position};

use super::fragment::ParsedNodeFragment;

/// 节点反序列化结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDeserializeResult {
    pub custom_data: CustomData,
    pub position_hint: Option<Position>,
}

impl NodeDeserializeResult {
    pub fn new(custom_data: CustomData, position_hint: Option<Position>) -> Self {
        Self {
            custom_data,
            position_hint,
        }
    }
}

/// Converts one node type's custom data to and from a fragment body.
///
/// Implementations must satisfy the round-trip law:
/// `deserialize(serialize(n, ctx)?)?.custom_data == n.custom_data`.
pub trait NodeSerializer: Send + Sync {
    /// Node type this serializer handles; matches [`NodeData::node_type`].
    fn node_type(&self) -> &str;

    /// Checked before [`serialize`](Self::serialize); a `false` skips the node.
    fn can_serialize(&self, _node: &NodeData, _context: &dyn GraphSerializationContext) -> bool {
        true
    }

    /// Checked before [`deserialize`](Self::deserialize); a `false` skips the fragment.
    fn can_deserialize(&self, _fragment: &ParsedNodeFragment) -> bool {
        true
    }

    fn serialize(
        &self,
        node: &NodeData,
        context: &dyn GraphSerializationContext,
    ) -> Result<String, SerializerError>;

    fn deserialize(&self, text: &str) -> Result<NodeDeserializeResult, SerializerError>;

    /// True only for [`NullNodeSerializer`].
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// 空节点序列化器，用于配置了但没有文本格式的节点类型
#[derive(Debug, Clone)]
pub struct NullNodeSerializer {
    node_type: String,
}

impl NullNodeSerializer {
    pub fn new(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
        }
    }

    fn unsupported(&self) -> SerializerError {
        SerializerError::Unsupported {
            node_type: self.node_type.clone(),
        }
    }
}

impl NodeSerializer for NullNodeSerializer {
    fn node_type(&self) -> &str {
        &self.node_type
    }

    fn can_serialize(&self, _node: &NodeData, _context: &dyn GraphSerializationContext) -> bool {
        false
    }

    fn can_deserialize(&self, _fragment: &ParsedNodeFragment) -> bool {
        false
    }

    fn serialize(
        &self,
        _node: &NodeData,
        _context: &dyn GraphSerializationContext,
    ) -> Result<String, SerializerError> {
        Err(self.unsupported())
    }

    fn deserialize(&self, _text: &str) -> Result<NodeDeserializeResult, SerializerError> {
        Err(self.unsupported())
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}
