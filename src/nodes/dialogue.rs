use crate::error::{NodeError, SerializerError};
use crate::graph::{CustomData, GraphSerializationContext, NodeData};
use crate::serialization::{decode_properties, encode_properties, NodeDeserializeResult, NodeSerializer};

use super::kind::{GraphNode, NodeKind, PortTargets};
use super::utils::{reject_unknown_fields, require_int, require_str};

pub const DIALOGUE: &str = "dialogue";

const FIELDS: &[&str] = &["id", "text"];

/// 对话节点：一句台词
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueNode {
    pub id: i64,
    pub text: String,
}

impl DialogueNode {
    pub fn from_custom_data(data: &CustomData) -> Result<Self, NodeError> {
        reject_unknown_fields(data, FIELDS)?;
        Ok(Self {
            id: require_int(data, "id")?,
            text: require_str(data, "text")?.to_string(),
        })
    }
}

impl GraphNode for DialogueNode {
    fn node_type(&self) -> &str {
        DIALOGUE
    }

    fn custom_data(&self) -> CustomData {
        let mut data = CustomData::new();
        data.insert("id".into(), self.id.into());
        data.insert("text".into(), self.text.as_str().into());
        data
    }

    fn set_custom_data(&mut self, data: CustomData) -> Result<(), NodeError> {
        *self = Self::from_custom_data(&data)?;
        Ok(())
    }
}

/// Dialogue lines follow dialogue or choices, and lead to one next step.
pub fn dialogue_kind() -> NodeKind {
    NodeKind::new(DIALOGUE, || Box::new(DialogueNode::default()))
        .with_input(0, PortTargets::only([DIALOGUE, super::choice::CHOICE]))
        .with_max_inputs(0, 3)
        .with_output(0, PortTargets::only([DIALOGUE, super::choice::CHOICE]))
        .with_max_outputs(0, 1)
}

#[derive(Debug, Default)]
pub struct DialogueSerializer;

impl NodeSerializer for DialogueSerializer {
    fn node_type(&self) -> &str {
        DIALOGUE
    }

    fn serialize(
        &self,
        node: &NodeData,
        _context: &dyn GraphSerializationContext,
    ) -> Result<String, SerializerError> {
        let dialogue = DialogueNode::from_custom_data(&node.custom_data)?;
        encode_properties(&dialogue.custom_data(), node.position)
    }

    fn deserialize(&self, text: &str) -> Result<NodeDeserializeResult, SerializerError> {
        let decoded = decode_properties(text)?;
        DialogueNode::from_custom_data(&decoded.custom_data)?;
        Ok(decoded)
    }
}
