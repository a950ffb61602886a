use crate::error::{NodeError, SerializerError};
use crate::graph::{CustomData, GraphSerializationContext, NodeData};
use crate::serialization::{decode_properties, encode_properties, NodeDeserializeResult, NodeSerializer};

use super::kind::{GraphNode, NodeKind, PortTargets};
use super::utils::{optional_float, reject_unknown_fields};

pub const RELAY: &str = "relay";

/// Pass-through node carrying an optional numeric value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelayNode {
    pub value: Option<f64>,
}

impl RelayNode {
    pub fn from_custom_data(data: &CustomData) -> Result<Self, NodeError> {
        reject_unknown_fields(data, &["value"])?;
        Ok(Self {
            value: optional_float(data, "value")?,
        })
    }
}

impl GraphNode for RelayNode {
    fn node_type(&self) -> &str {
        RELAY
    }

    fn custom_data(&self) -> CustomData {
        let mut data = CustomData::new();
        if let Some(value) = self.value {
            data.insert("value".into(), value.into());
        }
        data
    }

    fn set_custom_data(&mut self, data: CustomData) -> Result<(), NodeError> {
        *self = Self::from_custom_data(&data)?;
        Ok(())
    }
}

pub fn relay_kind() -> NodeKind {
    NodeKind::new(RELAY, || Box::new(RelayNode::default()))
        .with_input(0, PortTargets::only([RELAY]))
        .with_max_inputs(0, 1)
        .with_output(0, PortTargets::only([RELAY]))
        .with_max_outputs(0, 1)
}

#[derive(Debug, Default)]
pub struct RelaySerializer;

impl NodeSerializer for RelaySerializer {
    fn node_type(&self) -> &str {
        RELAY
    }

    fn serialize(
        &self,
        node: &NodeData,
        _context: &dyn GraphSerializationContext,
    ) -> Result<String, SerializerError> {
        let relay = RelayNode::from_custom_data(&node.custom_data)?;
        encode_properties(&relay.custom_data(), node.position)
    }

    fn deserialize(&self, text: &str) -> Result<NodeDeserializeResult, SerializerError> {
        let decoded = decode_properties(text)?;
        RelayNode::from_custom_data(&decoded.custom_data)?;
        Ok(decoded)
    }
}
