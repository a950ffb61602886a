use crate::error::{NodeError, SerializerError};
use crate::graph::{CustomData, GraphSerializationContext, NodeData};
use crate::serialization::{decode_properties, encode_properties, NodeDeserializeResult, NodeSerializer};

use super::dialogue::DIALOGUE;
use super::kind::{GraphNode, NodeKind, PortTargets};
use super::utils::{reject_unknown_fields, require_int};

pub const CHOICE: &str = "choice";

/// 选项节点：分支到多句对话
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceNode {
    pub id: i64,
}

impl ChoiceNode {
    pub fn from_custom_data(data: &CustomData) -> Result<Self, NodeError> {
        reject_unknown_fields(data, &["id"])?;
        Ok(Self {
            id: require_int(data, "id")?,
        })
    }
}

impl GraphNode for ChoiceNode {
    fn node_type(&self) -> &str {
        CHOICE
    }

    fn custom_data(&self) -> CustomData {
        let mut data = CustomData::new();
        data.insert("id".into(), self.id.into());
        data
    }

    fn set_custom_data(&mut self, data: CustomData) -> Result<(), NodeError> {
        *self = Self::from_custom_data(&data)?;
        Ok(())
    }
}

pub fn choice_kind() -> NodeKind {
    NodeKind::new(CHOICE, || Box::new(ChoiceNode::default()))
        .with_input(0, PortTargets::only([DIALOGUE]))
        .with_output(0, PortTargets::only([DIALOGUE]))
}

/// Writes a `# leads to:` comment naming the nodes a choice branches to. The
/// comment is informational; connections are carried by fragment framing.
#[derive(Debug, Default)]
pub struct ChoiceSerializer;

impl NodeSerializer for ChoiceSerializer {
    fn node_type(&self) -> &str {
        CHOICE
    }

    fn serialize(
        &self,
        node: &NodeData,
        context: &dyn GraphSerializationContext,
    ) -> Result<String, SerializerError> {
        let choice = ChoiceNode::from_custom_data(&node.custom_data)?;
        let mut targets: Vec<&str> = context
            .outgoing(&node.node_id)
            .into_iter()
            .filter(|c| !c.is_self_loop())
            .map(|c| c.input_node_id.as_str())
            .collect();
        targets.sort_unstable();
        targets.dedup();

        let properties = encode_properties(&choice.custom_data(), node.position)?;
        if targets.is_empty() {
            return Ok(properties);
        }
        Ok(format!("# leads to: {}\n{}", targets.join(", "), properties))
    }

    fn deserialize(&self, text: &str) -> Result<NodeDeserializeResult, SerializerError> {
        let decoded = decode_properties(text)?;
        ChoiceNode::from_custom_data(&decoded.custom_data)?;
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ConnectionData, GraphData};

    #[test]
    fn test_serialize_mentions_targets() {
        let choice = NodeData::new("c", CHOICE, None, ChoiceNode { id: 2 }.custom_data());
        let graph = GraphData::new(
            vec![choice.clone()],
            vec![
                ConnectionData::new("c", 0, "yes", 0),
                ConnectionData::new("c", 0, "no", 0),
                ConnectionData::new("c", 1, "no", 0),
                ConnectionData::new("elsewhere", 0, "c", 0),
            ],
        );
        let body = ChoiceSerializer.serialize(&choice, &graph).unwrap();
        assert_eq!(body, "# leads to: no, yes\nid = 2");

        let decoded = ChoiceSerializer.deserialize(&body).unwrap();
        assert_eq!(decoded.custom_data, choice.custom_data);
    }

    #[test]
    fn test_no_targets_no_comment() {
        let choice = NodeData::new("c", CHOICE, None, ChoiceNode { id: 9 }.custom_data());
        let graph = GraphData::new(vec![choice.clone()], vec![]);
        assert_eq!(ChoiceSerializer.serialize(&choice, &graph).unwrap(), "id = 9");
    }

    #[test]
    fn test_kind_ports() {
        let kind = choice_kind();
        assert!(kind.output_targets(0).unwrap().admits(DIALOGUE));
        assert!(!kind.input_sources(0).unwrap().admits(CHOICE));
        assert_eq!(kind.max_output_connections(0), None);
    }
}
