use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::NodeError;

/// 节点自定义数据（按键排序，保证输出稳定）
pub type CustomData = BTreeMap<String, CustomValue>;

/// A single custom data value with an explicit variant tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<CustomValue>),
    Map(CustomData),
}

impl CustomValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CustomValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CustomValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats; nothing else converts.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CustomValue::Float(f) => Some(*f),
            CustomValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CustomValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&CustomData> {
        match self {
            CustomValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CustomValue::Bool(_) => "boolean",
            CustomValue::Int(_) => "integer",
            CustomValue::Float(_) => "float",
            CustomValue::String(_) => "string",
            CustomValue::List(_) => "list",
            CustomValue::Map(_) => "map",
        }
    }

    /// Whether every float reachable from this value is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            CustomValue::Float(f) => f.is_finite(),
            CustomValue::List(items) => items.iter().all(CustomValue::is_finite),
            CustomValue::Map(map) => map.values().all(CustomValue::is_finite),
            _ => true,
        }
    }
}

impl From<bool> for CustomValue {
    fn from(v: bool) -> Self {
        CustomValue::Bool(v)
    }
}

impl From<i64> for CustomValue {
    fn from(v: i64) -> Self {
        CustomValue::Int(v)
    }
}

impl From<f64> for CustomValue {
    fn from(v: f64) -> Self {
        CustomValue::Float(v)
    }
}

impl From<&str> for CustomValue {
    fn from(v: &str) -> Self {
        CustomValue::String(v.to_string())
    }
}

impl From<String> for CustomValue {
    fn from(v: String) -> Self {
        CustomValue::String(v)
    }
}

impl From<CustomValue> for serde_json::Value {
    fn from(v: CustomValue) -> Self {
        match v {
            CustomValue::Bool(b) => serde_json::Value::Bool(b),
            CustomValue::Int(i) => serde_json::Value::from(i),
            // NaN/inf have no JSON form
            CustomValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CustomValue::String(s) => serde_json::Value::String(s),
            CustomValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            CustomValue::Map(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl TryFrom<serde_json::Value> for CustomValue {
    type Error = NodeError;

    /// `null` has no custom data form.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Err(NodeError::InvalidCustomData(
                "null is not a custom data value".to_string(),
            )),
            serde_json::Value::Bool(b) => Ok(CustomValue::Bool(b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(CustomValue::Int)
                .or_else(|| n.as_f64().map(CustomValue::Float))
                .ok_or_else(|| NodeError::InvalidCustomData(format!("number {} out of range", n))),
            serde_json::Value::String(s) => Ok(CustomValue::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(CustomValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(CustomValue::List),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| CustomValue::try_from(v).map(|v| (k, v)))
                .collect::<Result<CustomData, _>>()
                .map(CustomValue::Map),
        }
    }
}

/// 节点在画布上的位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 图节点快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// 节点 ID，在图内唯一
    pub node_id: String,

    /// 节点类型名称，对应注册表中的名称
    pub node_type: String,

    /// 节点位置，`None` 表示需要自动布局
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// 节点自定义数据
    #[serde(default)]
    pub custom_data: CustomData,
}

impl NodeData {
    pub fn new(
        node_id: impl Into<String>,
        node_type: impl Into<String>,
        position: Option<Position>,
        custom_data: CustomData,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: node_type.into(),
            position,
            custom_data,
        }
    }
}

/// 连接（有向多重图中的一条边）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionData {
    pub output_node_id: String,
    pub output_port: u32,
    pub input_node_id: String,
    pub input_port: u32,
}

impl ConnectionData {
    pub fn new(
        output_node_id: impl Into<String>,
        output_port: u32,
        input_node_id: impl Into<String>,
        input_port: u32,
    ) -> Self {
        Self {
            output_node_id: output_node_id.into(),
            output_port,
            input_node_id: input_node_id.into(),
            input_port,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.output_node_id == self.input_node_id
    }
}

/// 整张图的快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<NodeData>,
    #[serde(default)]
    pub connections: Vec<ConnectionData>,
}

impl GraphData {
    pub fn new(nodes: Vec<NodeData>, connections: Vec<ConnectionData>) -> Self {
        Self { nodes, connections }
    }

    /// Connections sorted by all fields, for order-insensitive comparison.
    pub fn sorted_connections(&self) -> Vec<ConnectionData> {
        let mut connections = self.connections.clone();
        connections.sort();
        connections
    }
}

/// Read-only view of the graph being serialized, handed to node serializers
/// so a node's text may refer to its siblings.
pub trait GraphSerializationContext {
    fn nodes(&self) -> &[NodeData];

    fn connections(&self) -> &[ConnectionData];

    fn node(&self, node_id: &str) -> Option<&NodeData> {
        self.nodes().iter().find(|n| n.node_id == node_id)
    }

    /// Connections leaving `node_id`, in graph order.
    fn outgoing(&self, node_id: &str) -> Vec<&ConnectionData> {
        self.connections()
            .iter()
            .filter(|c| c.output_node_id == node_id)
            .collect()
    }

    /// Connections entering `node_id`, in graph order.
    fn incoming(&self, node_id: &str) -> Vec<&ConnectionData> {
        self.connections()
            .iter()
            .filter(|c| c.input_node_id == node_id)
            .collect()
    }
}

impl GraphSerializationContext for GraphData {
    fn nodes(&self) -> &[NodeData] {
        &self.nodes
    }

    fn connections(&self) -> &[ConnectionData] {
        &self.connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> GraphData {
        GraphData::new(
            vec![
                NodeData::new("a", "dialogue", None, CustomData::new()),
                NodeData::new("b", "choice", Some(Position::new(1.0, 2.0)), CustomData::new()),
            ],
            vec![
                ConnectionData::new("a", 0, "b", 0),
                ConnectionData::new("b", 0, "a", 0),
                ConnectionData::new("a", 1, "b", 0),
            ],
        )
    }

    #[test]
    fn test_context_lookup() {
        let graph = sample_graph();
        assert_eq!(graph.node("b").map(|n| n.node_type.as_str()), Some("choice"));
        assert!(graph.node("missing").is_none());
        assert_eq!(graph.outgoing("a").len(), 2);
        assert_eq!(graph.incoming("a").len(), 1);
    }

    #[test]
    fn test_sorted_connections() {
        let graph = sample_graph();
        let sorted = graph.sorted_connections();
        assert_eq!(sorted[0], ConnectionData::new("a", 0, "b", 0));
        assert_eq!(sorted[1], ConnectionData::new("a", 1, "b", 0));
        assert_eq!(sorted[2], ConnectionData::new("b", 0, "a", 0));
    }

    #[test]
    fn test_self_loop() {
        assert!(ConnectionData::new("a", 0, "a", 1).is_self_loop());
        assert!(!ConnectionData::new("a", 0, "b", 0).is_self_loop());
    }

    #[test]
    fn test_custom_value_json_keeps_int_and_float_apart() {
        let int: CustomValue = serde_json::from_str("1").unwrap();
        let float: CustomValue = serde_json::from_str("1.0").unwrap();
        assert_eq!(int, CustomValue::Int(1));
        assert_eq!(float, CustomValue::Float(1.0));
        assert_eq!(serde_json::to_string(&CustomValue::Float(1.0)).unwrap(), "1.0");
    }

    #[test]
    fn test_custom_value_nested() {
        let value: CustomValue =
            serde_json::from_str(r#"{"tags": ["a", true, 2], "inner": {"x": 1.5}}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(
            map["tags"],
            CustomValue::List(vec!["a".into(), true.into(), 2i64.into()])
        );
        assert_eq!(map["inner"].as_map().unwrap()["x"].as_float(), Some(1.5));
    }

    #[test]
    fn test_custom_value_rejects_null() {
        assert!(serde_json::from_str::<CustomValue>("null").is_err());
    }

    #[test]
    fn test_json_value_conversion() {
        let json = serde_json::json!({"id": 3, "w": 0.5, "tags": ["x", false]});
        let value = CustomValue::try_from(json.clone()).unwrap();
        assert_eq!(value.as_map().unwrap()["id"], CustomValue::Int(3));
        assert_eq!(serde_json::Value::from(value), json);

        assert!(CustomValue::try_from(serde_json::json!([1, null])).is_err());
    }

    #[test]
    fn test_is_finite() {
        assert!(CustomValue::Float(1.0).is_finite());
        assert!(!CustomValue::List(vec![CustomValue::Float(f64::NAN)]).is_finite());
        let mut inner = CustomData::new();
        inner.insert("x".into(), CustomValue::Float(f64::INFINITY));
        assert!(!CustomValue::Map(inner).is_finite());
    }
}
