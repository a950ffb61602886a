//! Graph ⇄ text orchestrator.

use std::collections::{HashMap, HashSet};
use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::config::FormatConfig;
use crate::error::{GraphError, GraphResult, SerializerError};
use crate::graph::{GraphData, NodeData};
use crate::nodes::NodeTypeRegistry;

use super::fragment::is_header_token;
use super::node_serializer::NodeSerializer;
use super::ordering::{ChainOrdering, ConnectionOrdering};
use super::parser::{FragmentParser, MarkerFragmentParser};
use super::writer::{FragmentWriter, MarkerFragmentWriter};

/// 图文本序列化器
///
/// Per-node problems (no serializer, guard rejection, bad data, malformed
/// fragment, dangling connection) skip that node and are logged. Only sink I/O
/// failures and a serializer that reports `Unsupported` despite accepting the
/// node are returned as errors.
pub struct TextGraphSerializer {
    serializers: HashMap<String, Arc<dyn NodeSerializer>>,
    ordering: Box<dyn ConnectionOrdering>,
    parser: Box<dyn FragmentParser>,
    writer: Box<dyn FragmentWriter>,
}

impl TextGraphSerializer {
    pub fn new(
        serializers: HashMap<String, Arc<dyn NodeSerializer>>,
        ordering: Box<dyn ConnectionOrdering>,
        parser: Box<dyn FragmentParser>,
        writer: Box<dyn FragmentWriter>,
    ) -> Self {
        Self {
            serializers,
            ordering,
            parser,
            writer,
        }
    }

    /// Default parser, writer and chain ordering over the registry's active
    /// serializers and compatibility table.
    ///
    /// The serializer set is a snapshot; reconcile the registry first, then
    /// build a new serializer after any later change.
    pub fn from_registry(registry: &NodeTypeRegistry, format: &FormatConfig) -> Self {
        Self::new(
            registry.serializers(),
            Box::new(ChainOrdering::new(registry.compatibility())),
            Box::new(MarkerFragmentParser::new(format.clone())),
            Box::new(MarkerFragmentWriter::new(format.clone())),
        )
    }

    pub fn serializer(&self, node_type: &str) -> Option<&Arc<dyn NodeSerializer>> {
        self.serializers.get(node_type)
    }

    pub fn serialize(&self, sink: &mut dyn Write, graph: &GraphData) -> GraphResult<()> {
        let bodies = self.serialize_nodes(graph)?;
        let fragments = self.ordering.order(graph, &bodies);

        self.writer.begin(sink)?;
        let count = fragments.len();
        for (i, fragment) in fragments.iter().enumerate() {
            self.writer.write_fragment(sink, fragment, i + 1 == count)?;
        }
        self.writer.end(sink)?;
        sink.flush()?;

        tracing::debug!(
            nodes = graph.nodes.len(),
            written = count,
            "graph serialized"
        );
        Ok(())
    }

    pub fn deserialize(&self, source: &mut dyn BufRead) -> GraphResult<GraphData> {
        let fragments = self.parser.parse(source)?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut nodes = Vec::with_capacity(fragments.len());
        for fragment in &fragments {
            if !seen.insert(fragment.node_id.as_str()) {
                tracing::warn!(node_id = %fragment.node_id, "duplicate node id; keeping the first fragment");
                continue;
            }

            let Some(serializer) = self.serializers.get(&fragment.node_type) else {
                tracing::debug!(
                    node_id = %fragment.node_id,
                    node_type = %fragment.node_type,
                    "no serializer for node type; skipping fragment"
                );
                continue;
            };
            if !serializer.can_deserialize(fragment) {
                tracing::debug!(
                    node_id = %fragment.node_id,
                    node_type = %fragment.node_type,
                    "serializer declined fragment"
                );
                continue;
            }

            match serializer.deserialize(&fragment.text) {
                Ok(decoded) => nodes.push(NodeData::new(
                    fragment.node_id.as_str(),
                    fragment.node_type.as_str(),
                    decoded.position_hint,
                    decoded.custom_data,
                )),
                Err(e) => self.recover(e, &fragment.node_id, &fragment.node_type)?,
            }
        }

        // Adjacency is judged on every well-formed fragment, so a node skipped
        // here cannot make its neighbours look adjacent.
        let connections = self.ordering.restore(&fragments, &nodes);
        tracing::debug!(
            fragments = fragments.len(),
            nodes = nodes.len(),
            connections = connections.len(),
            "graph deserialized"
        );
        Ok(GraphData::new(nodes, connections))
    }

    pub fn serialize_to_string(&self, graph: &GraphData) -> GraphResult<String> {
        let mut buffer = Vec::new();
        self.serialize(&mut buffer, graph)?;
        String::from_utf8(buffer)
            .map_err(|e| GraphError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    pub fn deserialize_str(&self, text: &str) -> GraphResult<GraphData> {
        self.deserialize(&mut text.as_bytes())
    }

    fn serialize_nodes(&self, graph: &GraphData) -> GraphResult<HashMap<String, String>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut bodies = HashMap::with_capacity(graph.nodes.len());

        for node in &graph.nodes {
            if !seen.insert(node.node_id.as_str()) {
                tracing::warn!(node_id = %node.node_id, "duplicate node id; keeping the first node");
                continue;
            }
            if !is_header_token(&node.node_id) || !is_header_token(&node.node_type) {
                tracing::warn!(
                    node_id = %node.node_id,
                    node_type = %node.node_type,
                    "node id or type cannot be framed; skipping node"
                );
                continue;
            }

            let Some(serializer) = self.serializers.get(&node.node_type) else {
                tracing::debug!(
                    node_id = %node.node_id,
                    node_type = %node.node_type,
                    "no serializer for node type; skipping node"
                );
                continue;
            };
            if !serializer.can_serialize(node, graph) {
                tracing::debug!(
                    node_id = %node.node_id,
                    node_type = %node.node_type,
                    "serializer declined node"
                );
                continue;
            }

            let framed = serializer.serialize(node, graph).and_then(|body| {
                self.writer
                    .check_body(&body)
                    .map(|()| body)
                    .map_err(SerializerError::InvalidData)
            });
            match framed {
                Ok(body) => {
                    bodies.insert(node.node_id.clone(), body);
                }
                Err(e) => self.recover(e, &node.node_id, &node.node_type)?,
            }
        }
        Ok(bodies)
    }

    /// Data errors skip the node; a contract violation aborts.
    fn recover(&self, error: SerializerError, node_id: &str, node_type: &str) -> GraphResult<()> {
        if error.is_contract_violation() {
            return Err(error.into());
        }
        tracing::warn!(
            node_id = %node_id,
            node_type = %node_type,
            error = %error,
            "serializer failed; skipping node"
        );
        Ok(())
    }
}

impl std::fmt::Debug for TextGraphSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&String> = self.serializers.keys().collect();
        types.sort();
        f.debug_struct("TextGraphSerializer")
            .field("serializers", &types)
            .finish_non_exhaustive()
    }
}
