//! Live node instances built from a [`GraphData`] snapshot, and captured back.

use std::collections::HashSet;

use crate::nodes::{GraphNode, NodeTypeRegistry};

use super::types::{ConnectionData, GraphData, NodeData, Position};

/// A constructed node with its id and canvas position.
#[derive(Debug)]
pub struct LiveNode {
    pub node_id: String,
    pub node: Box<dyn GraphNode>,
    pub position: Option<Position>,
}

impl LiveNode {
    /// Nodes restored without a position are left for the editor to lay out.
    pub fn needs_layout(&self) -> bool {
        self.position.is_none()
    }
}

#[derive(Debug, Default)]
pub struct LiveGraph {
    nodes: Vec<LiveNode>,
    connections: Vec<ConnectionData>,
}

impl LiveGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct every node through the registry and keep the connections
    /// between nodes that were built.
    ///
    /// Nodes with no constructor, or that reject their custom data, are
    /// skipped. Ids are kept verbatim.
    pub fn restore(data: &GraphData, registry: &NodeTypeRegistry) -> Self {
        let mut graph = Self::new();
        let mut built: HashSet<&str> = HashSet::new();

        for node_data in &data.nodes {
            if built.contains(node_data.node_id.as_str()) {
                tracing::warn!(node_id = %node_data.node_id, "duplicate node id; keeping the first node");
                continue;
            }
            let Some(mut node) = registry.create(&node_data.node_type) else {
                tracing::warn!(
                    node_id = %node_data.node_id,
                    node_type = %node_data.node_type,
                    "node type cannot be constructed; skipping node"
                );
                continue;
            };
            if let Err(e) = node.set_custom_data(node_data.custom_data.clone()) {
                tracing::warn!(
                    node_id = %node_data.node_id,
                    node_type = %node_data.node_type,
                    error = %e,
                    "node rejected its custom data; skipping node"
                );
                continue;
            }

            built.insert(&node_data.node_id);
            graph.nodes.push(LiveNode {
                node_id: node_data.node_id.clone(),
                node,
                position: node_data.position,
            });
        }

        for conn in &data.connections {
            if built.contains(conn.output_node_id.as_str())
                && built.contains(conn.input_node_id.as_str())
            {
                graph.connections.push(conn.clone());
            } else {
                tracing::debug!(
                    output = %conn.output_node_id,
                    input = %conn.input_node_id,
                    "dropping connection to a node that was not restored"
                );
            }
        }

        graph
    }

    pub fn nodes(&self) -> &[LiveNode] {
        &self.nodes
    }

    pub fn node(&self, node_id: &str) -> Option<&LiveNode> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    pub fn connections(&self) -> &[ConnectionData] {
        &self.connections
    }

    /// Ids of nodes waiting for automatic layout.
    pub fn needs_layout(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.needs_layout())
            .map(|n| n.node_id.as_str())
            .collect()
    }

    /// Capture a fresh snapshot.
    pub fn graph_data(&self) -> GraphData {
        let nodes = self
            .nodes
            .iter()
            .map(|live| {
                NodeData::new(
                    live.node_id.as_str(),
                    live.node.node_type(),
                    live.position,
                    live.node.custom_data(),
                )
            })
            .collect();
        GraphData::new(nodes, self.connections.clone())
    }
}
