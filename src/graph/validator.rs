use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::ConnectionPolicy;
use crate::nodes::NodeTypeRegistry;
use crate::serialization::fragment::is_header_token;

use super::types::GraphData;

/// Severity level of a validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: String,
    pub message: String,
    pub node_id: Option<String>,
}

/// 图验证报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .collect()
    }

    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .collect()
    }

    /// Codes of all diagnostics, in report order.
    pub fn codes(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.code.as_str()).collect()
    }
}

/// 验证图的合法性
///
/// Checks node ids, endpoint existence, self-loops against `policy`, and port
/// compatibility and capacity for node types the registry can construct. Types
/// the registry does not know at all only produce a warning; the codec keeps
/// them opaque.
pub fn validate_graph(
    graph: &GraphData,
    registry: &NodeTypeRegistry,
    policy: &ConnectionPolicy,
) -> ValidationReport {
    let mut diags = Vec::new();
    let mut node_types: HashMap<&str, &str> = HashMap::new();

    for node in &graph.nodes {
        if node_types.contains_key(node.node_id.as_str()) {
            diags.push(error(
                "E201",
                format!("Duplicate node id: {}", node.node_id),
                Some(node.node_id.as_str()),
            ));
            continue;
        }
        node_types.insert(&node.node_id, &node.node_type);

        if !is_header_token(&node.node_id) || !is_header_token(&node.node_type) {
            diags.push(error(
                "E207",
                format!(
                    "Node id '{}' or type '{}' cannot be written as text",
                    node.node_id, node.node_type
                ),
                Some(node.node_id.as_str()),
            ));
        }
        if registry.kind(&node.node_type).is_none()
            && registry.serializer(&node.node_type).is_none()
        {
            diags.push(warn(
                "W201",
                format!("Unknown node type: {}", node.node_type),
                Some(node.node_id.as_str()),
            ));
        }
    }

    let table = registry.compatibility();
    let mut out_counts: HashMap<(&str, u32), usize> = HashMap::new();
    let mut in_counts: HashMap<(&str, u32), usize> = HashMap::new();

    for conn in &graph.connections {
        let from = node_types.get(conn.output_node_id.as_str());
        let to = node_types.get(conn.input_node_id.as_str());
        let (Some(&from_type), Some(&to_type)) = (from, to) else {
            diags.push(error(
                "E202",
                format!(
                    "Connection {} -> {} references a missing node",
                    conn.output_node_id, conn.input_node_id
                ),
                None,
            ));
            continue;
        };

        if conn.is_self_loop() && !policy.allow_self_loops {
            diags.push(error(
                "E203",
                format!("Node {} connects to itself", conn.output_node_id),
                Some(conn.output_node_id.as_str()),
            ));
        }

        let both_known = registry.kind(from_type).is_some() && registry.kind(to_type).is_some();
        if both_known && !table.allows(from_type, conn.output_port, to_type, conn.input_port) {
            diags.push(error(
                "E204",
                format!(
                    "Port {}:{} of {} cannot connect to port {}:{} of {}",
                    from_type,
                    conn.output_port,
                    conn.output_node_id,
                    to_type,
                    conn.input_port,
                    conn.input_node_id
                ),
                Some(conn.output_node_id.as_str()),
            ));
        }

        *out_counts
            .entry((conn.output_node_id.as_str(), conn.output_port))
            .or_default() += 1;
        *in_counts
            .entry((conn.input_node_id.as_str(), conn.input_port))
            .or_default() += 1;
    }

    let mut reported: HashSet<(&str, &str, u32)> = HashSet::new();
    for conn in &graph.connections {
        let out_key = (conn.output_node_id.as_str(), conn.output_port);
        if let Some(&count) = out_counts.get(&out_key) {
            let max = node_types
                .get(out_key.0)
                .and_then(|t| registry.kind(t))
                .and_then(|k| k.max_output_connections(out_key.1));
            if let Some(max) = max {
                if count > max && reported.insert(("E205", out_key.0, out_key.1)) {
                    diags.push(error(
                        "E205",
                        format!(
                            "Output port {} of {} has {} connections (max {})",
                            out_key.1, out_key.0, count, max
                        ),
                        Some(out_key.0),
                    ));
                }
            }
        }

        let in_key = (conn.input_node_id.as_str(), conn.input_port);
        if let Some(&count) = in_counts.get(&in_key) {
            let max = node_types
                .get(in_key.0)
                .and_then(|t| registry.kind(t))
                .and_then(|k| k.max_input_connections(in_key.1));
            if let Some(max) = max {
                if count > max && reported.insert(("E206", in_key.0, in_key.1)) {
                    diags.push(error(
                        "E206",
                        format!(
                            "Input port {} of {} has {} connections (max {})",
                            in_key.1, in_key.0, count, max
                        ),
                        Some(in_key.0),
                    ));
                }
            }
        }
    }

    let is_valid = !diags.iter().any(|d| d.level == DiagnosticLevel::Error);
    if !is_valid {
        tracing::debug!(diagnostics = diags.len(), "graph failed validation");
    }
    ValidationReport {
        is_valid,
        diagnostics: diags,
    }
}

fn error(code: &str, message: String, node_id: Option<&str>) -> Diagnostic {
    Diagnostic {
        level: DiagnosticLevel::Error,
        code: code.to_string(),
        message,
        node_id: node_id.map(str::to_string),
    }
}

fn warn(code: &str, message: String, node_id: Option<&str>) -> Diagnostic {
    Diagnostic {
        level: DiagnosticLevel::Warning,
        code: code.to_string(),
        message,
        node_id: node_id.map(str::to_string),
    }
}
