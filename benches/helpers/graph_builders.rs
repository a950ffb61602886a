#![allow(dead_code)]

use textual_graph::nodes::{ChoiceNode, DialogueNode, GraphNode};
use textual_graph::{ConnectionData, GraphData, NodeData, Position};

fn dialogue(id: usize, text: &str) -> NodeData {
    let data = DialogueNode {
        id: id as i64,
        text: text.to_string(),
    }
    .custom_data();
    NodeData::new(
        format!("d{}", id),
        "dialogue",
        Some(Position::new(0.0, id as f32 * 40.0)),
        data,
    )
}

/// `d0 -> d1 -> ... -> d{n-1}`, fully implicit in text form.
pub fn build_linear_dialogue(node_count: usize) -> GraphData {
    let node_count = node_count.max(1);
    let nodes = (0..node_count)
        .map(|i| dialogue(i, &format!("Line number {}", i)))
        .collect();
    let connections = (1..node_count)
        .map(|i| ConnectionData::new(format!("d{}", i - 1), 0, format!("d{}", i), 0))
        .collect();
    GraphData::new(nodes, connections)
}

/// A question, a choice fanning out to `branches` answers, all joining one
/// closing line. Exercises explicit link directives.
pub fn build_branching_dialogue(branches: usize) -> GraphData {
    let branches = branches.max(1);
    let mut nodes = vec![dialogue(0, "Which way?")];
    let mut connections = Vec::new();

    nodes.push(NodeData::new(
        "pick",
        "choice",
        None,
        ChoiceNode { id: 1 }.custom_data(),
    ));
    connections.push(ConnectionData::new("d0", 0, "pick", 0));

    let close = branches + 1;
    for b in 0..branches {
        let answer = dialogue(b + 1, &format!("Branch {}", b));
        connections.push(ConnectionData::new("pick", 0, answer.node_id.as_str(), 0));
        connections.push(ConnectionData::new(
            answer.node_id.as_str(),
            0,
            format!("d{}", close),
            0,
        ));
        nodes.push(answer);
    }
    nodes.push(dialogue(close, "Onwards."));

    GraphData::new(nodes, connections)
}
