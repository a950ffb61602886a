//! Connection ordering and restoration.
//!
//! Serializing, nodes are laid out depth-first so that chains of dialogue read
//! top to bottom. A fragment implicitly connects to the one after it (output 0
//! to input 0) whenever the compatibility table allows that pair; every other
//! connection is carried by an explicit `->` directive, and a `-|` directive
//! cancels an implicit connection the graph does not have. Restoring applies
//! the same rule in reverse.

use std::collections::{HashMap, HashSet};

use crate::graph::{ConnectionData, GraphData, NodeData};
use crate::nodes::CompatibilityTable;

use super::fragment::{FragmentHeader, FragmentLink, ParsedNodeFragment};

/// Encodes connectivity into fragment order and decodes it back.
pub trait ConnectionOrdering: Send + Sync {
    /// Order the serialized nodes and frame each body as a complete fragment.
    ///
    /// `bodies` maps node id to serialized body; nodes missing from it are not
    /// emitted.
    fn order(&self, graph: &GraphData, bodies: &HashMap<String, String>) -> Vec<String>;

    /// Rebuild connections from parsed fragments and the nodes decoded from them.
    fn restore(&self, fragments: &[ParsedNodeFragment], nodes: &[NodeData]) -> Vec<ConnectionData>;
}

/// Depth-first chain ordering driven by a [`CompatibilityTable`].
#[derive(Debug, Clone, Default)]
pub struct ChainOrdering {
    table: CompatibilityTable,
}

/// An outgoing connection between two emitted nodes, by index into `graph.nodes`.
#[derive(Debug, Clone, Copy)]
struct OutEdge {
    output_port: u32,
    target: usize,
    input_port: u32,
    connection: usize,
}

impl OutEdge {
    fn sort_key(&self) -> (u32, usize, u32, usize) {
        (self.output_port, self.target, self.input_port, self.connection)
    }
}

/// Connectivity restricted to the emitted nodes.
struct EmittedGraph {
    /// Indices into `graph.nodes`, first occurrence of each id, in graph order.
    included: Vec<usize>,
    /// Outgoing edges per node index, self-loops included, sorted.
    outgoing: HashMap<usize, Vec<OutEdge>>,
    in_degree: HashMap<usize, usize>,
}

impl EmittedGraph {
    fn build(graph: &GraphData, emitted: &dyn Fn(&str) -> bool) -> Self {
        let mut index_of: HashMap<&str, usize> = HashMap::new();
        let mut included = Vec::new();
        for (idx, node) in graph.nodes.iter().enumerate() {
            if !emitted(&node.node_id) || index_of.contains_key(node.node_id.as_str()) {
                continue;
            }
            index_of.insert(node.node_id.as_str(), idx);
            included.push(idx);
        }

        let mut outgoing: HashMap<usize, Vec<OutEdge>> = HashMap::new();
        let mut in_degree: HashMap<usize, usize> = HashMap::new();
        for (ci, conn) in graph.connections.iter().enumerate() {
            let from = index_of.get(conn.output_node_id.as_str());
            let to = index_of.get(conn.input_node_id.as_str());
            let (Some(&from), Some(&to)) = (from, to) else {
                tracing::debug!(
                    output = %conn.output_node_id,
                    input = %conn.input_node_id,
                    "connection endpoint not emitted; dropping connection"
                );
                continue;
            };
            outgoing.entry(from).or_default().push(OutEdge {
                output_port: conn.output_port,
                target: to,
                input_port: conn.input_port,
                connection: ci,
            });
            if from != to {
                *in_degree.entry(to).or_default() += 1;
            }
        }
        for edges in outgoing.values_mut() {
            edges.sort_by_key(OutEdge::sort_key);
        }

        Self {
            included,
            outgoing,
            in_degree,
        }
    }

    fn edges(&self, idx: usize) -> &[OutEdge] {
        self.outgoing.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first pre-order from each root, then unreached nodes in graph order.
    fn emission_order(&self) -> Vec<usize> {
        let mut visited: HashSet<usize> = HashSet::new();
        let mut order = Vec::with_capacity(self.included.len());

        let roots = self
            .included
            .iter()
            .copied()
            .filter(|idx| self.in_degree.get(idx).copied().unwrap_or(0) == 0);

        for root in roots {
            let mut stack = vec![root];
            while let Some(idx) = stack.pop() {
                if !visited.insert(idx) {
                    continue;
                }
                order.push(idx);
                for edge in self.edges(idx).iter().rev() {
                    if !visited.contains(&edge.target) {
                        stack.push(edge.target);
                    }
                }
            }
        }

        for &idx in &self.included {
            if visited.insert(idx) {
                order.push(idx);
            }
        }
        order
    }
}

impl ChainOrdering {
    pub fn new(table: CompatibilityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CompatibilityTable {
        &self.table
    }

    /// Node ids in the order [`order`](ConnectionOrdering::order) emits them.
    pub fn emission_order(&self, graph: &GraphData, emitted: &HashSet<String>) -> Vec<String> {
        let emitted_graph = EmittedGraph::build(graph, &|id| emitted.contains(id));
        emitted_graph
            .emission_order()
            .into_iter()
            .map(|idx| graph.nodes[idx].node_id.clone())
            .collect()
    }
}

impl ConnectionOrdering for ChainOrdering {
    fn order(&self, graph: &GraphData, bodies: &HashMap<String, String>) -> Vec<String> {
        let emitted_graph = EmittedGraph::build(graph, &|id| bodies.contains_key(id));
        let order = emitted_graph.emission_order();

        let mut fragments = Vec::with_capacity(order.len());
        for (pos, &idx) in order.iter().enumerate() {
            let node = &graph.nodes[idx];
            let mut header = FragmentHeader::new(node.node_type.as_str(), node.node_id.as_str());
            let mut edges: Vec<OutEdge> = emitted_graph.edges(idx).to_vec();

            if let Some(&next) = order.get(pos + 1) {
                let next_node = &graph.nodes[next];
                if self
                    .table
                    .allows_default(&node.node_type, &next_node.node_type)
                {
                    let implied = edges
                        .iter()
                        .position(|e| e.target == next && e.output_port == 0 && e.input_port == 0);
                    match implied {
                        Some(i) => {
                            edges.remove(i);
                        }
                        None => header.stop = true,
                    }
                }
            }

            header.links = edges
                .iter()
                .map(|e| {
                    FragmentLink::new(
                        graph.nodes[e.target].node_id.as_str(),
                        e.output_port,
                        e.input_port,
                    )
                })
                .collect();

            let body = bodies
                .get(&node.node_id)
                .map(String::as_str)
                .unwrap_or_default();
            fragments.push(header.render(body));
        }
        fragments
    }

    fn restore(&self, fragments: &[ParsedNodeFragment], nodes: &[NodeData]) -> Vec<ConnectionData> {
        let decoded: HashSet<&str> = nodes.iter().map(|n| n.node_id.as_str()).collect();
        let mut connections = Vec::new();

        let mut keep = |conn: ConnectionData| {
            if decoded.contains(conn.output_node_id.as_str())
                && decoded.contains(conn.input_node_id.as_str())
            {
                connections.push(conn);
            } else {
                tracing::debug!(
                    output = %conn.output_node_id,
                    input = %conn.input_node_id,
                    "dropping dangling connection"
                );
            }
        };

        // A repeated id neither sources nor receives adjacency edges.
        let mut seen: HashSet<&str> = HashSet::new();
        let first: Vec<bool> = fragments
            .iter()
            .map(|f| seen.insert(f.node_id.as_str()))
            .collect();

        for (i, fragment) in fragments.iter().enumerate() {
            if !first[i] {
                continue;
            }
            if !fragment.stop {
                if let Some(next) = fragments.get(i + 1).filter(|_| first[i + 1]) {
                    if self
                        .table
                        .allows_default(&fragment.node_type, &next.node_type)
                    {
                        keep(ConnectionData::new(
                            fragment.node_id.as_str(),
                            0,
                            next.node_id.as_str(),
                            0,
                        ));
                    }
                }
            }
            for link in &fragment.links {
                keep(ConnectionData::new(
                    fragment.node_id.as_str(),
                    link.output_port,
                    link.target.as_str(),
                    link.input_port,
                ));
            }
        }

        connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CustomData;
    use crate::nodes::PortTargets;

    fn table() -> CompatibilityTable {
        let mut table = CompatibilityTable::new();
        table.declare_output("dialogue", 0, PortTargets::only(["dialogue", "choice"]));
        table.declare_input("dialogue", 0, PortTargets::only(["dialogue", "choice"]));
        table.declare_output("choice", 0, PortTargets::only(["dialogue"]));
        table.declare_input("choice", 0, PortTargets::only(["dialogue"]));
        table
    }

    fn node(id: &str, node_type: &str) -> NodeData {
        NodeData::new(id, node_type, None, CustomData::new())
    }

    fn conn(from: &str, out: u32, to: &str, inp: u32) -> ConnectionData {
        ConnectionData::new(from, out, to, inp)
    }

    fn bodies(graph: &GraphData) -> HashMap<String, String> {
        graph
            .nodes
            .iter()
            .map(|n| (n.node_id.clone(), String::new()))
            .collect()
    }

    fn all_ids(graph: &GraphData) -> HashSet<String> {
        graph.nodes.iter().map(|n| n.node_id.clone()).collect()
    }

    fn parse(fragment: &str) -> ParsedNodeFragment {
        let lines: Vec<String> = fragment.lines().map(str::to_string).collect();
        match super::super::fragment::parse_fragment(&lines) {
            super::super::fragment::FragmentParse::Parsed(f) => f,
            other => panic!("unexpected {:?}", other),
        }
    }

    fn round_trip(ordering: &ChainOrdering, graph: &GraphData) -> Vec<ConnectionData> {
        let fragments: Vec<ParsedNodeFragment> = ordering
            .order(graph, &bodies(graph))
            .iter()
            .map(|f| parse(f))
            .collect();
        let mut restored = ordering.restore(&fragments, &graph.nodes);
        restored.sort();
        restored
    }

    #[test]
    fn test_roots_first_then_depth_first() {
        let graph = GraphData::new(
            vec![node("c", "dialogue"), node("b", "dialogue"), node("a", "dialogue")],
            vec![conn("a", 0, "b", 0), conn("b", 0, "c", 0)],
        );
        let ordering = ChainOrdering::new(table());
        assert_eq!(ordering.emission_order(&graph, &all_ids(&graph)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tie_break_by_port_then_node_order() {
        let graph = GraphData::new(
            vec![
                node("root", "choice"),
                node("x", "dialogue"),
                node("y", "dialogue"),
                node("z", "dialogue"),
            ],
            vec![
                conn("root", 1, "x", 0),
                conn("root", 0, "z", 0),
                conn("root", 0, "y", 0),
            ],
        );
        let ordering = ChainOrdering::new(table());
        assert_eq!(
            ordering.emission_order(&graph, &all_ids(&graph)),
            vec!["root", "y", "z", "x"]
        );
    }

    #[test]
    fn test_cycle_terminates_and_emits_each_once() {
        let graph = GraphData::new(
            vec![node("a", "dialogue"), node("b", "dialogue"), node("c", "dialogue")],
            vec![conn("a", 0, "b", 0), conn("b", 0, "c", 0), conn("c", 0, "a", 0)],
        );
        let ordering = ChainOrdering::new(table());
        assert_eq!(ordering.emission_order(&graph, &all_ids(&graph)), vec!["a", "b", "c"]);
        assert_eq!(round_trip(&ordering, &graph), graph.sorted_connections());
    }

    #[test]
    fn test_unreachable_appended_in_original_order() {
        let graph = GraphData::new(
            vec![
                node("loop1", "dialogue"),
                node("lone", "choice"),
                node("root", "dialogue"),
                node("loop2", "dialogue"),
            ],
            vec![conn("loop1", 0, "loop2", 0), conn("loop2", 0, "loop1", 0)],
        );
        let ordering = ChainOrdering::new(table());
        assert_eq!(
            ordering.emission_order(&graph, &all_ids(&graph)),
            vec!["lone", "root", "loop1", "loop2"]
        );
    }

    #[test]
    fn test_implicit_chain_has_no_directives() {
        let graph = GraphData::new(
            vec![node("n1", "dialogue"), node("n2", "choice"), node("n3", "dialogue")],
            vec![conn("n1", 0, "n2", 0), conn("n2", 0, "n3", 0)],
        );
        let ordering = ChainOrdering::new(table());
        let fragments = ordering.order(&graph, &bodies(&graph));
        assert_eq!(fragments, vec!["@dialogue n1", "@choice n2", "@dialogue n3"]);
        assert_eq!(round_trip(&ordering, &graph), graph.sorted_connections());
    }

    #[test]
    fn test_stop_directive_when_adjacent_but_unconnected() {
        let graph = GraphData::new(
            vec![node("n1", "dialogue"), node("n2", "dialogue")],
            vec![],
        );
        let ordering = ChainOrdering::new(table());
        let fragments = ordering.order(&graph, &bodies(&graph));
        assert_eq!(fragments, vec!["@dialogue n1\n-|", "@dialogue n2"]);
        assert!(round_trip(&ordering, &graph).is_empty());
    }

    #[test]
    fn test_branches_use_explicit_links() {
        let graph = GraphData::new(
            vec![
                node("q", "dialogue"),
                node("pick", "choice"),
                node("yes", "dialogue"),
                node("no", "dialogue"),
            ],
            vec![
                conn("q", 0, "pick", 0),
                conn("pick", 0, "yes", 0),
                conn("pick", 0, "no", 0),
                conn("pick", 2, "q", 0),
            ],
        );
        let ordering = ChainOrdering::new(table());
        let fragments = ordering.order(&graph, &bodies(&graph));
        assert_eq!(
            fragments,
            vec![
                "@dialogue q",
                "@choice pick\n-> no\n-> q 2:0",
                "@dialogue yes\n-|",
                "@dialogue no",
            ]
        );
        assert_eq!(round_trip(&ordering, &graph), graph.sorted_connections());
    }

    #[test]
    fn test_multigraph_and_self_loop() {
        let graph = GraphData::new(
            vec![node("a", "dialogue"), node("b", "dialogue")],
            vec![
                conn("a", 0, "b", 0),
                conn("a", 0, "b", 0),
                conn("a", 1, "a", 1),
            ],
        );
        let ordering = ChainOrdering::new(table());
        assert_eq!(round_trip(&ordering, &graph), graph.sorted_connections());
    }

    #[test]
    fn test_without_table_everything_is_explicit() {
        let graph = GraphData::new(
            vec![node("a", "dialogue"), node("b", "dialogue")],
            vec![conn("a", 0, "b", 0)],
        );
        let ordering = ChainOrdering::default();
        let fragments = ordering.order(&graph, &bodies(&graph));
        assert_eq!(fragments, vec!["@dialogue a\n-> b", "@dialogue b"]);
        assert_eq!(round_trip(&ordering, &graph), graph.sorted_connections());
    }

    #[test]
    fn test_excluded_nodes_are_not_emitted() {
        let graph = GraphData::new(
            vec![node("a", "dialogue"), node("hidden", "dialogue"), node("b", "dialogue")],
            vec![conn("a", 0, "hidden", 0), conn("hidden", 0, "b", 0)],
        );
        let mut partial = bodies(&graph);
        partial.remove("hidden");
        let ordering = ChainOrdering::new(table());
        let fragments = ordering.order(&graph, &partial);
        assert_eq!(fragments, vec!["@dialogue a\n-|", "@dialogue b"]);
    }

    #[test]
    fn test_restore_drops_dangling() {
        let ordering = ChainOrdering::new(table());
        let mut first = ParsedNodeFragment::new("a", "dialogue", "");
        first.links.push(FragmentLink::new("ghost", 0, 0));
        first.links.push(FragmentLink::new("b", 1, 0));
        let fragments = vec![
            first,
            ParsedNodeFragment::new("skipped", "dialogue", ""),
            ParsedNodeFragment::new("b", "dialogue", ""),
        ];
        let nodes = vec![node("a", "dialogue"), node("b", "dialogue")];

        let restored = ordering.restore(&fragments, &nodes);
        assert_eq!(restored, vec![conn("a", 1, "b", 0)]);
    }

    #[test]
    fn test_restore_ignores_repeated_fragments() {
        let ordering = ChainOrdering::new(table());
        let mut repeat = ParsedNodeFragment::new("a", "dialogue", "");
        repeat.links.push(FragmentLink::new("b", 1, 0));
        let fragments = vec![
            ParsedNodeFragment::new("a", "dialogue", ""),
            ParsedNodeFragment::new("b", "dialogue", ""),
            repeat,
            ParsedNodeFragment::new("c", "dialogue", ""),
        ];
        let nodes = vec![node("a", "dialogue"), node("b", "dialogue"), node("c", "dialogue")];

        let restored = ordering.restore(&fragments, &nodes);
        assert_eq!(restored, vec![conn("a", 0, "b", 0)]);
    }

    #[test]
    fn test_order_is_deterministic() {
        let graph = GraphData::new(
            vec![
                node("q", "dialogue"),
                node("pick", "choice"),
                node("yes", "dialogue"),
                node("no", "dialogue"),
            ],
            vec![conn("q", 0, "pick", 0), conn("pick", 0, "no", 0), conn("pick", 0, "yes", 0)],
        );
        let ordering = ChainOrdering::new(table());
        let first = ordering.order(&graph, &bodies(&graph));
        for _ in 0..10 {
            assert_eq!(ordering.order(&graph, &bodies(&graph)), first);
        }
    }
}
