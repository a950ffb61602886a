pub mod graph_builders;

use textual_graph::{FormatConfig, NodeTypeConfig, NodeTypeRegistry, TextGraphSerializer};

pub fn bench_codec() -> TextGraphSerializer {
    let mut registry = NodeTypeRegistry::with_builtin_plugins();
    let configs: Vec<NodeTypeConfig> = ["dialogue", "choice", "relay"]
        .into_iter()
        .map(NodeTypeConfig::new)
        .collect();
    registry
        .reconcile(&configs)
        .expect("failed to register sample node types");
    TextGraphSerializer::from_registry(&registry, &FormatConfig::default())
}
