//! # textual-graph: a text codec for node graphs
//!
//! `textual_graph` turns a node graph (dialogue trees, choice graphs and other
//! editor graphs) into a diff-friendly text document and back:
//!
//! - **Node type registry**: node kinds and per-type serializers are contributed
//!   by plugins, discovered with [`NodeTypeRegistry::rescan`] and activated from
//!   configuration with [`NodeTypeRegistry::reconcile`].
//! - **Fragments**: each node becomes one framed fragment (`@type id` header plus
//!   an opaque body owned by that type's [`NodeSerializer`]).
//! - **Ordering**: fragments are laid out depth-first so that chains read top to
//!   bottom; adjacency plus `->` / `-|` directives carry every connection.
//! - **Best effort**: unknown types, malformed fragments and dangling connections
//!   are skipped and logged instead of failing the document.
//!
//! # Quick Start
//!
//! ```rust
//! # #[cfg(feature = "builtin-sample-nodes")]
//! # fn main() -> Result<(), textual_graph::GraphError> {
//! use textual_graph::{
//!     ConnectionData, FormatConfig, GraphData, NodeData, NodeTypeConfig, NodeTypeRegistry,
//!     TextGraphSerializer,
//! };
//! use textual_graph::nodes::{ChoiceNode, DialogueNode, GraphNode};
//!
//! let mut registry = NodeTypeRegistry::with_builtin_plugins();
//! registry.reconcile(&[NodeTypeConfig::new("dialogue"), NodeTypeConfig::new("choice")])?;
//! let codec = TextGraphSerializer::from_registry(&registry, &FormatConfig::default());
//!
//! let line = DialogueNode { id: 1, text: "Where to?".into() };
//! let graph = GraphData::new(
//!     vec![
//!         NodeData::new("n1", "dialogue", None, line.custom_data()),
//!         NodeData::new("n2", "choice", None, ChoiceNode { id: 2 }.custom_data()),
//!     ],
//!     vec![ConnectionData::new("n1", 0, "n2", 0)],
//! );
//!
//! let text = codec.serialize_to_string(&graph)?;
//! assert_eq!(codec.deserialize_str(&text)?, graph);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "builtin-sample-nodes"))]
//! # fn main() {}
//! ```
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `builtin-sample-nodes` | Bundles the `dialogue`, `choice` and `relay` node types (default) |

pub mod config;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod serialization;

pub use config::{
    load_config, parse_config, ConfigFormat, ConnectionPolicy, FormatConfig, GraphConfig,
    NodeTypeConfig,
};
pub use error::{
    GraphError, GraphResult, NodeError, RegistryError, SerializerError, SerializerResult,
};
pub use graph::{
    validate_graph, ConnectionData, CustomData, CustomValue, GraphData,
    GraphSerializationContext, LiveGraph, NodeData, Position, ValidationReport,
};
pub use nodes::{
    CompatibilityTable, NodeKind, NodePlugin, NodeTypeRegistry, PortTargets,
    SharedNodeTypeRegistry,
};
pub use serialization::{
    ChainOrdering, ConnectionOrdering, FragmentParser, FragmentWriter, MarkerFragmentParser,
    MarkerFragmentWriter, NodeDeserializeResult, NodeSerializer, NullNodeSerializer,
    ParsedNodeFragment, TextGraphSerializer,
};
