//! Node types: descriptors, plugins and the type registry.

pub mod compatibility;
pub mod kind;
pub mod plugin;
pub mod registry;
pub mod utils;

#[cfg(feature = "builtin-sample-nodes")]
pub mod choice;
#[cfg(feature = "builtin-sample-nodes")]
pub mod dialogue;
#[cfg(feature = "builtin-sample-nodes")]
pub mod relay;
#[cfg(feature = "builtin-sample-nodes")]
pub mod samples;

pub use compatibility::CompatibilityTable;
pub use kind::{GraphNode, NodeConstructor, NodeKind, PortTargets};
pub use plugin::{CatalogContext, NodePlugin, TypeCatalog};
pub use registry::{NodeTypeRegistry, SharedNodeTypeRegistry};

#[cfg(feature = "builtin-sample-nodes")]
pub use choice::{ChoiceNode, ChoiceSerializer, CHOICE};
#[cfg(feature = "builtin-sample-nodes")]
pub use dialogue::{DialogueNode, DialogueSerializer, DIALOGUE};
#[cfg(feature = "builtin-sample-nodes")]
pub use relay::{RelayNode, RelaySerializer, RELAY};
#[cfg(feature = "builtin-sample-nodes")]
pub use samples::{SamplesPlugin, SAMPLES_PLUGIN_ID};
