//! Node kinds: the declarative descriptor a node type contributes to the registry.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::error::NodeError;
use crate::graph::CustomData;

/// A live node instance produced by a [`NodeKind`] constructor.
pub trait GraphNode: Send + Sync + fmt::Debug {
    /// Type name, equal to the name of the kind that built it.
    fn node_type(&self) -> &str;

    /// Snapshot of the node's custom data.
    fn custom_data(&self) -> CustomData;

    /// Replace the node's custom data; rejects data that does not fit its schema.
    fn set_custom_data(&mut self, data: CustomData) -> Result<(), NodeError>;
}

/// Zero-argument construction capability.
pub type NodeConstructor = Arc<dyn Fn() -> Box<dyn GraphNode> + Send + Sync>;

/// Which node types a port accepts on its far end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortTargets {
    /// Any node type.
    Any,
    /// Only the named types. An empty set accepts nothing.
    Only(BTreeSet<String>),
}

impl PortTargets {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PortTargets::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn admits(&self, node_type: &str) -> bool {
        match self {
            PortTargets::Any => true,
            PortTargets::Only(names) => names.contains(node_type),
        }
    }
}

/// Descriptor of one node type: its name, constructor, port rules and capacities.
#[derive(Clone)]
pub struct NodeKind {
    name: String,
    constructor: NodeConstructor,
    outputs: BTreeMap<u32, PortTargets>,
    inputs: BTreeMap<u32, PortTargets>,
    max_outputs: BTreeMap<u32, usize>,
    max_inputs: BTreeMap<u32, usize>,
}

impl NodeKind {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn GraphNode> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
            outputs: BTreeMap::new(),
            inputs: BTreeMap::new(),
            max_outputs: BTreeMap::new(),
            max_inputs: BTreeMap::new(),
        }
    }

    /// Declare which node types output `port` may connect to.
    pub fn with_output(mut self, port: u32, targets: PortTargets) -> Self {
        self.outputs.insert(port, targets);
        self
    }

    /// Declare which node types may connect into input `port`.
    pub fn with_input(mut self, port: u32, sources: PortTargets) -> Self {
        self.inputs.insert(port, sources);
        self
    }

    pub fn with_max_outputs(mut self, port: u32, max: usize) -> Self {
        self.max_outputs.insert(port, max);
        self
    }

    pub fn with_max_inputs(mut self, port: u32, max: usize) -> Self {
        self.max_inputs.insert(port, max);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor(&self) -> NodeConstructor {
        Arc::clone(&self.constructor)
    }

    pub fn create(&self) -> Box<dyn GraphNode> {
        (self.constructor)()
    }

    /// Rule for an output port; undeclared ports accept nothing.
    pub fn output_targets(&self, port: u32) -> Option<&PortTargets> {
        self.outputs.get(&port)
    }

    pub fn input_sources(&self, port: u32) -> Option<&PortTargets> {
        self.inputs.get(&port)
    }

    pub fn outputs(&self) -> impl Iterator<Item = (u32, &PortTargets)> {
        self.outputs.iter().map(|(p, t)| (*p, t))
    }

    pub fn inputs(&self) -> impl Iterator<Item = (u32, &PortTargets)> {
        self.inputs.iter().map(|(p, t)| (*p, t))
    }

    /// `None` means unlimited.
    pub fn max_output_connections(&self, port: u32) -> Option<usize> {
        self.max_outputs.get(&port).copied()
    }

    /// `None` means unlimited.
    pub fn max_input_connections(&self, port: u32) -> Option<usize> {
        self.max_inputs.get(&port).copied()
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeKind")
            .field("name", &self.name)
            .field("outputs", &self.outputs)
            .field("inputs", &self.inputs)
            .field("max_outputs", &self.max_outputs)
            .field("max_inputs", &self.max_inputs)
            .finish_non_exhaustive()
    }
}
