use std::collections::BTreeMap;

use super::kind::{NodeKind, PortTargets};

/// 端口兼容表：(类型, 端口) -> 可连接的对端类型
///
/// A connection is allowed only when both ends agree: the source's output rule
/// admits the target type and the target's input rule admits the source type.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityTable {
    outputs: BTreeMap<(String, u32), PortTargets>,
    inputs: BTreeMap<(String, u32), PortTargets>,
}

impl CompatibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from the port rules declared by each kind.
    pub fn from_kinds<'a, I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = &'a NodeKind>,
    {
        let mut table = Self::new();
        for kind in kinds {
            for (port, targets) in kind.outputs() {
                table.declare_output(kind.name(), port, targets.clone());
            }
            for (port, sources) in kind.inputs() {
                table.declare_input(kind.name(), port, sources.clone());
            }
        }
        table
    }

    pub fn declare_output(&mut self, node_type: &str, port: u32, targets: PortTargets) {
        self.outputs.insert((node_type.to_string(), port), targets);
    }

    pub fn declare_input(&mut self, node_type: &str, port: u32, sources: PortTargets) {
        self.inputs.insert((node_type.to_string(), port), sources);
    }

    pub fn allows(&self, from_type: &str, output_port: u32, to_type: &str, input_port: u32) -> bool {
        let out_ok = self
            .outputs
            .get(&(from_type.to_string(), output_port))
            .map(|t| t.admits(to_type))
            .unwrap_or(false);
        if !out_ok {
            return false;
        }

        self.inputs
            .get(&(to_type.to_string(), input_port))
            .map(|s| s.admits(from_type))
            .unwrap_or(false)
    }

    /// Whether `from_type` feeds `to_type` on the default ports (0 -> 0).
    pub fn allows_default(&self, from_type: &str, to_type: &str) -> bool {
        self.allows(from_type, 0, to_type, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty() && self.inputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue_choice_table() -> CompatibilityTable {
        let mut table = CompatibilityTable::new();
        table.declare_output("dialogue", 0, PortTargets::only(["dialogue", "choice"]));
        table.declare_input("dialogue", 0, PortTargets::only(["dialogue", "choice"]));
        table.declare_output("choice", 0, PortTargets::only(["dialogue"]));
        table.declare_input("choice", 0, PortTargets::only(["dialogue"]));
        table
    }

    #[test]
    fn test_both_ends_must_agree() {
        let table = dialogue_choice_table();
        assert!(table.allows_default("dialogue", "choice"));
        assert!(table.allows_default("choice", "dialogue"));
        assert!(table.allows_default("dialogue", "dialogue"));
        // choice 只接受来自 dialogue 的输入
        assert!(!table.allows_default("choice", "choice"));
    }

    #[test]
    fn test_undeclared_ports_reject() {
        let table = dialogue_choice_table();
        assert!(!table.allows("dialogue", 1, "choice", 0));
        assert!(!table.allows("dialogue", 0, "choice", 1));
        assert!(!table.allows_default("unknown", "dialogue"));
    }

    #[test]
    fn test_any_targets() {
        let mut table = CompatibilityTable::new();
        assert!(table.is_empty());
        table.declare_output("hub", 0, PortTargets::Any);
        table.declare_input("leaf", 0, PortTargets::Any);
        assert!(table.allows_default("hub", "leaf"));
        assert!(!table.allows_default("leaf", "hub"));
    }
}
