//! Bundled node types: dialogue lines, choices and relays.

use std::sync::Arc;

use crate::error::RegistryError;

use super::choice::{choice_kind, ChoiceSerializer};
use super::dialogue::{dialogue_kind, DialogueSerializer};
use super::plugin::{CatalogContext, NodePlugin};
use super::relay::{relay_kind, RelaySerializer};

pub const SAMPLES_PLUGIN_ID: &str = "textual-graph.samples";

/// Registers the `dialogue`, `choice` and `relay` kinds with their serializers.
#[derive(Debug, Default)]
pub struct SamplesPlugin;

impl SamplesPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl NodePlugin for SamplesPlugin {
    fn id(&self) -> &str {
        SAMPLES_PLUGIN_ID
    }

    fn register(&self, ctx: &mut CatalogContext<'_>) -> Result<(), RegistryError> {
        ctx.register_kind(dialogue_kind())?;
        ctx.register_kind(choice_kind())?;
        ctx.register_kind(relay_kind())?;

        ctx.register_serializer(Arc::new(DialogueSerializer))?;
        ctx.register_serializer(Arc::new(ChoiceSerializer))?;
        ctx.register_serializer(Arc::new(RelaySerializer))?;
        Ok(())
    }
}
