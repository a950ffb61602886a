//! Explicit node plugin registration.
//!
//! Node kinds and serializers enter the registry through [`NodePlugin`]s installed
//! at startup. A rescan asks every installed plugin to register into a fresh
//! [`TypeCatalog`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::serialization::NodeSerializer;

use super::kind::NodeKind;

/// A bundle of node kinds and/or serializers.
pub trait NodePlugin: Send + Sync {
    fn id(&self) -> &str;

    fn register(&self, context: &mut CatalogContext<'_>) -> Result<(), RegistryError>;
}

/// Everything the installed plugins declared during one scan.
#[derive(Default)]
pub struct TypeCatalog {
    pub(crate) kinds: BTreeMap<String, NodeKind>,
    pub(crate) serializers: BTreeMap<String, Arc<dyn NodeSerializer>>,
}

impl TypeCatalog {
    pub fn kind(&self, name: &str) -> Option<&NodeKind> {
        self.kinds.get(name)
    }

    pub fn serializer(&self, name: &str) -> Option<&Arc<dyn NodeSerializer>> {
        self.serializers.get(name)
    }

    pub fn kind_names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    pub fn serializer_names(&self) -> impl Iterator<Item = &str> {
        self.serializers.keys().map(String::as_str)
    }
}

/// Mutable context passed to [`NodePlugin::register`].
pub struct CatalogContext<'a> {
    catalog: &'a mut TypeCatalog,
    plugin_id: String,
}

impl<'a> CatalogContext<'a> {
    pub(crate) fn new(catalog: &'a mut TypeCatalog, plugin_id: &str) -> Self {
        Self {
            catalog,
            plugin_id: plugin_id.to_string(),
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    pub fn register_kind(&mut self, kind: NodeKind) -> Result<(), RegistryError> {
        let name = kind.name().to_string();
        if !is_valid_type_name(&name) {
            return Err(RegistryError::InvalidKind(format!(
                "'{}' (plugin {})",
                name, self.plugin_id
            )));
        }
        if self.catalog.kinds.contains_key(&name) {
            return Err(RegistryError::Conflict(format!(
                "node kind '{}' already registered",
                name
            )));
        }
        tracing::trace!(plugin_id = %self.plugin_id, node_type = %name, "node kind registered");
        self.catalog.kinds.insert(name, kind);
        Ok(())
    }

    /// Placeholder serializers are ignored; the registry creates its own.
    pub fn register_serializer(
        &mut self,
        serializer: Arc<dyn NodeSerializer>,
    ) -> Result<(), RegistryError> {
        let name = serializer.node_type().to_string();
        if serializer.is_placeholder() {
            tracing::debug!(plugin_id = %self.plugin_id, node_type = %name, "ignoring placeholder serializer");
            return Ok(());
        }
        if !is_valid_type_name(&name) {
            return Err(RegistryError::InvalidKind(format!(
                "serializer for '{}' (plugin {})",
                name, self.plugin_id
            )));
        }
        if self.catalog.serializers.contains_key(&name) {
            return Err(RegistryError::Conflict(format!(
                "serializer for '{}' already registered",
                name
            )));
        }
        tracing::trace!(plugin_id = %self.plugin_id, node_type = %name, "serializer registered");
        self.catalog.serializers.insert(name, serializer);
        Ok(())
    }
}

/// Type names are framed into fragment headers, so they cannot be empty or
/// contain whitespace.
pub(crate) fn is_valid_type_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}
