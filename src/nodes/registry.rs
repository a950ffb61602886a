use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::NodeTypeConfig;
use crate::error::RegistryError;
use crate::serialization::{NodeSerializer, NullNodeSerializer};

use super::compatibility::CompatibilityTable;
use super::kind::{GraphNode, NodeKind};
use super::plugin::{CatalogContext, NodePlugin, TypeCatalog};

/// Registry handle shared between one configuration-reload writer and many readers.
pub type SharedNodeTypeRegistry = Arc<RwLock<NodeTypeRegistry>>;

/// 节点类型注册表 - 管理节点构造器和序列化器
///
/// Discovery ([`rescan`](Self::rescan)) asks the installed plugins for their kinds
/// and serializers; registration ([`reconcile`](Self::reconcile)) activates the
/// configured subset. A name can be active with a serializer but no constructor
/// (kept only for round-tripping existing data) and vice versa.
pub struct NodeTypeRegistry {
    plugins: Vec<Arc<dyn NodePlugin>>,
    catalog: Option<TypeCatalog>,
    kinds: BTreeMap<String, NodeKind>,
    serializers: BTreeMap<String, Arc<dyn NodeSerializer>>,
}

impl NodeTypeRegistry {
    /// 创建空注册表（没有安装任何插件）
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            catalog: None,
            kinds: BTreeMap::new(),
            serializers: BTreeMap::new(),
        }
    }

    pub fn with_plugins(plugins: Vec<Arc<dyn NodePlugin>>) -> Self {
        let mut registry = Self::new();
        registry.plugins = plugins;
        registry
    }

    /// Registry with the bundled sample node plugin installed.
    #[cfg(feature = "builtin-sample-nodes")]
    pub fn with_builtin_plugins() -> Self {
        Self::with_plugins(vec![Arc::new(super::samples::SamplesPlugin::new())])
    }

    pub fn into_shared(self) -> SharedNodeTypeRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Add a plugin to the environment. Takes effect on the next forced rescan.
    pub fn install(&mut self, plugin: Arc<dyn NodePlugin>) -> Result<(), RegistryError> {
        if self.plugins.iter().any(|p| p.id() == plugin.id()) {
            return Err(RegistryError::Conflict(format!(
                "plugin '{}' already installed",
                plugin.id()
            )));
        }
        self.plugins.push(plugin);
        Ok(())
    }

    /// Remove a plugin from the environment. Takes effect on the next forced rescan.
    pub fn uninstall(&mut self, plugin_id: &str) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.id() != plugin_id);
        self.plugins.len() != before
    }

    pub fn is_scanned(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn catalog(&self) -> Option<&TypeCatalog> {
        self.catalog.as_ref()
    }

    /// Rebuild the type catalog from the installed plugins.
    ///
    /// Does nothing when a catalog exists and `force_refresh` is false. A failing
    /// plugin aborts the scan and leaves the previous catalog in place.
    pub fn rescan(&mut self, force_refresh: bool) -> Result<(), RegistryError> {
        if self.catalog.is_some() && !force_refresh {
            tracing::trace!("node type catalog already scanned");
            return Ok(());
        }

        let mut catalog = TypeCatalog::default();
        for plugin in &self.plugins {
            let mut context = CatalogContext::new(&mut catalog, plugin.id());
            plugin.register(&mut context).map_err(|e| match e {
                RegistryError::Plugin { .. } => e,
                other => RegistryError::Plugin {
                    plugin_id: plugin.id().to_string(),
                    message: other.to_string(),
                },
            })?;
        }

        tracing::debug!(
            plugins = self.plugins.len(),
            kinds = catalog.kinds.len(),
            serializers = catalog.serializers.len(),
            "node type catalog scanned"
        );
        self.catalog = Some(catalog);
        Ok(())
    }

    /// Bring active constructors and serializers in line with the configured names.
    ///
    /// 1. every configured name gets a serializer, a placeholder when the catalog has none;
    /// 2. entries no longer configured, or whose kind left the catalog, are dropped;
    /// 3. configured names without a constructor resolve one from the catalog if possible.
    ///
    /// An empty configuration leaves the registry untouched.
    pub fn reconcile(&mut self, configured: &[NodeTypeConfig]) -> Result<(), RegistryError> {
        if configured.is_empty() {
            tracing::debug!("no node types configured; registration unchanged");
            return Ok(());
        }

        self.rescan(false)?;
        let Some(catalog) = self.catalog.as_ref() else {
            return Ok(());
        };

        let is_configured = |name: &str| configured.iter().any(|c| c.name == name);

        // 1. 为没有实现序列化器的节点添加占位序列化器
        for config in configured {
            match catalog.serializer(&config.name) {
                Some(real) => {
                    self.serializers.insert(config.name.clone(), Arc::clone(real));
                }
                None => {
                    let keep_placeholder = self
                        .serializers
                        .get(&config.name)
                        .map(|s| s.is_placeholder())
                        .unwrap_or(false);
                    if !keep_placeholder {
                        tracing::debug!(node_type = %config.name, "no serializer found; using placeholder");
                        self.serializers.insert(
                            config.name.clone(),
                            Arc::new(NullNodeSerializer::new(&config.name)),
                        );
                    }
                }
            }
        }

        // 2. 移除不再配置或已找不到的类型
        self.serializers.retain(|name, _| is_configured(name));
        self.kinds.retain(|name, kind| {
            let still_backed = catalog
                .kind(name)
                .map(|k| Arc::ptr_eq(&k.constructor(), &kind.constructor()))
                .unwrap_or(false);
            if !is_configured(name) || !still_backed {
                tracing::debug!(node_type = %name, "constructor removed");
                return false;
            }
            true
        });

        // 3. 为缺少构造器的类型解析构造器
        for config in configured {
            if self.kinds.contains_key(&config.name) {
                continue;
            }
            match catalog.kind(&config.name) {
                Some(kind) => {
                    self.kinds.insert(config.name.clone(), kind.clone());
                }
                None => {
                    tracing::debug!(node_type = %config.name, "no node kind found; type is not constructible");
                }
            }
        }

        tracing::info!(
            constructors = self.kinds.len(),
            serializers = self.serializers.len(),
            "node registration updated"
        );
        Ok(())
    }

    /// Rescan (forced when the environment's types changed) and reconcile in one step.
    pub fn update_registration(
        &mut self,
        configured: &[NodeTypeConfig],
        types_changed: bool,
    ) -> Result<(), RegistryError> {
        if configured.is_empty() {
            return Ok(());
        }
        self.rescan(types_changed)?;
        self.reconcile(configured)
    }

    /// 根据节点名称创建节点
    pub fn create(&self, name: &str) -> Option<Box<dyn GraphNode>> {
        self.kinds.get(name).map(NodeKind::create)
    }

    /// Drop all registry state. Installed plugins stay; the next scan starts fresh.
    pub fn clear(&mut self) {
        self.catalog = None;
        self.kinds.clear();
        self.serializers.clear();
    }

    /// Names with an active constructor, sorted.
    pub fn node_names(&self) -> Vec<String> {
        self.kinds.keys().cloned().collect()
    }

    pub fn kind(&self, name: &str) -> Option<&NodeKind> {
        self.kinds.get(name)
    }

    pub fn serializer(&self, name: &str) -> Option<Arc<dyn NodeSerializer>> {
        self.serializers.get(name).cloned()
    }

    /// Snapshot of the active serializers.
    pub fn serializers(&self) -> HashMap<String, Arc<dyn NodeSerializer>> {
        self.serializers
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect()
    }

    /// Port compatibility declared by the active kinds.
    pub fn compatibility(&self) -> CompatibilityTable {
        CompatibilityTable::from_kinds(self.kinds.values())
    }
}

impl Default for NodeTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
