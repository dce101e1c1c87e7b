use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::types::{DeployedPlugin, PluginId, Surface};
use crate::pile::Pile;

/// Deployment state: one registry per surface plus the locations
/// every identity was deployed from.
#[derive(Debug, Default)]
pub struct DeploymentLedger {
    frontend: Pile<PluginId, Arc<DeployedPlugin>>,
    backend: Pile<PluginId, Arc<DeployedPlugin>>,
    locations: HashMap<PluginId, BTreeSet<PathBuf>>,
}

impl DeploymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self, surface: Surface) -> &Pile<PluginId, Arc<DeployedPlugin>> {
        match surface {
            Surface::Frontend => &self.frontend,
            Surface::Backend => &self.backend,
        }
    }

    fn registry_mut(&mut self, surface: Surface) -> &mut Pile<PluginId, Arc<DeployedPlugin>> {
        match surface {
            Surface::Frontend => &mut self.frontend,
            Surface::Backend => &mut self.backend,
        }
    }

    /// Union `root` into the location set of `id`
    pub fn record_location(&mut self, id: &PluginId, root: &Path) -> bool {
        self.locations
            .entry(id.clone())
            .or_default()
            .insert(root.to_path_buf())
    }

    pub(crate) fn recorded_locations(&self, id: &PluginId) -> Option<&BTreeSet<PathBuf>> {
        self.locations.get(id)
    }

    /// Remove and return the location set of `id`
    pub(crate) fn take_locations(&mut self, id: &PluginId) -> Option<BTreeSet<PathBuf>> {
        self.locations.remove(id)
    }

    pub fn is_deployed(&self, surface: Surface, id: &PluginId) -> bool {
        self.registry(surface).contains(id)
    }

    /// Register `plugin` on `surface`. Returns `false` and leaves the existing
    /// record untouched if the identity is already registered there.
    pub fn insert(&mut self, surface: Surface, plugin: Arc<DeployedPlugin>) -> bool {
        let registry = self.registry_mut(surface);
        if registry.contains(plugin.id()) {
            return false;
        }
        registry.insert(plugin.id().clone(), plugin);
        true
    }

    /// Remove `id` from both surfaces; true if any record existed
    pub fn remove(&mut self, id: &PluginId) -> bool {
        let frontend = self.frontend.remove(id).is_some();
        let backend = self.backend.remove(id).is_some();
        frontend || backend
    }

    /// Look up a record, backend first since it is the primary execution surface
    pub fn get(&self, id: &PluginId) -> Option<Arc<DeployedPlugin>> {
        self.backend
            .get(id)
            .or_else(|| self.frontend.get(id))
            .cloned()
    }

    /// Identities registered on `surface`, in deployment order
    pub fn list_identities(&self, surface: Surface) -> Vec<PluginId> {
        self.registry(surface).list_keys()
    }

    /// Records registered on `surface`, in deployment order
    pub fn plugins(&self, surface: Surface) -> Vec<Arc<DeployedPlugin>> {
        self.registry(surface).get_ordered()
    }
}
