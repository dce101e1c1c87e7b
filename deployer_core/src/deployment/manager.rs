use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::{
    error::DeployError,
    ledger::DeploymentLedger,
    localization::{FileLocalizationService, LocalizationService},
    readiness::Readiness,
    reader::{ManifestReader, TomlManifestReader},
    remover::{FileRemover, TokioFileRemover},
    types::{DeployableEntry, DeployedPlugin, PluginDependencies, PluginId, Surface},
    Result,
};
use crate::config::DeployerConfig;

/// Per-surface coordination: batches on one surface run one at a time,
/// and the first finished batch releases everyone waiting for the surface.
#[derive(Debug, Default)]
struct SurfaceGate {
    batch: Mutex<()>,
    readiness: Readiness,
}

#[derive(Debug)]
enum DeployOutcome {
    Deployed(Arc<DeployedPlugin>),
    AlreadyDeployed(PluginId),
    NoManifest,
}

/// Tracks which plugins are deployed on the frontend and backend hosts
/// and where they were deployed from.
///
/// Public operations never fail: collaborator errors are logged and the
/// affected entry is treated as not deployed.
pub struct DeploymentManager<R: ManifestReader> {
    reader: R,
    localization: Arc<dyn LocalizationService>,
    remover: Arc<dyn FileRemover>,
    ledger: RwLock<DeploymentLedger>,
    frontend: SurfaceGate,
    backend: SurfaceGate,
}

impl DeploymentManager<TomlManifestReader> {
    /// Create a manager that reads `plugin.toml` packages and writes
    /// translations to the configured localization directory
    pub fn from_config(config: &DeployerConfig) -> Self {
        debug!(
            "Creating DeploymentManager with localization output: {:?}",
            config.localization.output_dir
        );
        Self::new(
            TomlManifestReader::with_manifest_file(config.manifest_file.clone()),
            Arc::new(FileLocalizationService::new(&config.localization.output_dir)),
            Arc::new(TokioFileRemover),
        )
    }
}

impl<R: ManifestReader> DeploymentManager<R> {
    pub fn new(
        reader: R,
        localization: Arc<dyn LocalizationService>,
        remover: Arc<dyn FileRemover>,
    ) -> Self {
        Self {
            reader,
            localization,
            remover,
            ledger: RwLock::new(DeploymentLedger::new()),
            frontend: SurfaceGate::default(),
            backend: SurfaceGate::default(),
        }
    }

    fn gate(&self, surface: Surface) -> &SurfaceGate {
        match surface {
            Surface::Frontend => &self.frontend,
            Surface::Backend => &self.backend,
        }
    }

    pub async fn deploy_frontend_plugins(&self, entries: &[DeployableEntry]) {
        self.deploy_plugins(entries, Surface::Frontend).await
    }

    pub async fn deploy_backend_plugins(&self, entries: &[DeployableEntry]) {
        self.deploy_plugins(entries, Surface::Backend).await
    }

    /// Deploy `entries` to `surface` in order, then mark the surface ready
    pub async fn deploy_plugins(&self, entries: &[DeployableEntry], surface: Surface) {
        let gate = self.gate(surface);
        let _batch = gate.batch.lock().await;

        let started = Instant::now();
        let mut deployed = 0;
        for entry in entries {
            if self.deploy_plugin(entry, surface).await {
                deployed += 1;
            }
        }

        if surface == Surface::Backend {
            let plugins = self.ledger.read().plugins(Surface::Backend);
            if let Err(e) = self.localization.build_translation_config(&plugins).await {
                error!(surface = %surface, "Failed to build translation config: {}", e);
            }
        }

        if gate.readiness.resolve() {
            debug!(surface = %surface, "Surface is ready");
        }

        info!(
            surface = %surface,
            "Deployed {} of {} {} plugins in {} ms",
            deployed,
            entries.len(),
            surface,
            started.elapsed().as_millis()
        );
    }

    /// Deploy a single entry; true if a new record was registered
    async fn deploy_plugin(&self, entry: &DeployableEntry, surface: Surface) -> bool {
        match self.try_deploy_plugin(entry, surface).await {
            Ok(DeployOutcome::Deployed(plugin)) => {
                let metadata = &plugin.metadata;
                let entry_point = metadata
                    .entry_point(surface)
                    .map(|target| entry.path.join(target))
                    .unwrap_or_else(|| entry.path.clone());
                info!(
                    surface = %surface,
                    plugin_id = %metadata.id,
                    "Deploying {} plugin \"{}@{}\" from {:?}",
                    surface,
                    metadata.name,
                    metadata.version,
                    entry_point
                );
                true
            }
            Ok(DeployOutcome::AlreadyDeployed(id)) => {
                debug!(
                    surface = %surface,
                    plugin_id = %id,
                    "Plugin already deployed, recorded location {:?}",
                    entry.root
                );
                false
            }
            Ok(DeployOutcome::NoManifest) => {
                warn!(surface = %surface, "No plugin manifest found at {:?}", entry.path);
                false
            }
            Err(e) => {
                error!(
                    surface = %surface,
                    "Failed to deploy {} plugin from {:?}: {}",
                    surface,
                    entry.path,
                    e
                );
                false
            }
        }
    }

    async fn try_deploy_plugin(
        &self,
        entry: &DeployableEntry,
        surface: Surface,
    ) -> Result<DeployOutcome> {
        let Some(manifest) = self.reader.read_package(&entry.path).await? else {
            return Ok(DeployOutcome::NoManifest);
        };
        let metadata = self.reader.read_metadata(&manifest);

        // The location is recorded even for duplicates so undeploy reclaims it
        {
            let mut ledger = self.ledger.write();
            ledger.record_location(&metadata.id, &entry.root);
            if ledger.is_deployed(surface, &metadata.id) {
                return Ok(DeployOutcome::AlreadyDeployed(metadata.id));
            }
        }

        let contributions = self.reader.read_contributions(&manifest).await?;
        let mut plugin = DeployedPlugin::new(metadata, entry.plugin_type);
        plugin.contributions = Some(contributions);
        self.localization.deploy_localizations(&mut plugin).await?;

        let plugin = Arc::new(plugin);
        if !self.ledger.write().insert(surface, Arc::clone(&plugin)) {
            return Ok(DeployOutcome::AlreadyDeployed(plugin.id().clone()));
        }
        Ok(DeployOutcome::Deployed(plugin))
    }

    /// Identities deployed on the frontend, once its first batch has completed
    pub async fn get_deployed_frontend_plugin_ids(&self) -> Vec<PluginId> {
        self.get_deployed_plugin_ids(Surface::Frontend).await
    }

    /// Identities deployed on the backend, once its first batch has completed
    pub async fn get_deployed_backend_plugin_ids(&self) -> Vec<PluginId> {
        self.get_deployed_plugin_ids(Surface::Backend).await
    }

    pub async fn get_deployed_plugin_ids(&self, surface: Surface) -> Vec<PluginId> {
        self.gate(surface).readiness.wait().await;
        self.ledger.read().list_identities(surface)
    }

    pub async fn get_deployed_frontend_plugins(&self) -> Vec<Arc<DeployedPlugin>> {
        self.get_deployed_plugins(Surface::Frontend).await
    }

    pub async fn get_deployed_backend_plugins(&self) -> Vec<Arc<DeployedPlugin>> {
        self.get_deployed_plugins(Surface::Backend).await
    }

    pub async fn get_deployed_plugins(&self, surface: Surface) -> Vec<Arc<DeployedPlugin>> {
        self.gate(surface).readiness.wait().await;
        self.ledger.read().plugins(surface)
    }

    /// Whether the first batch for `surface` has completed
    pub fn is_ready(&self, surface: Surface) -> bool {
        self.gate(surface).readiness.is_resolved()
    }

    /// Look up a deployed plugin, preferring its backend record
    pub fn get_deployed_plugin(&self, id: &PluginId) -> Option<Arc<DeployedPlugin>> {
        self.ledger.read().get(id)
    }

    /// Locations `id` has been deployed from, in path order
    pub fn deployed_locations(&self, id: &PluginId) -> Vec<PathBuf> {
        self.ledger
            .read()
            .recorded_locations(id)
            .map(|locations| locations.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Read metadata and dependencies of `entry` without deploying it.
    ///
    /// System plugins never report dependencies; they are resolved at build time.
    pub async fn get_plugin_dependencies(
        &self,
        entry: &DeployableEntry,
    ) -> Option<PluginDependencies> {
        match self.read_plugin_dependencies(entry).await {
            Ok(Some(dependencies)) => Some(dependencies),
            Ok(None) => {
                warn!("No plugin manifest found at {:?}", entry.path);
                None
            }
            Err(e) => {
                error!("Failed to read dependencies from {:?}: {}", entry.path, e);
                None
            }
        }
    }

    async fn read_plugin_dependencies(
        &self,
        entry: &DeployableEntry,
    ) -> Result<Option<PluginDependencies>> {
        let Some(manifest) = self.reader.read_package(&entry.path).await? else {
            return Ok(None);
        };

        let metadata = self.reader.read_metadata(&manifest);
        let dependencies = if entry.plugin_type.is_system() {
            None
        } else {
            self.reader.read_dependencies(&manifest)
        };

        Ok(Some(PluginDependencies {
            metadata,
            dependencies,
        }))
    }

    /// Remove `id` from both surfaces and delete every location it was deployed from.
    ///
    /// Returns false if the identity was never deployed. Failed removals are
    /// logged but do not make the undeploy fail.
    pub async fn undeploy_plugin(&self, id: &PluginId) -> bool {
        let locations = {
            let mut ledger = self.ledger.write();
            ledger.remove(id);
            ledger.take_locations(id)
        };

        let Some(locations) = locations else {
            debug!(plugin_id = %id, "Nothing to undeploy");
            return false;
        };

        match self.remove_locations(id, &locations).await {
            Ok(()) => info!(
                plugin_id = %id,
                "Undeployed plugin {} from {:?}",
                id,
                locations
            ),
            Err(e) => warn!(plugin_id = %id, "{}", e),
        }
        true
    }

    /// Attempt every location; failures are aggregated into one error
    pub(crate) async fn remove_locations(
        &self,
        id: &PluginId,
        locations: &BTreeSet<PathBuf>,
    ) -> Result<()> {
        let mut failures = Vec::new();
        for location in locations {
            if let Err(e) = self.remover.remove(location).await {
                debug!(plugin_id = %id, "Failed to remove {:?}: {}", location, e);
                failures.push((location.clone(), e));
            }
        }

        match DeployError::removal(id.clone(), failures) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
