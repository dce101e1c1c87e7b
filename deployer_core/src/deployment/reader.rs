use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::{
    error::DeployError,
    manifest::{PluginManifest, MANIFEST_FILE},
    types::{DependencyMap, PluginContributions, PluginMetadata},
    Result,
};

/// Reads plugin packages and extracts what the deployment manager needs from them.
///
/// The manifest itself is opaque to the manager; it is only handed back to the reader.
#[async_trait]
pub trait ManifestReader: Send + Sync {
    type Manifest: Send + Sync;

    /// Read the manifest of the package at `path`, `Ok(None)` if there is none
    async fn read_package(&self, path: &Path) -> Result<Option<Self::Manifest>>;

    fn read_metadata(&self, manifest: &Self::Manifest) -> PluginMetadata;

    fn read_dependencies(&self, manifest: &Self::Manifest) -> Option<DependencyMap>;

    async fn read_contributions(&self, manifest: &Self::Manifest) -> Result<PluginContributions>;
}

/// Reads packages laid out as a directory holding a `plugin.toml`
#[derive(Debug, Clone)]
pub struct TomlManifestReader {
    manifest_file: String,
}

impl TomlManifestReader {
    pub fn new() -> Self {
        Self::with_manifest_file(MANIFEST_FILE)
    }

    pub fn with_manifest_file(manifest_file: impl Into<String>) -> Self {
        Self {
            manifest_file: manifest_file.into(),
        }
    }

    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }
}

impl Default for TomlManifestReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ManifestReader for TomlManifestReader {
    type Manifest = PluginManifest;

    async fn read_package(&self, path: &Path) -> Result<Option<PluginManifest>> {
        let manifest_path = path.join(&self.manifest_file);
        debug!("Reading plugin manifest: {:?}", manifest_path);

        let content = match fs::read_to_string(&manifest_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let manifest: PluginManifest = toml::from_str(&content)?;
        manifest
            .validate()
            .map_err(|reason| DeployError::InvalidManifest {
                path: manifest_path,
                reason,
            })?;

        Ok(Some(manifest))
    }

    fn read_metadata(&self, manifest: &PluginManifest) -> PluginMetadata {
        manifest.metadata()
    }

    fn read_dependencies(&self, manifest: &PluginManifest) -> Option<DependencyMap> {
        manifest.dependencies.clone()
    }

    async fn read_contributions(&self, manifest: &PluginManifest) -> Result<PluginContributions> {
        Ok(manifest.contributes.clone())
    }
}
