use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{DependencyMap, PluginContributions, PluginMetadata};

/// Default manifest file name inside a plugin package directory
pub const MANIFEST_FILE: &str = "plugin.toml";

/// On-disk package descriptor read by `TomlManifestReader`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique identity of the plugin
    pub id: String,

    /// Human readable name
    pub name: String,

    pub version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Entry point kind to path, relative to the package directory
    #[serde(default)]
    pub entry_points: BTreeMap<String, String>,

    /// Optional dependencies, plugin identity to version constraint
    #[serde(default)]
    pub dependencies: Option<DependencyMap>,

    #[serde(default)]
    pub contributes: PluginContributions,
}

impl PluginManifest {
    /// Create a new plugin manifest
    pub fn new(id: String, name: String, version: String) -> Self {
        Self {
            id,
            name,
            version,
            description: None,
            entry_points: BTreeMap::new(),
            dependencies: None,
            contributes: PluginContributions::default(),
        }
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Plugin id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Plugin name cannot be empty".to_string());
        }
        if self.version.trim().is_empty() {
            return Err("Plugin version cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn metadata(&self) -> PluginMetadata {
        PluginMetadata {
            id: self.id.as_str().into(),
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            entry_points: self.entry_points.clone(),
        }
    }
}
