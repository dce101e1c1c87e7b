use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Stable identity of a logical plugin, shared by every registry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PluginId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One of the two hosts a plugin can be deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Frontend,
    Backend,
}

impl Surface {
    /// Entry point kind used to look up this surface in plugin metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Frontend => "frontend",
            Surface::Backend => "backend",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Origin category of a deployable package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    /// Bundled with the application; dependencies are resolved at build time
    System,
    /// Installed by the user
    #[default]
    User,
}

impl PluginType {
    pub fn is_system(&self) -> bool {
        matches!(self, PluginType::System)
    }
}

/// A candidate package handed to the manager by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployableEntry {
    /// Where the package is read from
    pub path: PathBuf,
    /// Deployment location, removed again on undeploy
    pub root: PathBuf,
    pub plugin_type: PluginType,
}

impl DeployableEntry {
    /// Create an entry that is read from and deployed at the same location
    pub fn new<P: AsRef<Path>>(path: P, plugin_type: PluginType) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            root: path.clone(),
            path,
            plugin_type,
        }
    }

    pub fn with_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }
}

/// Dependency identity to version constraint
pub type DependencyMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub id: PluginId,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Entry point kind ("frontend", "backend", ...) to execution target
    #[serde(default)]
    pub entry_points: BTreeMap<String, String>,
}

impl PluginMetadata {
    pub fn new(id: impl Into<PluginId>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: None,
            entry_points: BTreeMap::new(),
        }
    }

    pub fn with_entry_point(mut self, surface: Surface, target: impl Into<String>) -> Self {
        self.entry_points
            .insert(surface.as_str().to_string(), target.into());
        self
    }

    pub fn entry_point(&self, surface: Surface) -> Option<&str> {
        self.entry_points.get(surface.as_str()).map(String::as_str)
    }
}

/// What a plugin contributes to its host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginContributions {
    #[serde(default)]
    pub commands: Vec<String>,
    /// Language to translation key to translated string
    #[serde(default)]
    pub localizations: BTreeMap<String, BTreeMap<String, String>>,
}

/// Translations extracted for one language of a deployed plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginLocalization {
    pub language: String,
    pub translations: BTreeMap<String, String>,
}

/// A plugin registered on one surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployedPlugin {
    pub metadata: PluginMetadata,
    pub plugin_type: PluginType,
    pub contributions: Option<PluginContributions>,
    pub localizations: Vec<PluginLocalization>,
    pub deployed_at: DateTime<Utc>,
}

impl DeployedPlugin {
    pub fn new(metadata: PluginMetadata, plugin_type: PluginType) -> Self {
        Self {
            metadata,
            plugin_type,
            contributions: None,
            localizations: Vec::new(),
            deployed_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &PluginId {
        &self.metadata.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDependencies {
    pub metadata: PluginMetadata,
    pub dependencies: Option<DependencyMap>,
}
