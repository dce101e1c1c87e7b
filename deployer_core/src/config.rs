use crate::deployment::{DeployError, PluginType, MANIFEST_FILE};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file searched for by `DeployerConfig::from_project_root`
pub const CONFIG_FILE: &str = "Deployer.toml";

/// A directory whose children are plugin packages
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PluginRootConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub plugin_type: PluginType,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LocalizationConfig {
    #[serde(default = "default_localization_dir")]
    pub output_dir: PathBuf,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            output_dir: default_localization_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeployerConfig {
    /// Default tracing filter, used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    #[serde(default)]
    pub plugins: Vec<PluginRootConfig>,

    #[serde(default)]
    pub localization: LocalizationConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_manifest_file() -> String {
    MANIFEST_FILE.to_string()
}

fn default_localization_dir() -> PathBuf {
    PathBuf::from("plugins/data/l10n")
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            manifest_file: default_manifest_file(),
            plugins: Vec::new(),
            localization: LocalizationConfig::default(),
        }
    }
}

impl DeployerConfig {
    /// Load a config file. Relative paths are resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, DeployError> {
        let config_path = config_path.as_ref();
        let content = fs::read_to_string(config_path).map_err(|e| {
            DeployError::Config(format!("Failed to read config file {:?}: {}", config_path, e))
        })?;

        let mut config: DeployerConfig = toml::from_str(&content).map_err(|e| {
            DeployError::Config(format!("Failed to parse config file {:?}: {}", config_path, e))
        })?;

        if let Some(base) = config_path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_project_root() -> Result<Self, DeployError> {
        // Try to find Deployer.toml in current directory or parent directories
        let mut current_dir = std::env::current_dir().map_err(|e| {
            DeployError::Config(format!("Failed to get current directory: {}", e))
        })?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(config_path);
            }

            if !current_dir.pop() {
                break;
            }
        }

        Err(DeployError::Config(format!("Could not find {}", CONFIG_FILE)))
    }

    fn resolve_paths(&mut self, base: &Path) {
        for root in &mut self.plugins {
            if root.path.is_relative() {
                root.path = base.join(&root.path);
            }
        }
        if self.localization.output_dir.is_relative() {
            self.localization.output_dir = base.join(&self.localization.output_dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);

        let config_content = r#"
log_level = "debug"

[[plugins]]
path = "plugins/builtin"
plugin_type = "system"

[[plugins]]
path = "/opt/plugins"

[localization]
output_dir = "l10n"
"#;
        fs::write(&config_path, config_content).unwrap();

        let config = DeployerConfig::load(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.manifest_file, MANIFEST_FILE);
        assert_eq!(
            config.plugins,
            vec![
                PluginRootConfig {
                    path: temp_dir.path().join("plugins/builtin"),
                    plugin_type: PluginType::System,
                },
                PluginRootConfig {
                    path: PathBuf::from("/opt/plugins"),
                    plugin_type: PluginType::User,
                },
            ]
        );
        assert_eq!(config.localization.output_dir, temp_dir.path().join("l10n"));
    }

    #[test]
    fn test_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "").unwrap();

        let config = DeployerConfig::load(&config_path).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(config.plugins.is_empty());
        assert_eq!(
            config.localization.output_dir,
            temp_dir.path().join("plugins/data/l10n")
        );
    }

    #[test]
    fn test_invalid_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);

        let invalid_content = r#"
[[plugins]]
plugin_type = "system"
"#;
        fs::write(&config_path, invalid_content).unwrap();

        let result = DeployerConfig::load(config_path);
        assert!(matches!(result, Err(DeployError::Config(_))));
    }

    #[test]
    fn test_missing_config() {
        let temp_dir = tempdir().unwrap();
        let result = DeployerConfig::load(temp_dir.path().join(CONFIG_FILE));
        assert!(matches!(result, Err(DeployError::Config(_))));
    }
}
