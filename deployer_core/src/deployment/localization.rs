use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use super::{
    types::{DeployedPlugin, PluginLocalization},
    Result,
};

/// File name of the aggregated translation config
pub const TRANSLATION_CONFIG_FILE: &str = "translations.json";

/// Extracts localizable strings of deployed plugins and aggregates them
#[async_trait]
pub trait LocalizationService: Send + Sync {
    /// Attach the plugin's localization artifacts to its record
    async fn deploy_localizations(&self, plugin: &mut DeployedPlugin) -> Result<()>;

    /// Rebuild the process-wide translation config from every deployed backend plugin
    async fn build_translation_config(&self, plugins: &[Arc<DeployedPlugin>]) -> Result<()>;
}

/// Language to plugin identity to translation key to string
pub type TranslationConfig = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// Writes the aggregated translations as JSON into an output directory
#[derive(Debug, Clone)]
pub struct FileLocalizationService {
    output_dir: PathBuf,
}

impl FileLocalizationService {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.output_dir.join(TRANSLATION_CONFIG_FILE)
    }
}

/// Merge the localizations of all plugins, keyed by language and then plugin
pub fn merge_translations(plugins: &[Arc<DeployedPlugin>]) -> TranslationConfig {
    let mut config = TranslationConfig::new();
    for plugin in plugins {
        for localization in &plugin.localizations {
            config
                .entry(localization.language.clone())
                .or_default()
                .insert(
                    plugin.id().to_string(),
                    localization.translations.clone(),
                );
        }
    }
    config
}

#[async_trait]
impl LocalizationService for FileLocalizationService {
    async fn deploy_localizations(&self, plugin: &mut DeployedPlugin) -> Result<()> {
        let Some(contributions) = plugin.contributions.as_ref() else {
            return Ok(());
        };

        let localizations: Vec<PluginLocalization> = contributions
            .localizations
            .iter()
            .filter(|(_, translations)| !translations.is_empty())
            .map(|(language, translations)| PluginLocalization {
                language: language.clone(),
                translations: translations.clone(),
            })
            .collect();

        debug!(
            plugin_id = %plugin.id(),
            languages = localizations.len(),
            "Extracted plugin localizations"
        );
        plugin.localizations = localizations;
        Ok(())
    }

    async fn build_translation_config(&self, plugins: &[Arc<DeployedPlugin>]) -> Result<()> {
        let config = merge_translations(plugins);
        let json = serde_json::to_vec_pretty(&config)?;

        fs::create_dir_all(&self.output_dir).await?;
        let path = self.config_path();
        fs::write(&path, json).await?;

        info!(
            languages = config.len(),
            plugins = plugins.len(),
            "Wrote translation config to {:?}",
            path
        );
        Ok(())
    }
}
