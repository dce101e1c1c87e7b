mod error;
mod ledger;
mod localization;
mod manager;
mod manifest;
mod readiness;
mod reader;
mod remover;
mod scanner;
mod types;


pub use error::DeployError;
pub use ledger::DeploymentLedger;
pub use localization::{
    merge_translations, FileLocalizationService, LocalizationService, TranslationConfig,
    TRANSLATION_CONFIG_FILE,
};
pub use manager::DeploymentManager;
pub use manifest::{PluginManifest, MANIFEST_FILE};
pub use readiness::Readiness;
pub use reader::{ManifestReader, TomlManifestReader};
pub use remover::{FileRemover, TokioFileRemover};
pub use scanner::scan_plugin_root;
pub use types::{
    DependencyMap, DeployableEntry, DeployedPlugin, PluginContributions, PluginDependencies,
    PluginId, PluginLocalization, PluginMetadata, PluginType, Surface,
};

// Result alias shared by the deployment modules
pub type Result<T> = std::result::Result<T, DeployError>;
