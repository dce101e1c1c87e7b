use std::path::PathBuf;
use thiserror::Error;

use super::types::PluginId;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid manifest {path:?}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Failed to remove locations of {plugin_id}: {failed:?}, first cause: {cause}")]
    Removal {
        plugin_id: PluginId,
        failed: Vec<PathBuf>,
        cause: Box<DeployError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeployError {
    /// Aggregate per-location removal failures into one error carrying the first cause.
    ///
    /// Returns `None` when there is nothing to report.
    pub fn removal(plugin_id: PluginId, failures: Vec<(PathBuf, DeployError)>) -> Option<Self> {
        let mut failures = failures.into_iter();
        let (first_path, first_cause) = failures.next()?;

        let mut failed = vec![first_path];
        failed.extend(failures.map(|(path, _)| path));

        Some(DeployError::Removal {
            plugin_id,
            failed,
            cause: Box::new(first_cause),
        })
    }
}
