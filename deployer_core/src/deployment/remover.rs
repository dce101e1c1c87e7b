use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::Result;

/// Removes deployed plugin locations from disk
#[async_trait]
pub trait FileRemover: Send + Sync {
    /// Remove `path` recursively. A path that does not exist counts as removed.
    async fn remove(&self, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRemover;

#[async_trait]
impl FileRemover for TokioFileRemover {
    async fn remove(&self, path: &Path) -> Result<()> {
        let metadata = match fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        debug!("Removing {:?}", path);
        let result = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
