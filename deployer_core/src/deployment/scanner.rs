use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::{
    types::{DeployableEntry, PluginType},
    Result,
};

/// Turn every child directory of `root` into a deployable entry.
///
/// Entries are sorted by path. A missing root yields no entries.
pub async fn scan_plugin_root<P: AsRef<Path>>(
    root: P,
    plugin_type: PluginType,
) -> Result<Vec<DeployableEntry>> {
    let root = root.as_ref();
    let mut dir = match fs::read_dir(root).await {
        Ok(dir) => dir,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Plugin root {:?} does not exist", root);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut paths = Vec::new();
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        // Follows symlinks; dangling links are skipped
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => paths.push(path),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Skipping dangling link {:?}", path);
            }
            Err(e) => return Err(e.into()),
        }
    }
    paths.sort();

    debug!("Found {} plugin packages in {:?}", paths.len(), root);
    Ok(paths
        .into_iter()
        .map(|path| DeployableEntry::new(path, plugin_type))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_scan_plugin_root() {
        let temp_dir = tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("zeta")).unwrap();
        std::fs::create_dir(temp_dir.path().join("alpha")).unwrap();
        std::fs::write(temp_dir.path().join("README.md"), "not a plugin").unwrap();

        let entries = scan_plugin_root(temp_dir.path(), PluginType::System)
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, temp_dir.path().join("alpha"));
        assert_eq!(entries[1].path, temp_dir.path().join("zeta"));
        assert!(entries.iter().all(|e| e.plugin_type == PluginType::System));
        assert!(entries.iter().all(|e| e.root == e.path));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_follows_symlinked_packages() {
        let temp_dir = tempdir().unwrap();
        let package = temp_dir.path().join("workspace/lint");
        let root = temp_dir.path().join("installed");
        std::fs::create_dir_all(&package).unwrap();
        std::fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&package, root.join("lint")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), root.join("gone")).unwrap();

        let entries = scan_plugin_root(&root, PluginType::User).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, root.join("lint"));
    }

    #[tokio::test]
    async fn test_scan_missing_root() {
        let temp_dir = tempdir().unwrap();
        let entries = scan_plugin_root(temp_dir.path().join("missing"), PluginType::User)
            .await
            .unwrap();
        assert!(entries.is_empty());
    }
}
