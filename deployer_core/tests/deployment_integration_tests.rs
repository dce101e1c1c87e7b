use deployer_core::config::PluginRootConfig;
use deployer_core::deployment::{
    scan_plugin_root, TranslationConfig, MANIFEST_FILE, TRANSLATION_CONFIG_FILE,
};
use deployer_core::{DeployableEntry, DeployerConfig, DeploymentManager, PluginId, PluginType};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_plugin(dir: &Path, manifest: &str) {
    fs::create_dir_all(dir.join("dist")).unwrap();
    fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
    fs::write(dir.join("dist/backend.js"), "module.exports = {}").unwrap();
}

fn config_for(root: &Path) -> DeployerConfig {
    DeployerConfig {
        plugins: vec![
            PluginRootConfig {
                path: root.join("builtin"),
                plugin_type: PluginType::System,
            },
            PluginRootConfig {
                path: root.join("installed"),
                plugin_type: PluginType::User,
            },
        ],
        localization: deployer_core::config::LocalizationConfig {
            output_dir: root.join("l10n"),
        },
        ..DeployerConfig::default()
    }
}

async fn scan_all(config: &DeployerConfig) -> Vec<DeployableEntry> {
    let mut entries = Vec::new();
    for root in &config.plugins {
        entries.extend(scan_plugin_root(&root.path, root.plugin_type).await.unwrap());
    }
    entries
}

#[tokio::test]
async fn test_deploy_and_undeploy_from_disk() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();

    write_plugin(
        &root.join("builtin/editor"),
        r#"
id = "core.editor"
name = "Editor"
version = "1.0.0"

[entry_points]
frontend = "dist/frontend.js"
backend = "dist/backend.js"

[dependencies]
"core.base" = "^1.0.0"
"#,
    );
    write_plugin(
        &root.join("installed/git"),
        r#"
id = "acme.git"
name = "Git"
version = "0.3.0"

[entry_points]
backend = "dist/backend.js"

[dependencies]
"core.editor" = "^1.0.0"

[contributes]
commands = ["git.commit"]

[contributes.localizations.de]
"git.commit" = "Festschreiben"
"#,
    );
    // Broken package must not stop the others
    fs::create_dir_all(root.join("installed/broken")).unwrap();
    fs::write(root.join("installed/broken").join(MANIFEST_FILE), "id = [").unwrap();
    // Directory without a manifest
    fs::create_dir_all(root.join("installed/empty")).unwrap();

    let config = config_for(root);
    let manager = DeploymentManager::from_config(&config);
    let entries = scan_all(&config).await;
    assert_eq!(entries.len(), 4);

    let editor = &entries[0];
    let dependencies = manager.get_plugin_dependencies(editor).await.unwrap();
    assert_eq!(dependencies.metadata.id.as_str(), "core.editor");
    assert!(dependencies.dependencies.is_none());

    let git = DeployableEntry::new(root.join("installed/git"), PluginType::User);
    let dependencies = manager.get_plugin_dependencies(&git).await.unwrap();
    assert_eq!(
        dependencies.dependencies.unwrap()["core.editor"],
        "^1.0.0"
    );

    manager.deploy_backend_plugins(&entries).await;
    manager.deploy_frontend_plugins(&entries[..1]).await;

    let backend_ids = manager.get_deployed_backend_plugin_ids().await;
    assert_eq!(
        backend_ids,
        vec![PluginId::new("core.editor"), PluginId::new("acme.git")]
    );
    assert_eq!(
        manager.get_deployed_frontend_plugin_ids().await,
        vec![PluginId::new("core.editor")]
    );

    let git_plugin = manager.get_deployed_plugin(&PluginId::new("acme.git")).unwrap();
    assert_eq!(git_plugin.localizations.len(), 1);
    assert_eq!(
        git_plugin.contributions.as_ref().unwrap().commands,
        vec!["git.commit".to_string()]
    );

    let written = fs::read_to_string(root.join("l10n").join(TRANSLATION_CONFIG_FILE)).unwrap();
    let translations: TranslationConfig = serde_json::from_str(&written).unwrap();
    assert_eq!(translations["de"]["acme.git"]["git.commit"], "Festschreiben");

    assert!(manager.undeploy_plugin(&PluginId::new("acme.git")).await);
    assert!(!root.join("installed/git").exists());
    assert!(root.join("builtin/editor").exists());
    assert!(manager
        .get_deployed_plugin(&PluginId::new("acme.git"))
        .is_none());
    assert!(!manager.undeploy_plugin(&PluginId::new("acme.git")).await);
}

#[tokio::test]
async fn test_undeploy_removes_every_deployed_copy() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();

    let manifest = r#"
id = "acme.lint"
name = "Lint"
version = "2.0.0"
"#;
    write_plugin(&root.join("installed/lint"), manifest);
    write_plugin(&root.join("workspace/lint"), manifest);

    let manager = DeploymentManager::from_config(&config_for(root));
    manager
        .deploy_backend_plugins(&[
            DeployableEntry::new(root.join("installed/lint"), PluginType::User),
            DeployableEntry::new(root.join("workspace/lint"), PluginType::User),
        ])
        .await;

    let id = PluginId::new("acme.lint");
    assert_eq!(manager.deployed_locations(&id).len(), 2);
    assert!(manager.undeploy_plugin(&id).await);
    assert!(!root.join("installed/lint").exists());
    assert!(!root.join("workspace/lint").exists());
}
