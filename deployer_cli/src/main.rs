use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use deployer_core::deployment::{scan_plugin_root, ManifestReader};
use deployer_core::{
    DeployableEntry, DeployerConfig, DeploymentManager, PluginId, PluginType, Surface,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "plugin-deployer", version)]
struct Cli {
    /// Path to Deployer.toml, searched for upwards from the current directory if omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Deploy every plugin found under the configured plugin roots
    Deploy,
    /// Print metadata and dependencies of a plugin package
    Deps {
        path: PathBuf,
        /// Treat the package as a system plugin
        #[arg(long)]
        system: bool,
    },
    /// Deploy the configured plugins, then undeploy one of them
    Undeploy { plugin_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = match load_config(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) if cli.config.is_none() => (DeployerConfig::default(), Some(e)),
        Err(e) => return Err(e),
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if let Some(e) = config_error {
        warn!("Using default configuration: {}", e);
    }

    let manager = DeploymentManager::from_config(&config);

    match cli.command {
        Commands::Deploy => {
            deploy_configured(&manager, &config).await?;
            for surface in [Surface::Frontend, Surface::Backend] {
                let plugins = manager.get_deployed_plugins(surface).await;
                println!("{} plugins ({}):", surface, plugins.len());
                for plugin in plugins {
                    println!(
                        "  {} ({}@{})",
                        plugin.id(),
                        plugin.metadata.name,
                        plugin.metadata.version
                    );
                }
            }
        }
        Commands::Deps { path, system } => {
            let plugin_type = if system {
                PluginType::System
            } else {
                PluginType::User
            };
            let entry = DeployableEntry::new(&path, plugin_type);
            match manager.get_plugin_dependencies(&entry).await {
                Some(dependencies) => {
                    println!("{}", serde_json::to_string_pretty(&dependencies)?)
                }
                None => bail!("No readable plugin manifest at {:?}", path),
            }
        }
        Commands::Undeploy { plugin_id } => {
            deploy_configured(&manager, &config).await?;
            let plugin_id = PluginId::new(plugin_id);
            if !manager.undeploy_plugin(&plugin_id).await {
                bail!("Plugin {} is not deployed", plugin_id);
            }
            println!("Undeployed {}", plugin_id);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<DeployerConfig> {
    let config = match path {
        Some(path) => DeployerConfig::load(path)?,
        None => DeployerConfig::from_project_root()?,
    };
    Ok(config)
}

/// Scan the configured roots and deploy what they contain to both surfaces
async fn deploy_configured<R: ManifestReader>(
    manager: &DeploymentManager<R>,
    config: &DeployerConfig,
) -> Result<()> {
    let mut entries = Vec::new();
    for root in &config.plugins {
        entries.extend(scan_plugin_root(&root.path, root.plugin_type).await?);
    }
    info!("Found {} plugin packages", entries.len());

    let (frontend, backend) = partition_by_surface(manager, &entries).await;
    tokio::join!(
        manager.deploy_frontend_plugins(&frontend),
        manager.deploy_backend_plugins(&backend),
    );
    Ok(())
}

/// Split entries by the entry points their manifests declare.
///
/// Plugins without a frontend entry point run on the backend. Unreadable
/// packages are left out.
async fn partition_by_surface<R: ManifestReader>(
    manager: &DeploymentManager<R>,
    entries: &[DeployableEntry],
) -> (Vec<DeployableEntry>, Vec<DeployableEntry>) {
    let mut frontend = Vec::new();
    let mut backend = Vec::new();

    for entry in entries {
        let Some(dependencies) = manager.get_plugin_dependencies(entry).await else {
            continue;
        };
        let metadata = &dependencies.metadata;
        let has_frontend = metadata.entry_point(Surface::Frontend).is_some();
        if has_frontend {
            frontend.push(entry.clone());
        }
        if metadata.entry_point(Surface::Backend).is_some() || !has_frontend {
            backend.push(entry.clone());
        }
    }

    (frontend, backend)
}
