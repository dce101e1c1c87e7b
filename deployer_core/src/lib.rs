pub mod config;
pub mod deployment;
pub mod pile;

pub use config::DeployerConfig;
pub use deployment::{
    DeployError, DeployableEntry, DeployedPlugin, DeploymentManager, PluginId, PluginType,
    Surface,
};
pub use pile::Pile;
