use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NodeConfig {
    /// Node identity used as the volume label filter
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KubernetesConfig {
    /// Namespace that warning events for cluster-scoped volumes are written to
    #[serde(default = "default_event_namespace")]
    pub event_namespace: String,
    #[serde(default = "default_list_page_size")]
    pub list_page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_by_uuid_dir")]
    pub by_uuid_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            event_namespace: default_event_namespace(),
            list_page_size: default_list_page_size(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            by_uuid_dir: default_by_uuid_dir(),
        }
    }
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10443
}

fn default_event_namespace() -> String {
    "default".to_string()
}

fn default_list_page_size() -> u32 {
    500
}

fn default_by_uuid_dir() -> String {
    "/dev/disk/by-uuid".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("DIRECTPV_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Reject settings the exporter cannot run with
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ExporterError;

        if self.node.id.trim().is_empty() {
            return Err(ExporterError::Config(
                "node id must be set (node.id or --node-id)".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ExporterError::Config(
                "server port must be non-zero".to_string(),
            ));
        }
        if self.kubernetes.list_page_size == 0 {
            return Err(ExporterError::Config(
                "kubernetes list_page_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
