use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Volume list error: {0}")]
    VolumeList(String),

    #[error("Device not found for FSUUID {0}")]
    DeviceNotFound(String),

    #[error("Quota error: {0}")]
    Quota(String),

    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
