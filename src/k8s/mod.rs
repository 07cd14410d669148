//! Control-plane collaborators
//!
//! The collector talks to the cluster through two narrow contracts:
//!
//! - [`VolumeLister`] streams the volumes bound to a node
//! - [`EventRecorder`] attaches warning events to a volume
//!
//! [`VolumeClient`] and [`KubeEventRecorder`] are the kube-rs backed
//! implementations used by the exporter binary.

pub mod client;
pub mod events;
pub mod types;

pub use client::VolumeClient;
pub use events::KubeEventRecorder;
pub use types::{Volume, VolumeStatus};

use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Stream of volumes; each item reports its own delivery failure
pub type VolumeStream = mpsc::Receiver<Result<Volume>>;

#[async_trait]
pub trait VolumeLister: Send + Sync {
    /// List the volumes labelled with `node_id`.
    ///
    /// An `Err` means the request itself failed. Items are delivered in
    /// listing order and the stream ends once every volume has been sent or
    /// `cancel` fires. Zero volumes is an empty stream.
    async fn list_volumes(&self, node_id: &str, cancel: CancellationToken) -> Result<VolumeStream>;
}

pub trait EventRecorder: Send + Sync {
    /// Record a warning event on `volume` without waiting for delivery
    fn record_warning(&self, volume: &Volume, reason: &str, message: String);
}
