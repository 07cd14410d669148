//! DirectPV Node Exporter
//!
//! A Prometheus exporter reporting the usage of DirectPV volumes on the local
//! node.
//!
//! # Overview
//!
//! On every scrape the exporter lists the `DirectPVVolume` objects bound to
//! this node, resolves the block device behind each mounted volume from its
//! filesystem UUID, reads the volume's XFS project quota and exposes the
//! result as gauges.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   list volumes    ┌──────────────────────┐
//! │ Kubernetes  │ ◄───────────────  │      Exporter        │
//! │ API server  │ ◄───────────────  │                      │      HTTP      ┌────────────┐
//! └─────────────┘   warning events  │  ┌────────────────┐  │ ◄────────────► │ Prometheus │
//!                                   │  │   Collector    │  │   /metrics     └────────────┘
//! ┌─────────────┐   by-uuid links   │  └────────────────┘  │
//! │  udev / XFS │ ◄───────────────  │  ┌────────────────┐  │
//! │   quotas    │   quotactl(2)     │  │  Node probes   │  │
//! └─────────────┘                   │  └────────────────┘  │
//!                                   └──────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`collector`] - Scrape-driven collection cycle
//! - [`k8s`] - Volume listing and event recording
//! - [`probe`] - Device resolution and quota queries
//! - [`metrics`] - Prometheus metric definitions and registry
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use directpv_node_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     config.validate()?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod config;
pub mod consts;
pub mod error;
pub mod k8s;
pub mod metrics;
pub mod probe;
pub mod server;
