//! Prometheus Metrics Definitions
//!
//! This module defines the metrics exposed by the exporter and the registry
//! that renders them.
//!
//! # Metric Family
//!
//! The collector advertises a single `directpv_stats` descriptor and emits two
//! gauges per published volume:
//!
//! - `directpv_stats_bytes_used` - bytes used by the volume (from its quota)
//! - `directpv_stats_bytes_total` - bytes allocated to the volume
//!
//! Both carry the labels `tenant`, `volumeID` and `node`. `tenant` is an
//! empty string for volumes without a tenant label.
//!
//! Samples are rebuilt on every scrape; nothing is cached between scrapes.

use crate::consts::{APP_NAME, APP_PRETTY_NAME};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;

const STATS_SUBSYSTEM: &str = "stats";

/// Label names attached to every volume sample
pub const VOLUME_LABELS: [&str; 3] = ["tenant", "volumeID", "node"];

/// Usage of one published volume; expands into exactly two samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeStats {
    pub tenant: String,
    pub volume_id: String,
    pub node: String,
    pub bytes_used: u64,
    pub bytes_total: u64,
}

impl VolumeStats {
    fn label_values(&self) -> [&str; 3] {
        [
            self.tenant.as_str(),
            self.volume_id.as_str(),
            self.node.as_str(),
        ]
    }
}

/// Descriptor advertised for the whole stats family
pub fn stats_desc() -> prometheus::Result<Desc> {
    Desc::new(
        format!("{}_{}", APP_NAME, STATS_SUBSYSTEM),
        format!("Statistics exposed by {}", APP_PRETTY_NAME),
        vec![],
        HashMap::new(),
    )
}

fn stats_gauge(name: &str, help: &str) -> prometheus::Result<GaugeVec> {
    GaugeVec::new(
        Opts::new(name, help)
            .namespace(APP_NAME)
            .subsystem(STATS_SUBSYSTEM),
        &VOLUME_LABELS,
    )
}

/// Encode one cycle's volume stats as gauge families
///
/// No families are returned for an empty cycle, since the text encoder
/// rejects families without samples.
pub fn encode_volume_stats(stats: &[VolumeStats]) -> prometheus::Result<Vec<MetricFamily>> {
    if stats.is_empty() {
        return Ok(Vec::new());
    }

    let bytes_used = stats_gauge("bytes_used", "Total number of bytes used by the volume")?;
    let bytes_total = stats_gauge(
        "bytes_total",
        "Total number of bytes allocated to the volume",
    )?;

    for volume in stats {
        let labels = volume.label_values();
        bytes_used
            .with_label_values(&labels)
            .set(volume.bytes_used as f64);
        bytes_total
            .with_label_values(&labels)
            .set(volume.bytes_total as f64);
    }

    let mut families = bytes_used.collect();
    families.extend(bytes_total.collect());
    Ok(families)
}

/// Registry holding the exporter's collectors
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Arc<Registry>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    /// Register a collector; its descriptors must not clash with existing ones
    pub fn register<C>(&self, collector: C) -> prometheus::Result<()>
    where
        C: Collector + 'static,
    {
        self.registry.register(Box::new(collector))
    }

    /// Render metrics in Prometheus text format
    ///
    /// Gathering runs every registered collector, so call this from a
    /// blocking context.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
