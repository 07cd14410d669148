//! Server integration tests
//!
//! Renders the registry the way the `/metrics` handler does: on the blocking
//! pool, with the volume stats collector registered.

mod common;

use common::*;
use directpv_node_exporter::metrics::MetricsRegistry;

fn registry_with(h: Harness) -> MetricsRegistry {
    let metrics = MetricsRegistry::new();
    metrics
        .register(h.collector)
        .expect("Failed to register collector");
    metrics
}

async fn scrape(metrics: &MetricsRegistry) -> String {
    let metrics = metrics.clone();
    tokio::task::spawn_blocking(move || metrics.render())
        .await
        .expect("Render task panicked")
        .expect("Failed to render metrics")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_metrics_endpoint_returns_prometheus_format() {
    // Given: A registry with one publishable volume
    let h = harness(
        FakeLister::with_volumes(vec![with_tenant(mounted("pvc-a", "u1", 100), "acme")]),
        FakeProbe::default()
            .device("u1", "/dev/sdb")
            .quota("/dev/sdb", "pvc-a", 40, 100),
    );
    let metrics = registry_with(h);

    // When: Scraping
    let rendered = scrape(&metrics).await;

    // Then: Output should be valid Prometheus format
    assert!(rendered.contains("# HELP"), "Missing HELP comment");
    assert!(rendered.contains("# TYPE"), "Missing TYPE comment");
    assert!(rendered.contains("directpv_stats_bytes_used{"));
    assert!(rendered.contains("directpv_stats_bytes_total{"));
    assert!(rendered.contains("volumeID=\"pvc-a\""));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_every_scrape_runs_a_fresh_cycle() {
    // Given: A registered collector
    let h = harness(
        FakeLister::with_volumes(vec![mounted("pvc-a", "u1", 100)]),
        FakeProbe::default()
            .device("u1", "/dev/sdb")
            .quota("/dev/sdb", "pvc-a", 40, 100),
    );
    let lister = h.lister.clone();
    let metrics = registry_with(h);

    // When: Scraping twice
    let first = scrape(&metrics).await;
    let second = scrape(&metrics).await;

    // Then: The volumes were listed once per scrape and output is stable
    assert_eq!(lister.requested_nodes.lock().unwrap().len(), 2);
    assert_eq!(first, second, "Metrics rendering is not stable");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_control_plane_renders_empty_scrape() {
    // Given: A lister that cannot reach the control plane
    let h = harness(
        FakeLister {
            unreachable: true,
            ..Default::default()
        },
        FakeProbe::default(),
    );
    let metrics = registry_with(h);

    // When: Scraping
    let rendered = scrape(&metrics).await;

    // Then: The scrape succeeds with no samples
    assert!(rendered.is_empty());
}

#[test]
fn test_collector_cannot_be_registered_twice() {
    // Given: A registry holding a stats collector
    let metrics = registry_with(harness(FakeLister::default(), FakeProbe::default()));

    // When: Registering a second collector with the same descriptor
    let second = harness(FakeLister::default(), FakeProbe::default()).collector;
    let result = metrics.register(second);

    // Then: Registration is rejected
    assert!(result.is_err());
}
