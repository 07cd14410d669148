//! HTTP Server
//!
//! This module wires the collaborators together and serves the metrics.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Liveness check, always `OK` while the server runs
//!
//! # Metrics Collection
//!
//! There is no background loop: every `/metrics` request runs one collection
//! cycle. Gathering happens on the blocking pool because the Prometheus
//! collector contract is synchronous and each cycle waits on Kubernetes and
//! quota I/O.

use crate::collector::VolumeStatsCollector;
use crate::config::{Config, ServerConfig};
use crate::k8s::{KubeEventRecorder, VolumeClient};
use crate::metrics::MetricsRegistry;
use crate::probe::{NodeProbe, UdevDeviceResolver, XfsQuotaProber};
use anyhow::Context;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::TEXT_FORMAT;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    metrics: MetricsRegistry,
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let client = kube::Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let lister = Arc::new(VolumeClient::new(
        client.clone(),
        config.kubernetes.list_page_size,
    ));
    let recorder = Arc::new(KubeEventRecorder::new(
        client,
        &config.kubernetes.event_namespace,
        &config.node.id,
    ));
    let probe = Arc::new(NodeProbe::new(
        UdevDeviceResolver::new(&config.device.by_uuid_dir),
        XfsQuotaProber::new(),
    ));

    let collector = VolumeStatsCollector::new(config.node.id.clone(), lister, probe, recorder)?;
    let metrics = MetricsRegistry::new();
    metrics
        .register(collector)
        .context("Failed to register volume stats collector")?;

    serve(&config.server, metrics).await
}

/// Serve `metrics` until the listener fails
pub async fn serve(server: &ServerConfig, metrics: MetricsRegistry) -> anyhow::Result<()> {
    let app = router(metrics);

    let addr = format!("{}:{}", server.addr, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(metrics: MetricsRegistry) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { metrics })
}

async fn root_handler() -> impl IntoResponse {
    r#"<html>
<head><title>DirectPV Node Exporter</title></head>
<body>
<h1>DirectPV Node Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    let metrics = state.metrics.clone();

    match tokio::task::spawn_blocking(move || metrics.render()).await {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Ok(Err(e)) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
        Err(e) => {
            error!("Metrics collection task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Metrics collection failed".to_string(),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
