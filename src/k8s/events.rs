//! Kubernetes warning events for volumes
//!
//! Volumes are cluster scoped, so their events are written to a configured
//! namespace with `involvedObject` pointing back at the volume.

use crate::consts::{APP_NAME, GROUP_NAME, VERSION, VOLUME_KIND};
use crate::k8s::{EventRecorder, Volume};
use k8s_openapi::api::core::v1::{Event, EventSource, ObjectReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use k8s_openapi::chrono::Utc;
use kube::api::{Api, PostParams};
use kube::Client;
use tracing::warn;

pub const EVENT_TYPE_WARNING: &str = "Warning";

/// kube-rs backed [`EventRecorder`]
#[derive(Clone)]
pub struct KubeEventRecorder {
    client: Client,
    namespace: String,
    host: String,
}

impl KubeEventRecorder {
    pub fn new(client: Client, namespace: &str, host: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            host: host.to_string(),
        }
    }
}

impl EventRecorder for KubeEventRecorder {
    fn record_warning(&self, volume: &Volume, reason: &str, message: String) {
        let event = warning_event(volume, reason, message, &self.namespace, &self.host);
        let api: Api<Event> = Api::namespaced(self.client.clone(), &self.namespace);
        let volume_name = volume.name.clone();

        tokio::spawn(async move {
            if let Err(e) = api.create(&PostParams::default(), &event).await {
                warn!(volume = %volume_name, error = %e, "Failed to record volume event");
            }
        });
    }
}

/// Build a `Warning` event referencing `volume`
pub fn warning_event(
    volume: &Volume,
    reason: &str,
    message: String,
    namespace: &str,
    host: &str,
) -> Event {
    let now = Time(Utc::now());

    Event {
        metadata: ObjectMeta {
            generate_name: Some(format!("{}.", volume.name)),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        involved_object: ObjectReference {
            api_version: Some(format!("{}/{}", GROUP_NAME, VERSION)),
            kind: Some(VOLUME_KIND.to_string()),
            name: Some(volume.name.clone()),
            uid: volume.uid.clone(),
            ..Default::default()
        },
        reason: Some(reason.to_string()),
        message: Some(message),
        type_: Some(EVENT_TYPE_WARNING.to_string()),
        source: Some(EventSource {
            component: Some(APP_NAME.to_string()),
            host: Some(host.to_string()),
        }),
        first_timestamp: Some(now.clone()),
        last_timestamp: Some(now),
        count: Some(1),
        ..Default::default()
    }
}
