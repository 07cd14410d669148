//! DirectPV Volume Client
//!
//! Lists `DirectPVVolume` objects through the Kubernetes API.
//!
//! # Paging
//!
//! Volumes are fetched in pages of `page_size` objects. The first page is
//! requested before [`VolumeClient::list_volumes`] returns, so an
//! unreachable API server fails the list request as a whole. Remaining pages
//! are fetched by a background task that forwards every object into a
//! bounded channel; a failed page or an undecodable object is delivered as
//! an `Err` item and ends the stream.
//!
//! # Cancellation
//!
//! The background task stops as soon as the caller's token is cancelled or
//! the receiving side of the stream is dropped.

use crate::consts::{GROUP_NAME, NODE_LABEL, VERSION, VOLUME_KIND, VOLUME_PLURAL};
use crate::error::{ExporterError, Result};
use crate::k8s::{Volume, VolumeLister, VolumeStream};
use async_trait::async_trait;
use kube::api::{Api, ListParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind, ObjectList};
use kube::Client;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// kube-rs backed [`VolumeLister`]
#[derive(Clone)]
pub struct VolumeClient {
    client: Client,
    resource: ApiResource,
    page_size: u32,
}

impl VolumeClient {
    pub fn new(client: Client, page_size: u32) -> Self {
        let gvk = GroupVersionKind::gvk(GROUP_NAME, VERSION, VOLUME_KIND);
        Self {
            client,
            resource: ApiResource::from_gvk_with_plural(&gvk, VOLUME_PLURAL),
            page_size: page_size.max(1),
        }
    }

    fn api(&self) -> Api<DynamicObject> {
        Api::all_with(self.client.clone(), &self.resource)
    }
}

/// Label selector matching volumes bound to `node_id`
pub fn node_selector(node_id: &str) -> String {
    format!("{}={}", NODE_LABEL, node_id)
}

#[async_trait]
impl VolumeLister for VolumeClient {
    async fn list_volumes(&self, node_id: &str, cancel: CancellationToken) -> Result<VolumeStream> {
        let api = self.api();
        let params = ListParams::default()
            .labels(&node_selector(node_id))
            .limit(self.page_size);

        let first = tokio::select! {
            _ = cancel.cancelled() => return Err(ExporterError::Cancelled),
            page = api.list(&params) => page?,
        };

        let (tx, rx) = mpsc::channel(self.page_size as usize);
        tokio::spawn(forward_pages(api, params, first, tx, cancel));
        Ok(rx)
    }
}

async fn forward_pages(
    api: Api<DynamicObject>,
    params: ListParams,
    mut page: ObjectList<DynamicObject>,
    tx: mpsc::Sender<Result<Volume>>,
    cancel: CancellationToken,
) {
    loop {
        let next = page.metadata.continue_.take().filter(|token| !token.is_empty());

        for object in page.items {
            let item = Volume::from_dynamic(object);
            let failed = item.is_err();
            tokio::select! {
                _ = cancel.cancelled() => return,
                sent = tx.send(item) => {
                    if sent.is_err() {
                        debug!("Volume stream receiver dropped, stopping listing");
                        return;
                    }
                }
            }
            if failed {
                return;
            }
        }

        let Some(token) = next else {
            return;
        };

        let page_params = params.clone().continue_token(&token);
        page = tokio::select! {
            _ = cancel.cancelled() => return,
            result = api.list(&page_params) => match result {
                Ok(page) => page,
                Err(e) => {
                    let _ = tx
                        .send(Err(ExporterError::VolumeList(format!(
                            "failed to fetch next volume page: {}",
                            e
                        ))))
                        .await;
                    return;
                }
            },
        };
    }
}
