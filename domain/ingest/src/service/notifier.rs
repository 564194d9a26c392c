use async_trait::async_trait;

use crate::model::vo::UploadEvent;

/// Delivers completion and failure notifications to the downstream
/// pipeline.
#[async_trait]
pub trait UploadEventNotifier: Send + Sync {
    async fn notify(&self, event: UploadEvent) -> anyhow::Result<()>;
}
