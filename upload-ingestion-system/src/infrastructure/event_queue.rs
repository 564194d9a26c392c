use anyhow::anyhow;
use async_trait::async_trait;
use domain_ingest::{model::vo::UploadEvent, service::UploadEventNotifier};

/// In-process event queue between the engine and the downstream pipeline.
/// The deployment attaches a consumer to the receiver side.
pub struct InternalEventQueue {
    sender: flume::Sender<UploadEvent>,
    receiver: flume::Receiver<UploadEvent>,
}

impl InternalEventQueue {
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    pub fn get_receiver(&self) -> flume::Receiver<UploadEvent> {
        self.receiver.clone()
    }
}

impl Default for InternalEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UploadEventNotifier for InternalEventQueue {
    async fn notify(&self, event: UploadEvent) -> anyhow::Result<()> {
        self.sender
            .send_async(event)
            .await
            .map_err(|_| anyhow!("upload event queue is closed"))
    }
}
