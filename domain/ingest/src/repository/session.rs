use async_trait::async_trait;
use uuid::Uuid;

use crate::model::entity::UploadSession;

/// Metadata store for sessions and their chunk maps.
///
/// The registry is write-through: every mutation is saved before the call
/// returns, so sessions are re-derivable from this repository alone after a
/// restart. Whether the backing store is durable is a deployment choice.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn save(&self, session: &UploadSession) -> anyhow::Result<()>;

    async fn load(&self, id: Uuid) -> anyhow::Result<Option<UploadSession>>;

    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;

    async fn list_ids(&self) -> anyhow::Result<Vec<Uuid>>;
}
