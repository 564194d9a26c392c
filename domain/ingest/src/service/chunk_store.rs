use async_trait::async_trait;

use crate::model::vo::BlobHandle;

/// # Chunk store
///
/// Durable, content-addressable storage for uploaded chunks and assembled
/// artifacts. A handle is returned only once the content is durably
/// persisted. Identical content may be deduplicated behind the handle, but
/// every caller holds and releases its own handle independently.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    async fn put(&self, content: &[u8]) -> anyhow::Result<BlobHandle>;

    async fn get(&self, handle: &BlobHandle) -> anyhow::Result<Vec<u8>>;

    async fn delete(&self, handle: &BlobHandle) -> anyhow::Result<()>;
}
