use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use dashmap::DashMap;
use domain_ingest::{model::vo::BlobHandle, service::ChunkStore};
use tokio::sync::Mutex;
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// Content-addressed blob store over a local directory.
///
/// The key is the BLAKE3 digest of the blob's bytes, so identical chunks
/// across sessions share one file. Handles are reference counted in memory:
/// `put` of existing content bumps the count, `delete` decrements and only
/// removes the file when the last owner lets go. Each key has its own async
/// mutex in `locks`, held across both the count update and the filesystem
/// step, so a deduplicating `put` and a last-owner `delete` of the same
/// content never interleave. Writes go through a temporary file and a
/// rename, so a handle is never returned for a blob that is not fully on
/// disk.
#[derive(TypedBuilder)]
pub struct LocalChunkStoreImpl {
    #[builder(default = "chunk_store".into(), setter(into))]
    base: PathBuf,
    #[builder(default)]
    refcounts: DashMap<String, u64>,
    #[builder(default)]
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LocalChunkStoreImpl {
    fn blob_path(&self, key: &str) -> PathBuf {
        self.base.join(key)
    }

    fn guard(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.entry(key.to_string()).or_default().clone()
    }
}

async fn write_atomic(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    let parent =
        path.parent().ok_or_else(|| anyhow!("blob path: {path:?} doesn't have a parent"))?;
    tokio::fs::create_dir_all(parent).await?;
    let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl ChunkStore for LocalChunkStoreImpl {
    async fn put(&self, content: &[u8]) -> anyhow::Result<BlobHandle> {
        let key = blake3::hash(content).to_hex().to_string();
        let guard = self.guard(&key);
        let _lock = guard.lock().await;
        let path = self.blob_path(&key);
        if !tokio::fs::try_exists(&path).await? {
            write_atomic(&path, content).await?;
        }
        *self.refcounts.entry(key.clone()).or_insert(0) += 1;
        Ok(BlobHandle::from(key))
    }

    async fn get(&self, handle: &BlobHandle) -> anyhow::Result<Vec<u8>> {
        let path = self.blob_path(handle.key());
        tokio::fs::read(&path).await.with_context(|| format!("no blob for handle: {handle}"))
    }

    async fn delete(&self, handle: &BlobHandle) -> anyhow::Result<()> {
        let key = handle.key().to_string();
        let guard = self.guard(&key);
        let _lock = guard.lock().await;
        let last_owner = match self.refcounts.get_mut(&key) {
            Some(mut count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            // Unknown handle, e.g. after a restart cleared the counts.
            None => true,
        };
        if last_owner {
            self.refcounts.remove(&key);
            match tokio::fs::remove_file(self.blob_path(&key)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
