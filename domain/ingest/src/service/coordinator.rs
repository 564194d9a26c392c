use async_trait::async_trait;
use uuid::Uuid;

use crate::command::OpenUploadCommand;
use crate::exception::UploadResult;
use crate::model::vo::{ArtifactOutcome, IncomingChunk, SubmitOutcome};

/// # Upload coordinator
///
/// Public face of the ingestion engine: opens sessions, accepts chunks,
/// drives verification and assembly, and emits completion events. The
/// surrounding transport layer maps its own protocol onto these operations.
#[async_trait]
pub trait UploadCoordinator: Send + Sync {
    /// Errors with `InvalidDeclaration` when the declared size or chunk
    /// count is zero, inconsistent, or beyond the configured limits.
    async fn open_upload(&self, cmd: OpenUploadCommand) -> UploadResult<Uuid>;

    /// Verify and persist one chunk. The chunk is not persisted when its
    /// checksum doesn't match. Completing the set triggers assembly.
    async fn submit_chunk(&self, chunk: IncomingChunk) -> UploadResult<SubmitOutcome>;

    async fn get_artifact(&self, session_id: Uuid) -> UploadResult<ArtifactOutcome>;

    /// Force the session to `Failed` and release its chunk storage.
    async fn abort_upload(&self, session_id: Uuid) -> UploadResult<()>;

    /// Expire idle sessions and release their chunk storage. Returns how
    /// many sessions were expired.
    async fn sweep_expired(&self) -> UploadResult<usize>;
}
