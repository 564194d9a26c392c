use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::command::OpenUploadCommand;
use crate::exception::UploadResult;
use crate::model::entity::{AssembledArtifact, ChunkRecord, SessionState, UploadSession};
use crate::model::vo::{ArtifactOutcome, AssemblyClaim, HashAlgorithm, RecordOutcome};

/// # Session registry
///
/// Tracks in-flight and completed upload sessions and their chunk maps.
/// Every session is guarded by its own lock; registry-wide operations
/// (open, sweep, restore) never block active sessions. Each call refreshes
/// the session's last-activity timestamp.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    async fn open(
        &self,
        cmd: OpenUploadCommand,
        hash_algorithm: HashAlgorithm,
    ) -> UploadResult<Uuid>;

    /// Current snapshot of the session, chunk map included.
    async fn get(&self, id: Uuid) -> UploadResult<UploadSession>;

    async fn status(&self, id: Uuid) -> UploadResult<SessionState>;

    /// Record a verified chunk. First verified record per index wins;
    /// errors with `SessionTerminal` when the session is no longer `Open`.
    async fn record_chunk(&self, id: Uuid, record: ChunkRecord) -> UploadResult<RecordOutcome>;

    /// Atomic completeness check plus `Open -> Assembling` transition.
    /// At most one caller ever observes `Claimed`.
    async fn begin_assembly(&self, id: Uuid) -> UploadResult<AssemblyClaim>;

    /// `Assembling -> Completed`, persisting the artifact.
    async fn mark_completed(&self, id: Uuid, artifact: AssembledArtifact) -> UploadResult<()>;

    /// Force `Failed` from any non-terminal state. Returns the final
    /// snapshot so the caller can release chunk storage.
    async fn mark_failed(&self, id: Uuid, reason: &str) -> UploadResult<UploadSession>;

    async fn artifact(&self, id: Uuid) -> UploadResult<ArtifactOutcome>;

    /// Move sessions idle past `idle_timeout` to `Expired` and return them.
    /// Runs under the same per-session guards as every other operation, so
    /// it cannot race an in-progress assembly.
    async fn sweep_expired(&self, idle_timeout: Duration) -> UploadResult<Vec<UploadSession>>;

    /// Rebuild in-memory guard state from the metadata store after a
    /// restart.
    async fn restore(&self) -> UploadResult<()>;
}
