use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use domain_ingest::{
    command::OpenUploadCommand,
    exception::{UploadException, UploadResult},
    model::{
        entity::ChunkRecord,
        vo::{
            ArtifactOutcome, HashAlgorithm, IncomingChunk, RecordOutcome, SubmitOutcome,
            UploadEvent, UploadLimits,
        },
    },
    service::{AssemblyEngine, ChunkStore, SessionRegistry, UploadCoordinator,
        UploadEventNotifier},
};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::assembly::release_chunks;
use crate::verifier::IntegrityVerifier;

#[derive(TypedBuilder)]
pub struct UploadCoordinatorImpl {
    registry: Arc<dyn SessionRegistry>,
    chunk_store: Arc<dyn ChunkStore>,
    assembly_engine: Arc<dyn AssemblyEngine>,
    notifier: Arc<dyn UploadEventNotifier>,
    #[builder(default)]
    verifier: IntegrityVerifier,
    #[builder(default)]
    hash_algorithm: HashAlgorithm,
    #[builder(default)]
    limits: UploadLimits,
    #[builder(default = Duration::seconds(24 * 60 * 60))]
    idle_timeout: Duration,
}

fn invalid(reason: impl Into<String>) -> UploadException {
    UploadException::InvalidDeclaration {
        reason: reason.into(),
    }
}

impl UploadCoordinatorImpl {
    fn check_declaration(&self, cmd: &OpenUploadCommand) -> UploadResult<()> {
        if cmd.declared_size == 0 {
            return Err(invalid("declared size must be positive"));
        }
        if cmd.chunk_count == 0 {
            return Err(invalid("declared chunk count must be positive"));
        }
        if cmd.chunk_count > cmd.declared_size {
            return Err(invalid(format!(
                "chunk count: {} exceeds declared size: {}",
                cmd.chunk_count, cmd.declared_size
            )));
        }
        if cmd.declared_size > self.limits.max_file_size {
            return Err(invalid(format!(
                "declared size: {} exceeds limit: {}",
                cmd.declared_size, self.limits.max_file_size
            )));
        }
        if cmd.chunk_count > self.limits.max_chunk_count {
            return Err(invalid(format!(
                "chunk count: {} exceeds limit: {}",
                cmd.chunk_count, self.limits.max_chunk_count
            )));
        }
        if cmd.checksum.is_empty() || !cmd.checksum.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("declared checksum must be non-empty hex"));
        }
        Ok(())
    }

    async fn notify_failed(&self, session_id: Uuid, reason: String) {
        if let Err(e) = self.notifier.notify(UploadEvent::Failed { session_id, reason }).await {
            tracing::error!("failed to deliver upload event: {e}");
        }
    }
}

#[async_trait]
impl UploadCoordinator for UploadCoordinatorImpl {
    async fn open_upload(&self, cmd: OpenUploadCommand) -> UploadResult<Uuid> {
        self.check_declaration(&cmd)?;
        let id = self.registry.open(cmd, self.hash_algorithm).await?;
        tracing::debug!(session_id = %id, "upload session opened");
        Ok(id)
    }

    async fn submit_chunk(&self, chunk: IncomingChunk) -> UploadResult<SubmitOutcome> {
        let session_id = chunk.session_id;
        if chunk.content.len() as u64 > self.limits.max_chunk_size {
            return Err(invalid(format!(
                "chunk of {} bytes exceeds limit: {}",
                chunk.content.len(),
                self.limits.max_chunk_size
            )));
        }

        let session = self.registry.get(session_id).await?;
        // Out-of-range beats everything else, whatever state the session
        // is in.
        if chunk.index >= session.declared_chunk_count {
            return Err(UploadException::IndexOutOfRange {
                session_id,
                index: chunk.index,
                chunk_count: session.declared_chunk_count,
            });
        }
        if session.state.is_terminal() {
            return Err(UploadException::SessionTerminal {
                session_id,
                state: session.state,
            });
        }

        // Verify before anything is persisted.
        if !self.verifier.verify_chunk(session.hash_algorithm, &chunk.content, &chunk.checksum) {
            return Err(UploadException::ChunkChecksumMismatch {
                session_id,
                index: chunk.index,
                declared: chunk.checksum.to_uppercase(),
                computed: self.verifier.digest(session.hash_algorithm, &chunk.content),
            });
        }

        let blob =
            self.chunk_store.put(&chunk.content).await.map_err(UploadException::storage)?;
        let record = ChunkRecord::received(
            chunk.index,
            chunk.content.len() as u64,
            &chunk.checksum,
            blob.clone(),
        );

        // The registry re-checks everything under the session lock; the
        // checks above only spare the store a doomed write.
        match self.registry.record_chunk(session_id, record).await {
            Ok(RecordOutcome::Recorded { remaining }) => {
                tracing::debug!(%session_id, index = chunk.index, remaining, "chunk accepted");
                if remaining == 0 {
                    let outcome = self.assembly_engine.try_assemble(session_id).await?;
                    tracing::debug!(%session_id, ?outcome, "assembly driven by final chunk");
                }
                Ok(SubmitOutcome::Accepted { remaining })
            }
            Ok(RecordOutcome::DuplicateIgnored { remaining }) => {
                self.chunk_store.delete(&blob).await.map_err(UploadException::storage)?;
                Ok(SubmitOutcome::DuplicateIgnored { remaining })
            }
            Ok(RecordOutcome::OutOfRange) => {
                self.chunk_store.delete(&blob).await.map_err(UploadException::storage)?;
                Err(UploadException::IndexOutOfRange {
                    session_id,
                    index: chunk.index,
                    chunk_count: session.declared_chunk_count,
                })
            }
            Err(e) => {
                // E.g. an abort won the race; the accepted write is
                // discarded and never exposed.
                self.chunk_store.delete(&blob).await.map_err(UploadException::storage)?;
                Err(e)
            }
        }
    }

    async fn get_artifact(&self, session_id: Uuid) -> UploadResult<ArtifactOutcome> {
        self.registry.artifact(session_id).await
    }

    async fn abort_upload(&self, session_id: Uuid) -> UploadResult<()> {
        let reason = "aborted by caller".to_string();
        let failed = self.registry.mark_failed(session_id, &reason).await?;
        release_chunks(self.chunk_store.as_ref(), &failed).await;
        tracing::debug!(%session_id, "upload aborted");
        self.notify_failed(session_id, reason).await;
        Ok(())
    }

    async fn sweep_expired(&self) -> UploadResult<usize> {
        let expired = self.registry.sweep_expired(self.idle_timeout).await?;
        for session in &expired {
            release_chunks(self.chunk_store.as_ref(), session).await;
            let reason = session
                .failure_reason
                .clone()
                .unwrap_or_else(|| "session expired after idle timeout".to_string());
            self.notify_failed(session.id, reason).await;
        }
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "expired idle upload sessions");
        }
        Ok(expired.len())
    }
}
