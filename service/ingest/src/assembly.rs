use std::sync::Arc;

use async_trait::async_trait;
use domain_ingest::{
    exception::{UploadException, UploadResult},
    model::{
        entity::{AssembledArtifact, UploadSession},
        vo::{AssembleOutcome, AssemblyClaim, UploadEvent},
    },
    service::{AssemblyEngine, ChunkStore, SessionRegistry, UploadEventNotifier},
};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::verifier::IntegrityVerifier;

/// Exactly-once assembly.
///
/// The `Open -> Assembling` claim in the registry decides the single
/// winner; everything after the claim runs without holding the session
/// lock, since no other caller can reach the chunk map of an `Assembling`
/// session through any mutating operation. The one thing that can still
/// land in between is an abort or expiry failing the session; the
/// completion step detects that and discards the winner's work.
#[derive(TypedBuilder)]
pub struct AssemblyEngineImpl {
    registry: Arc<dyn SessionRegistry>,
    chunk_store: Arc<dyn ChunkStore>,
    notifier: Arc<dyn UploadEventNotifier>,
    #[builder(default)]
    verifier: IntegrityVerifier,
}

/// Release every chunk blob of the session, keeping going on individual
/// failures so one stuck blob doesn't pin the rest.
pub(crate) async fn release_chunks(chunk_store: &dyn ChunkStore, session: &UploadSession) {
    for record in session.chunks.values() {
        if let Err(e) = chunk_store.delete(&record.blob).await {
            tracing::warn!(
                session_id = %session.id,
                index = record.index,
                "failed to release chunk blob: {e}"
            );
        }
    }
}

impl AssemblyEngineImpl {
    /// Stream chunks in index order, hash as they go by, and persist the
    /// merged artifact only after the whole-file checksum matched.
    async fn assemble(&self, session: &UploadSession) -> UploadResult<AssembledArtifact> {
        let mut hasher = self.verifier.hasher(session.hash_algorithm);
        let mut merged = Vec::with_capacity(session.declared_size as usize);
        for record in session.chunks.values() {
            let content =
                self.chunk_store.get(&record.blob).await.map_err(UploadException::storage)?;
            hasher.update(&content);
            merged.extend(content);
        }
        let completed_hash = hasher.finalize();
        if completed_hash != session.declared_hash {
            return Err(UploadException::UnmatchedHash {
                session_id: session.id,
                provided_hash: session.declared_hash.to_owned(),
                completed_hash,
            });
        }
        let blob = self.chunk_store.put(&merged).await.map_err(UploadException::storage)?;
        Ok(AssembledArtifact {
            session_id: session.id,
            blob,
            hash: completed_hash,
            size: merged.len() as u64,
        })
    }

    async fn notify(&self, event: UploadEvent) {
        if let Err(e) = self.notifier.notify(event).await {
            tracing::error!("failed to deliver upload event: {e}");
        }
    }
}

#[async_trait]
impl AssemblyEngine for AssemblyEngineImpl {
    async fn try_assemble(&self, session_id: Uuid) -> UploadResult<AssembleOutcome> {
        match self.registry.begin_assembly(session_id).await? {
            AssemblyClaim::NotReady => return Ok(AssembleOutcome::NotReady),
            AssemblyClaim::AlreadyClaimed => return Ok(AssembleOutcome::AlreadyAssembled),
            AssemblyClaim::Claimed => {}
        }

        let session = self.registry.get(session_id).await?;
        match self.assemble(&session).await {
            Ok(artifact) => match self.registry.mark_completed(session_id, artifact.clone()).await {
                Ok(()) => {
                    release_chunks(self.chunk_store.as_ref(), &session).await;
                    tracing::debug!(%session_id, size = artifact.size, "upload assembled");
                    self.notify(UploadEvent::Completed {
                        session_id,
                        artifact: artifact.clone(),
                    })
                    .await;
                    Ok(AssembleOutcome::Assembled(artifact))
                }
                // An abort or expiry failed the session after the claim.
                // Whoever failed it already released the chunk blobs and
                // announced the failure, so only the freshly persisted
                // artifact has to go.
                Err(
                    UploadException::SessionTerminal { .. }
                    | UploadException::InvalidTransition { .. },
                ) => {
                    if let Err(e) = self.chunk_store.delete(&artifact.blob).await {
                        tracing::warn!(
                            %session_id,
                            "failed to discard superseded artifact blob: {e}"
                        );
                    }
                    tracing::debug!(%session_id, "session went terminal during assembly");
                    Ok(AssembleOutcome::Aborted)
                }
                Err(other) => Err(other),
            },
            Err(e) => {
                let reason = e.to_string();
                let failed = match self.registry.mark_failed(session_id, &reason).await {
                    Ok(failed) => failed,
                    // Same race on the failure path; nothing of ours was
                    // persisted yet and the aborter reclaimed the chunks.
                    Err(UploadException::SessionTerminal { .. }) => {
                        tracing::debug!(%session_id, "session went terminal during assembly");
                        return Ok(AssembleOutcome::Aborted);
                    }
                    Err(other) => return Err(other),
                };
                release_chunks(self.chunk_store.as_ref(), &failed).await;
                tracing::warn!(%session_id, "assembly failed: {reason}");
                self.notify(UploadEvent::Failed { session_id, reason }).await;
                match e {
                    UploadException::UnmatchedHash { .. } => Ok(AssembleOutcome::ChecksumMismatch),
                    other => Err(other),
                }
            }
        }
    }
}
