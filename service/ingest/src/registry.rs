use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use domain_ingest::{
    command::OpenUploadCommand,
    exception::{UploadException, UploadResult},
    model::{
        entity::{AssembledArtifact, ChunkRecord, SessionState, UploadSession},
        vo::{ArtifactOutcome, AssemblyClaim, HashAlgorithm, RecordOutcome},
    },
    repository::SessionRepo,
    service::SessionRegistry,
};
use tokio::sync::Mutex;
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// Registry over a write-through metadata store.
///
/// Each session has its own async mutex in `locks`; every operation on an
/// existing session runs load-mutate-save under that mutex, so the
/// completeness check and the `Open -> Assembling` transition in
/// `begin_assembly` are a single guarded step. The lock map itself is a
/// concurrent map and never serializes operations across sessions.
#[derive(TypedBuilder)]
pub struct SessionRegistryImpl {
    session_repo: Arc<dyn SessionRepo>,
    #[builder(default)]
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl SessionRegistryImpl {
    fn guard(&self, id: Uuid) -> Arc<Mutex<()>> {
        self.locks.entry(id).or_default().clone()
    }

    async fn load(&self, id: Uuid) -> UploadResult<UploadSession> {
        self.session_repo
            .load(id)
            .await?
            .ok_or(UploadException::SessionNotFound { session_id: id })
    }

    async fn save(&self, session: &UploadSession) -> UploadResult<()> {
        Ok(self.session_repo.save(session).await?)
    }
}

#[async_trait]
impl SessionRegistry for SessionRegistryImpl {
    async fn open(
        &self,
        cmd: OpenUploadCommand,
        hash_algorithm: HashAlgorithm,
    ) -> UploadResult<Uuid> {
        let session = UploadSession::open(cmd, hash_algorithm);
        self.save(&session).await?;
        self.locks.entry(session.id).or_default();
        Ok(session.id)
    }

    async fn get(&self, id: Uuid) -> UploadResult<UploadSession> {
        let guard = self.guard(id);
        let _lock = guard.lock().await;
        let mut session = self.load(id).await?;
        session.touch();
        self.save(&session).await?;
        Ok(session)
    }

    async fn status(&self, id: Uuid) -> UploadResult<SessionState> {
        Ok(self.get(id).await?.state)
    }

    async fn record_chunk(&self, id: Uuid, record: ChunkRecord) -> UploadResult<RecordOutcome> {
        let guard = self.guard(id);
        let _lock = guard.lock().await;
        let mut session = self.load(id).await?;
        if session.state.is_terminal() {
            return Err(UploadException::SessionTerminal {
                session_id: id,
                state: session.state,
            });
        }
        session.touch();
        if record.index >= session.declared_chunk_count {
            self.save(&session).await?;
            return Ok(RecordOutcome::OutOfRange);
        }
        // First verified record per index stays authoritative.
        let outcome = if session.chunks.contains_key(&record.index) {
            RecordOutcome::DuplicateIgnored {
                remaining: session.declared_chunk_count - session.chunks.len() as u64,
            }
        } else {
            session.chunks.insert(record.index, record);
            RecordOutcome::Recorded {
                remaining: session.declared_chunk_count - session.chunks.len() as u64,
            }
        };
        self.save(&session).await?;
        Ok(outcome)
    }

    async fn begin_assembly(&self, id: Uuid) -> UploadResult<AssemblyClaim> {
        let guard = self.guard(id);
        let _lock = guard.lock().await;
        let mut session = self.load(id).await?;
        match session.state {
            SessionState::Open if session.is_complete() => {
                session.try_transition(SessionState::Assembling)?;
                session.touch();
                self.save(&session).await?;
                Ok(AssemblyClaim::Claimed)
            }
            SessionState::Open => {
                session.touch();
                self.save(&session).await?;
                Ok(AssemblyClaim::NotReady)
            }
            SessionState::Assembling | SessionState::Completed => Ok(AssemblyClaim::AlreadyClaimed),
            SessionState::Failed | SessionState::Expired => {
                Err(UploadException::SessionTerminal {
                    session_id: id,
                    state: session.state,
                })
            }
        }
    }

    async fn mark_completed(&self, id: Uuid, artifact: AssembledArtifact) -> UploadResult<()> {
        let guard = self.guard(id);
        let _lock = guard.lock().await;
        let mut session = self.load(id).await?;
        session.try_transition(SessionState::Completed)?;
        session.artifact = Some(artifact);
        session.touch();
        self.save(&session).await
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> UploadResult<UploadSession> {
        let guard = self.guard(id);
        let _lock = guard.lock().await;
        let mut session = self.load(id).await?;
        if session.state.is_terminal() {
            return Err(UploadException::SessionTerminal {
                session_id: id,
                state: session.state,
            });
        }
        session.try_transition(SessionState::Failed)?;
        session.failure_reason = Some(reason.to_string());
        session.touch();
        self.save(&session).await?;
        Ok(session)
    }

    async fn artifact(&self, id: Uuid) -> UploadResult<ArtifactOutcome> {
        let guard = self.guard(id);
        let _lock = guard.lock().await;
        let session = self.load(id).await?;
        Ok(match session.state {
            SessionState::Completed => {
                let artifact = session.artifact.ok_or_else(|| {
                    anyhow::anyhow!("completed session: {id} has no artifact record")
                })?;
                ArtifactOutcome::Ready(artifact)
            }
            SessionState::Failed | SessionState::Expired => ArtifactOutcome::Failed {
                reason: session.failure_reason,
            },
            SessionState::Open | SessionState::Assembling => ArtifactOutcome::NotReady,
        })
    }

    async fn sweep_expired(&self, idle_timeout: Duration) -> UploadResult<Vec<UploadSession>> {
        let cutoff = Utc::now() - idle_timeout;
        let mut expired = vec![];
        for id in self.session_repo.list_ids().await? {
            let guard = self.guard(id);
            let _lock = guard.lock().await;
            let Some(mut session) = self.session_repo.load(id).await? else {
                continue;
            };
            // Only idle `Open` sessions expire; a session that reached
            // `Assembling` is past the point of no return.
            if session.state == SessionState::Open && session.last_activity < cutoff {
                session.try_transition(SessionState::Expired)?;
                session.failure_reason = Some("session expired after idle timeout".to_string());
                self.session_repo.save(&session).await?;
                expired.push(session);
            }
        }
        Ok(expired)
    }

    async fn restore(&self) -> UploadResult<()> {
        for id in self.session_repo.list_ids().await? {
            self.locks.entry(id).or_default();
        }
        Ok(())
    }
}
