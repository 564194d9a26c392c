use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::OpenUploadCommand;
use crate::exception::{UploadException, UploadResult};
use crate::model::entity::{AssembledArtifact, ChunkRecord};
use crate::model::vo::HashAlgorithm;

/// One logical upload, from open to terminal state.
///
/// The session owns its chunk map; all mutation goes through the registry,
/// which serializes access per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    pub id: Uuid,
    /// Declared size of the final artifact in bytes.
    pub declared_size: u64,
    /// Declared number of chunks, indices `0..declared_chunk_count`.
    pub declared_chunk_count: u64,
    /// Declared whole-file checksum, uppercase hex.
    pub declared_hash: String,
    pub hash_algorithm: HashAlgorithm,
    pub state: SessionState,
    /// Verified chunk records keyed by index. First verified record wins.
    pub chunks: BTreeMap<u64, ChunkRecord>,
    pub artifact: Option<AssembledArtifact>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Open,
    Assembling,
    Completed,
    Failed,
    Expired,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Expired)
    }
}

impl UploadSession {
    pub fn open(cmd: OpenUploadCommand, hash_algorithm: HashAlgorithm) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            declared_size: cmd.declared_size,
            declared_chunk_count: cmd.chunk_count,
            declared_hash: cmd.checksum.to_uppercase(),
            hash_algorithm,
            state: SessionState::Open,
            chunks: BTreeMap::new(),
            artifact: None,
            failure_reason: None,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_complete(&self) -> bool {
        self.chunks.len() as u64 == self.declared_chunk_count
    }

    /// Indices in `0..declared_chunk_count` without a verified record yet.
    pub fn missing_indices(&self) -> Vec<u64> {
        (0..self.declared_chunk_count).filter(|nth| !self.chunks.contains_key(nth)).collect()
    }

    /// Guarded state transition.
    ///
    /// Allowed edges: `Open -> Assembling`, `Assembling -> Completed`,
    /// `Open | Assembling -> Failed`, `Open -> Expired`. Everything else is
    /// an `InvalidTransition`, in particular any edge out of a terminal
    /// state.
    pub fn try_transition(&mut self, to: SessionState) -> UploadResult<()> {
        use SessionState::*;
        let allowed = matches!(
            (self.state, to),
            (Open, Assembling) | (Assembling, Completed) | (Open, Failed) | (Assembling, Failed) | (Open, Expired)
        );
        if !allowed {
            return Err(UploadException::InvalidTransition {
                session_id: self.id,
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
