use uuid::Uuid;

use crate::model::entity::SessionState;

pub type UploadResult<T> = Result<T, UploadException>;

#[derive(Debug, thiserror::Error)]
pub enum UploadException {
    #[error("Invalid upload declaration: {reason}.")]
    InvalidDeclaration { reason: String },

    #[error("Upload session: {session_id} can't be found.")]
    SessionNotFound { session_id: Uuid },

    #[error("Upload session: {session_id} is already terminal in state: {state:?}.")]
    SessionTerminal {
        session_id: Uuid,
        state: SessionState,
    },

    #[error(
        "Chunk index: {index} is out of range for session: {session_id} \
         with declared chunk count: {chunk_count}."
    )]
    IndexOutOfRange {
        session_id: Uuid,
        index: u64,
        chunk_count: u64,
    },

    #[error(
        "Chunk: {index} of session: {session_id}'s computed checksum: {computed} \
         doesn't match the declared checksum: {declared}."
    )]
    ChunkChecksumMismatch {
        session_id: Uuid,
        index: u64,
        declared: String,
        computed: String,
    },

    #[error(
        "Session: {session_id}'s assembled checksum: {completed_hash} is unmatched \
         with declared checksum: {provided_hash}."
    )]
    UnmatchedHash {
        session_id: Uuid,
        provided_hash: String,
        completed_hash: String,
    },

    #[error("Session: {session_id} can't transition from {from:?} to {to:?}.")]
    InvalidTransition {
        session_id: Uuid,
        from: SessionState,
        to: SessionState,
    },

    #[error("Chunk storage failure: {source}")]
    Storage {
        #[source]
        source: anyhow::Error,
    },

    #[error("Upload internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl UploadException {
    pub fn storage(source: impl Into<anyhow::Error>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}

impl From<anyhow::Error> for UploadException {
    fn from(e: anyhow::Error) -> Self {
        UploadException::Internal { source: e }
    }
}
