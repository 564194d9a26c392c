use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::vo::BlobHandle;

/// The assembled result of a completed session. Created exactly once,
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledArtifact {
    pub session_id: Uuid,
    pub blob: BlobHandle,
    /// Whole-file checksum, equal to the session's declared checksum.
    pub hash: String,
    pub size: u64,
}
