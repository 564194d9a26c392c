use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::vo::BlobHandle;

/// A verified chunk of a session, immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// 0-based index within the session.
    pub index: u64,
    /// Byte length of the chunk content.
    pub len: u64,
    /// Verified per-chunk checksum, uppercase hex.
    pub hash: String,
    /// Where the chunk content lives in the chunk store.
    pub blob: BlobHandle,
    pub received_at: DateTime<Utc>,
}

impl ChunkRecord {
    pub fn received(index: u64, len: u64, hash: &str, blob: BlobHandle) -> Self {
        Self {
            index,
            len,
            hash: hash.to_uppercase(),
            blob,
            received_at: Utc::now(),
        }
    }
}
