use serde::{Deserialize, Serialize};

/// Open-upload request as handed over by the transport layer.
///
/// The checksum algorithm is not part of the request; it is a deployment
/// configuration applied uniformly to every session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenUploadCommand {
    /// Declared size of the final artifact in bytes.
    pub declared_size: u64,
    /// Declared number of chunks.
    pub chunk_count: u64,
    /// Declared whole-file checksum, hex (case-insensitive).
    pub checksum: String,
}
