use uuid::Uuid;

/// One submitted chunk, as handed over by the transport layer.
pub struct IncomingChunk {
    pub session_id: Uuid,
    /// 0-based index within the session.
    pub index: u64,
    pub content: Vec<u8>,
    /// Declared per-chunk checksum, hex (case-insensitive).
    pub checksum: String,
}
