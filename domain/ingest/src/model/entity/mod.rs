mod artifact;
mod chunk;
mod session;

#[rustfmt::skip]
pub use {
    artifact::AssembledArtifact,
    chunk::ChunkRecord,
    session::{SessionState, UploadSession},
};
