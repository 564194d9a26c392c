mod blob;
mod chunk;
mod event;
mod hash_algo;
mod limits;
mod outcome;

#[rustfmt::skip]
pub use {
    blob::BlobHandle,
    chunk::IncomingChunk,
    event::UploadEvent,
    hash_algo::*,
    limits::UploadLimits,
    outcome::*,
};
