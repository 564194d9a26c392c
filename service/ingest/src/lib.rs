mod assembly;
mod chunk_store;
mod coordinator;
mod registry;
mod verifier;

#[rustfmt::skip]
pub use {
    assembly::AssemblyEngineImpl,
    chunk_store::LocalChunkStoreImpl,
    coordinator::UploadCoordinatorImpl,
    registry::SessionRegistryImpl,
    verifier::IntegrityVerifier,
};
