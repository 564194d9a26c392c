mod assembly;
mod chunk_store;
mod coordinator;
mod notifier;
mod registry;

#[rustfmt::skip]
pub use {
    assembly::AssemblyEngine,
    chunk_store::ChunkStore,
    coordinator::UploadCoordinator,
    notifier::UploadEventNotifier,
    registry::SessionRegistry,
};
