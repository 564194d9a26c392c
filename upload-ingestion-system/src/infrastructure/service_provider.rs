use std::sync::Arc;

use domain_ingest::service::{
    AssemblyEngine, ChunkStore, SessionRegistry, UploadCoordinator, UploadEventNotifier,
};
use service_ingest::{
    AssemblyEngineImpl, LocalChunkStoreImpl, SessionRegistryImpl, UploadCoordinatorImpl,
};

use crate::infrastructure::config::IngestConfig;
use crate::infrastructure::event_queue::InternalEventQueue;
use crate::infrastructure::repository::InMemorySessionRepo;

/// Explicitly wired service graph of the engine.
pub struct ServiceProvider {
    pub config: IngestConfig,
    pub registry: Arc<dyn SessionRegistry>,
    pub chunk_store: Arc<dyn ChunkStore>,
    pub assembly_engine: Arc<dyn AssemblyEngine>,
    pub coordinator: Arc<dyn UploadCoordinator>,
    pub event_queue: Arc<InternalEventQueue>,
}

impl ServiceProvider {
    pub async fn build(config: IngestConfig) -> anyhow::Result<Arc<Self>> {
        config.validate()?;

        let registry: Arc<dyn SessionRegistry> = Arc::new(
            SessionRegistryImpl::builder()
                .session_repo(Arc::new(InMemorySessionRepo::default()))
                .build(),
        );
        registry.restore().await?;

        let chunk_store: Arc<dyn ChunkStore> =
            Arc::new(LocalChunkStoreImpl::builder().base(config.cache_base.clone()).build());
        let event_queue = Arc::new(InternalEventQueue::new());
        let notifier: Arc<dyn UploadEventNotifier> = event_queue.clone();

        let assembly_engine: Arc<dyn AssemblyEngine> = Arc::new(
            AssemblyEngineImpl::builder()
                .registry(registry.clone())
                .chunk_store(chunk_store.clone())
                .notifier(notifier.clone())
                .build(),
        );
        let coordinator: Arc<dyn UploadCoordinator> = Arc::new(
            UploadCoordinatorImpl::builder()
                .registry(registry.clone())
                .chunk_store(chunk_store.clone())
                .assembly_engine(assembly_engine.clone())
                .notifier(notifier)
                .hash_algorithm(config.hash_algorithm)
                .limits(config.limits)
                .idle_timeout(config.idle_timeout())
                .build(),
        );

        Ok(Arc::new(Self {
            config,
            registry,
            chunk_store,
            assembly_engine,
            coordinator,
            event_queue,
        }))
    }
}
