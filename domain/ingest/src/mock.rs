use async_trait::async_trait;
use chrono::Duration;
use mockall::mock;
use uuid::Uuid;

use crate::{
    command::OpenUploadCommand,
    exception::UploadResult,
    model::{
        entity::{AssembledArtifact, ChunkRecord, SessionState, UploadSession},
        vo::{
            ArtifactOutcome, AssembleOutcome, AssemblyClaim, BlobHandle, HashAlgorithm,
            RecordOutcome, UploadEvent,
        },
    },
    repository::SessionRepo,
    service::{AssemblyEngine, ChunkStore, SessionRegistry, UploadEventNotifier},
};

mock! {
    pub SessionRepo {}
    #[async_trait]
    impl SessionRepo for SessionRepo {
        async fn save(&self, session: &UploadSession) -> anyhow::Result<()>;
        async fn load(&self, id: Uuid) -> anyhow::Result<Option<UploadSession>>;
        async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
        async fn list_ids(&self) -> anyhow::Result<Vec<Uuid>>;
    }
}

mock! {
    pub SessionRegistry {}
    #[async_trait]
    impl SessionRegistry for SessionRegistry {
        async fn open(
            &self,
            cmd: OpenUploadCommand,
            hash_algorithm: HashAlgorithm,
        ) -> UploadResult<Uuid>;
        async fn get(&self, id: Uuid) -> UploadResult<UploadSession>;
        async fn status(&self, id: Uuid) -> UploadResult<SessionState>;
        async fn record_chunk(&self, id: Uuid, record: ChunkRecord) -> UploadResult<RecordOutcome>;
        async fn begin_assembly(&self, id: Uuid) -> UploadResult<AssemblyClaim>;
        async fn mark_completed(&self, id: Uuid, artifact: AssembledArtifact) -> UploadResult<()>;
        async fn mark_failed(&self, id: Uuid, reason: &str) -> UploadResult<UploadSession>;
        async fn artifact(&self, id: Uuid) -> UploadResult<ArtifactOutcome>;
        async fn sweep_expired(&self, idle_timeout: Duration) -> UploadResult<Vec<UploadSession>>;
        async fn restore(&self) -> UploadResult<()>;
    }
}

mock! {
    pub ChunkStore {}
    #[async_trait]
    impl ChunkStore for ChunkStore {
        async fn put(&self, content: &[u8]) -> anyhow::Result<BlobHandle>;
        async fn get(&self, handle: &BlobHandle) -> anyhow::Result<Vec<u8>>;
        async fn delete(&self, handle: &BlobHandle) -> anyhow::Result<()>;
    }
}

mock! {
    pub AssemblyEngine {}
    #[async_trait]
    impl AssemblyEngine for AssemblyEngine {
        async fn try_assemble(&self, session_id: Uuid) -> UploadResult<AssembleOutcome>;
    }
}

mock! {
    pub UploadEventNotifier {}
    #[async_trait]
    impl UploadEventNotifier for UploadEventNotifier {
        async fn notify(&self, event: UploadEvent) -> anyhow::Result<()>;
    }
}
