use async_trait::async_trait;
use dashmap::DashMap;
use domain_ingest::{model::entity::UploadSession, repository::SessionRepo};
use uuid::Uuid;

/// Ephemeral session store for deployments that treat uploads as
/// restartable from scratch. A durable implementation slots in behind the
/// same trait without touching the engine.
#[derive(Default)]
pub struct InMemorySessionRepo {
    sessions: DashMap<Uuid, UploadSession>,
}

#[async_trait]
impl SessionRepo for InMemorySessionRepo {
    async fn save(&self, session: &UploadSession) -> anyhow::Result<()> {
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> anyhow::Result<Option<UploadSession>> {
        Ok(self.sessions.get(&id).map(|s| s.value().clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        self.sessions.remove(&id);
        Ok(())
    }

    async fn list_ids(&self) -> anyhow::Result<Vec<Uuid>> {
        Ok(self.sessions.iter().map(|s| *s.key()).collect())
    }
}
