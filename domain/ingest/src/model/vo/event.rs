use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::AssembledArtifact;

/// Notification delivered to the downstream pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum UploadEvent {
    Completed {
        session_id: Uuid,
        artifact: AssembledArtifact,
    },
    Failed {
        session_id: Uuid,
        reason: String,
    },
}
