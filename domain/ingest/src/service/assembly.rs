use async_trait::async_trait;
use uuid::Uuid;

use crate::exception::UploadResult;
use crate::model::vo::AssembleOutcome;

/// # Assembly engine
///
/// Merges verified chunks into the final artifact exactly once. Any number
/// of callers may observe completeness concurrently; only the winner of the
/// `Open -> Assembling` claim assembles, the rest return without side
/// effects.
#[async_trait]
pub trait AssemblyEngine: Send + Sync {
    async fn try_assemble(&self, session_id: Uuid) -> UploadResult<AssembleOutcome>;
}
