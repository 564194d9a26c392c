use std::sync::Arc;
use std::time::Duration;

use domain_ingest::service::UploadCoordinator;
use tokio::time::MissedTickBehavior;

/// Background service that periodically expires idle sessions.
pub struct ExpirySweeper {
    coordinator: Arc<dyn UploadCoordinator>,
    interval: Duration,
}

impl ExpirySweeper {
    pub fn new(coordinator: Arc<dyn UploadCoordinator>, interval_secs: u64) -> Self {
        Self {
            coordinator,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.coordinator.sweep_expired().await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "swept expired upload sessions"),
                Err(e) => tracing::error!("expiry sweep failed: {e}"),
            }
        }
    }
}
