use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upload_ingestion_system::infrastructure::{
    config::IngestConfig, ExpirySweeper, ServiceProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = IngestConfig::load(std::env::args().nth(1).as_deref())?;
    let provider = ServiceProvider::build(config).await?;

    tokio::spawn(
        ExpirySweeper::new(
            provider.coordinator.clone(),
            provider.config.sweep_interval_secs,
        )
        .run(),
    );

    // Placeholder downstream consumer until a real pipeline is attached.
    let receiver = provider.event_queue.get_receiver();
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv_async().await {
            match serde_json::to_string(&event) {
                Ok(payload) => tracing::info!(%payload, "upload event"),
                Err(e) => tracing::error!("unserializable upload event: {e}"),
            }
        }
    });

    tracing::info!("upload ingestion engine started");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}
