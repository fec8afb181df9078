use microbatch::{
    api::Server,
    batch::{Batching, LogBatchProcessor},
    config::Config,
};
use std::sync::Arc;
use tracing::info;

/// The main entry point for the micro-batching engine.
///
/// Initializes logging, loads the configuration, starts the periodic flush
/// schedule, and serves the HTTP API. Configuration or scheduler failures
/// abort startup immediately rather than degrading into partial operation.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load("config/default.toml")?;
    info!("Micro-batching engine starting with config: {:?}", config);

    // The default binding just logs dispatched batches; swap in a real
    // BatchProcessor implementation to execute them.
    let engine = Arc::new(Batching::new(
        config.batch.clone(),
        Arc::new(LogBatchProcessor),
    ));

    engine.clone().start().await?;
    info!("Flush schedule started");

    let server = Server::new(config.api, engine);
    server.start().await?;

    Ok(())
}
