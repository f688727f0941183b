//! RateGate - multi-tenant API rate limiting service

use rategate::{Config, RateGate};
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    // Initialize logging system
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    let gate = RateGate::new(config).await?;
    gate.run().await.map_err(Into::into)
}
