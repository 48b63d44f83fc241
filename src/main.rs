mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting scheduler service");

    // Load configuration
    let config = startup::load_config()?;

    // Pick the store and fill empty collections
    let store = startup::build_store(&config).await?;
    startup::seed_store(&config, store.as_ref()).await?;

    // Serve until a termination signal arrives
    startup::start_server(&config, store).await
}
