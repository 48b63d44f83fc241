use crate::shutdown;
use scheduler_service::calendar::seed_defaults;
use scheduler_service::config::{Config, StoreBackend};
use scheduler_service::error::Error;
use scheduler_service::store::{EventStore, InMemoryStore, RedisStore};
use scheduler_service::web::{router, AppState};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => {
            info!("Loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Create the configured store, falling back to memory when Redis is down
pub async fn build_store(config: &Config) -> miette::Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Redis => {
            match RedisStore::connect(&config.redis_url, &config.redis_key_prefix).await {
                Ok(redis_store) => {
                    info!("Connected to Redis successfully");
                    Arc::new(redis_store)
                }
                Err(e) => {
                    error!("Failed to connect to Redis: {}", e);
                    info!("Using in-memory store as fallback");
                    Arc::new(InMemoryStore::new())
                }
            }
        }
    };

    Ok(store)
}

/// Seed default data when a seed directory is configured
pub async fn seed_store(config: &Config, store: &dyn EventStore) -> miette::Result<()> {
    if let Some(dir) = &config.seed_dir {
        seed_defaults(store, dir).await?;
    }
    Ok(())
}

/// Bind and serve the HTTP API until shutdown
pub async fn start_server(config: &Config, store: Arc<dyn EventStore>) -> miette::Result<()> {
    let app = router(AppState::new(store));

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(Error::from)?;
    info!("Server is running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from)?;

    info!("Server shut down");
    Ok(())
}
