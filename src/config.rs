use crate::error::{config_error, env_error, SchedulerResult};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default port, matching the original service
pub const DEFAULT_PORT: u16 = 3000;

/// Default Redis connection string
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Optional overrides file, read after the environment
pub const CONFIG_FILE: &str = "config/scheduler.toml";

/// Which `EventStore` backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl StoreBackend {
    fn parse(value: &str) -> SchedulerResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(config_error(&format!("Unknown store backend '{}'", other))),
        }
    }
}

/// Main configuration structure for the service
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// HTTP port
    pub port: u16,
    /// Store backend selection
    pub store_backend: StoreBackend,
    /// Redis connection string, used by the redis backend
    pub redis_url: String,
    /// Prefix for every Redis key written by the service
    pub redis_key_prefix: String,
    /// Directory holding default JSON data, seeded into empty collections
    pub seed_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            store_backend: StoreBackend::Memory,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            redis_key_prefix: "scheduler".to_string(),
            seed_dir: None,
        }
    }
}

/// Shape of `config/scheduler.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind_address: Option<String>,
    port: Option<u16>,
    store_backend: Option<StoreBackend>,
    redis_url: Option<String>,
    redis_key_prefix: Option<String>,
    seed_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> SchedulerResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let file = if Path::new(CONFIG_FILE).exists() {
            let content = fs::read_to_string(CONFIG_FILE)?;
            toml::from_str::<FileConfig>(&content)?
        } else {
            FileConfig::default()
        };

        Self::from_sources(|key| env::var(key).ok(), file)
    }

    /// Environment wins over the file, the file wins over defaults
    fn from_sources<F>(lookup: F, file: FileConfig) -> SchedulerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = match lookup("APP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| env_error("APP_PORT"))?,
            None => file.port.unwrap_or(defaults.port),
        };

        let store_backend = match lookup("STORE_BACKEND") {
            Some(raw) => StoreBackend::parse(&raw)?,
            None => file.store_backend.unwrap_or(defaults.store_backend),
        };

        let bind_address = lookup("BIND_ADDRESS")
            .or(file.bind_address)
            .unwrap_or(defaults.bind_address);
        let redis_url = lookup("REDIS_URL")
            .or(file.redis_url)
            .unwrap_or(defaults.redis_url);
        let redis_key_prefix = lookup("REDIS_KEY_PREFIX")
            .or(file.redis_key_prefix)
            .unwrap_or(defaults.redis_key_prefix);
        let seed_dir = lookup("SEED_DIR").map(PathBuf::from).or(file.seed_dir);

        Ok(Config {
            bind_address,
            port,
            store_backend,
            redis_url,
            redis_key_prefix,
            seed_dir,
        })
    }
}
