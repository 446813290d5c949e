use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Where uploaded member documents live and how they are published.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per bucket
    pub root: String,
    pub bucket: String,
    /// Prefix of public document URLs, without the bucket segment
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetcherConfig {
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub admin_token: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://mjbea.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("storage.root", "storage")?
            .set_default("storage.bucket", "documents")?
            .set_default("storage.public_base_url", "http://localhost:8080/storage")?
            .set_default("fetcher.timeout_secs", 30)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with MJBEA__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("MJBEA").separator("__"))

            .build()?;

        config.try_deserialize()
    }

    /// Directory served at `/storage/<bucket>`.
    pub fn bucket_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.storage.root).join(&self.storage.bucket)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://mjbea.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            storage: StorageConfig {
                root: "storage".to_string(),
                bucket: "documents".to_string(),
                public_base_url: "http://localhost:8080/storage".to_string(),
            },
            fetcher: FetcherConfig::default(),
            auth: AuthConfig {
                admin_token: "change-me-in-production".to_string(),
            },
        }
    }
}
