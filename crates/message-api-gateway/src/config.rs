use anyhow::Context;
use message_api_types::Message;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 8080  # Set via PORT env var

[database]
path = "message-api.db"  # Set via DATABASE_PATH env var; ":memory:" for a throwaway database
max_connections = 5

[logging]
level = "info"  # trace, debug, info, warn, error
json = false

# Messages inserted at startup when their id is not stored yet
# [[seed]]
# id = 1
# content = "Cool Message 1"
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SeedMessage {
    pub id: i64,
    pub content: String,
}

impl From<SeedMessage> for Message {
    fn from(seed: SeedMessage) -> Self {
        Message::new(seed.id, seed.content)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub seed: Vec<SeedMessage>,
}

impl Config {
    /// Get the global config path: ~/.message-api/message-api.toml
    fn global_config_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".message-api").join("message-api.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::global_config_path()?;
        let config_dir = config_path
            .parent()
            .context("Global config path has no parent directory")?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            eprintln!("Created config directory: {}", config_dir.display());
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())?;
            eprintln!("Created default config: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.message-api/message-api.toml (auto-created if missing)
    /// 2. Local override: ./message-api.toml (optional)
    /// 3. Environment variables (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        // Ensure global config exists
        let global_config_path = Self::ensure_global_config()?;

        // Build config with layered sources (later sources override earlier ones)
        let mut config_builder = config::Config::builder()
            // Layer 1: Global config (required - we just created it if missing)
            .add_source(config::File::from(global_config_path))
            // Layer 2: Local workspace config (optional override)
            .add_source(config::File::with_name("message-api").required(false))
            // Layer 3: Environment variables with MESSAGE_API__ prefix
            .add_source(
                config::Environment::with_prefix("MESSAGE_API")
                    .separator("__")
                    .try_parsing(true),
            );

        // Layer 4: Apply convenience env var overrides (highest priority)
        if let Ok(path) = env::var("DATABASE_PATH") {
            config_builder = config_builder.set_override("database.path", path)?;
        }

        if let Ok(port) = env::var("PORT") {
            config_builder = config_builder.set_override("server.port", port)?;
        }

        let config = config_builder.build()?;

        let config: Self = config.try_deserialize()?;
        Ok(config)
    }

    /// Parse a single TOML document, without touching files or the environment
    #[cfg(test)]
    pub fn parse(toml: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn seed_messages(&self) -> Vec<Message> {
        self.seed.iter().cloned().map(Message::from).collect()
    }
}
