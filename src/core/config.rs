use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Endpoints and timings used by the chat front end
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    #[serde(default = "default_chat_endpoint")]
    pub chat_endpoint: String,
    #[serde(default = "default_status_endpoint")]
    pub status_endpoint: String,
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_max_fetch_limit")]
    pub max_fetch_limit: u32,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

/// Snapshot served by the status endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_online")]
    pub online: bool,
    #[serde(default = "default_players")]
    pub players: u32,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_auth_endpoint() -> String {
    "http://127.0.0.1:8080/auth".to_string()
}

fn default_chat_endpoint() -> String {
    "http://127.0.0.1:8080/chat".to_string()
}

fn default_status_endpoint() -> String {
    "http://127.0.0.1:8080/status".to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from("session.json")
}

fn default_request_timeout() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    5
}

fn default_fetch_limit() -> u32 {
    50
}

fn default_port() -> u16 {
    8080
}

fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_max_fetch_limit() -> u32 {
    200
}

fn default_max_messages() -> usize {
    10_000
}

fn default_online() -> bool {
    true
}

fn default_players() -> u32 {
    0
}

fn default_max_players() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

fn default_console() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_endpoint: default_auth_endpoint(),
            chat_endpoint: default_chat_endpoint(),
            status_endpoint: default_status_endpoint(),
            session_path: default_session_path(),
            request_timeout: default_request_timeout(),
            poll_interval: default_poll_interval(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            num_threads: default_num_threads(),
            max_fetch_limit: default_max_fetch_limit(),
            max_messages: default_max_messages(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            online: default_online(),
            players: default_players(),
            max_players: default_max_players(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate client config
        if self.client.auth_endpoint.is_empty() {
            bail!("auth_endpoint must not be empty");
        }

        if self.client.chat_endpoint.is_empty() {
            bail!("chat_endpoint must not be empty");
        }

        if self.client.status_endpoint.is_empty() {
            bail!("status_endpoint must not be empty");
        }

        if self.client.request_timeout == 0 {
            bail!("request_timeout must be greater than 0");
        }

        if self.client.poll_interval == 0 {
            bail!("poll_interval must be greater than 0");
        }

        if self.client.fetch_limit == 0 {
            bail!("fetch_limit must be greater than 0");
        }

        // Validate server config
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.server.max_fetch_limit == 0 {
            bail!("max_fetch_limit must be greater than 0");
        }

        if self.server.max_messages == 0 {
            bail!("max_messages must be greater than 0");
        }

        if self.status.players > self.status.max_players {
            bail!(
                "players ({}) must not exceed max_players ({})",
                self.status.players,
                self.status.max_players
            );
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
