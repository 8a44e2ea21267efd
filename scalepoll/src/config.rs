//! Poller configuration
//!
//! Loaded once at startup from a TOML file, then overridden from the
//! environment:
//!
//! | variable                  | key                  |
//! |---------------------------|----------------------|
//! | `SCALEPOLL_HOST`          | `device.host`        |
//! | `SCALEPOLL_PORT`          | `device.port`        |
//! | `SCALEPOLL_INTERVAL_SECS` | `poll.interval_secs` |
//! | `SCALEPOLL_SINK_PATH`     | `sink.path`          |
//!
//! Every key has a default, so an empty file (or no file) is valid.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use scalepoll_core::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_READ_TIMEOUT,
};
use scalepoll_core::{Command, DEFAULT_PORT};
use scalepoll_transport::ReadMode;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "SCALEPOLL_CONFIG";

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "scalepoll.toml";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub poll: PollConfig,
    pub sink: SinkConfig,
}

/// Where the scale is and how to talk to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Broadcast target for discovery, or the scale itself when discovery is off
    pub host: String,
    pub port: u16,

    /// Locate the scale by UDP broadcast before each cycle
    pub discovery: bool,

    /// Hex bytes of the discovery poll command; empty by default
    pub poll_command: String,

    /// Hex bytes of the weight query command
    pub weight_command: String,

    pub discovery_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub read_mode: ReadModeSetting,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "192.168.100.100".to_string(),
            port: DEFAULT_PORT,
            discovery: true,
            poll_command: String::new(),
            weight_command: "A0".to_string(),
            discovery_timeout_ms: DEFAULT_DISCOVERY_TIMEOUT * 1000,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT * 1000,
            read_timeout_ms: DEFAULT_READ_TIMEOUT * 1000,
            read_mode: ReadModeSetting::Framed,
        }
    }
}

impl DeviceConfig {
    pub fn poll_command(&self) -> ConfigResult<Command> {
        parse_command("device.poll_command", &self.poll_command)
    }

    pub fn weight_command(&self) -> ConfigResult<Command> {
        parse_command("device.weight_command", &self.weight_command)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Serialized form of [`ReadMode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadModeSetting {
    #[default]
    Framed,
    Single,
}

impl From<ReadModeSetting> for ReadMode {
    fn from(setting: ReadModeSetting) -> Self {
        match setting {
            ReadModeSetting::Framed => ReadMode::Framed,
            ReadModeSetting::Single => ReadMode::Single,
        }
    }
}

/// Polling schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Record persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// JSON-lines file records are appended to
    pub path: PathBuf,

    /// Records kept in memory while the sink is failing
    pub backlog: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("scale_readings.jsonl"),
            backlog: 1440,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// Search order when `path` is `None`: the `SCALEPOLL_CONFIG` variable,
    /// then `./scalepoll.toml`, then built-in defaults. Environment overrides
    /// are applied and the result validated.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match find_config_file(path)? {
            Some(file) => {
                debug!("Loading configuration from {}", file.display());
                Self::from_toml_str(&fs::read_to_string(&file)?)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SCALEPOLL_*` overrides, reading variables through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("SCALEPOLL_HOST") {
            self.device.host = host;
        }

        if let Some(port) = lookup("SCALEPOLL_PORT") {
            match port.parse() {
                Ok(port) => self.device.port = port,
                Err(_) => warn!("Ignoring SCALEPOLL_PORT={}: not a port number", port),
            }
        }

        if let Some(secs) = lookup("SCALEPOLL_INTERVAL_SECS") {
            match secs.parse() {
                Ok(secs) => self.poll.interval_secs = secs,
                Err(_) => warn!("Ignoring SCALEPOLL_INTERVAL_SECS={}: not a number", secs),
            }
        }

        if let Some(path) = lookup("SCALEPOLL_SINK_PATH") {
            self.sink.path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.device.host.trim().is_empty() {
            return Err(invalid("device.host", "must not be empty"));
        }
        if self.device.port == 0 {
            return Err(invalid("device.port", "must not be 0"));
        }
        if self.device.discovery && self.device.discovery_timeout_ms == 0 {
            return Err(invalid("device.discovery_timeout_ms", "must be positive"));
        }
        if self.device.connect_timeout_ms == 0 {
            return Err(invalid("device.connect_timeout_ms", "must be positive"));
        }
        if self.device.read_timeout_ms == 0 {
            return Err(invalid("device.read_timeout_ms", "must be positive"));
        }
        if self.poll.interval_secs == 0 {
            return Err(invalid("poll.interval_secs", "must be positive"));
        }
        if self.device.weight_command()?.is_empty() {
            return Err(invalid("device.weight_command", "must not be empty"));
        }
        self.device.poll_command()?;

        Ok(())
    }
}

fn find_config_file(path: Option<&Path>) -> ConfigResult<Option<PathBuf>> {
    let explicit = path
        .map(Path::to_path_buf)
        .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    Ok(local.exists().then_some(local))
}

fn parse_command(key: &'static str, hex: &str) -> ConfigResult<Command> {
    hex.parse::<Command>()
        .map_err(|e| invalid(key, e.to_string()))
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}
