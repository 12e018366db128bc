//! Logger configuration snapshot

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::Level;
use crate::{LogError, Result};

/// Queue capacity used when the configured one is zero or negative
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default rotation template: one file per hour, grouped by month and day
pub const DEFAULT_SUB_REL_PATH: &str = "2006-01/2006-01-02/2006-01-02-15.log";

/// Environment variables read by [`LogConfig::from_env`]
pub mod env_keys {
    pub const DIR: &str = "HOURLOG_DIR";
    pub const BUFFER: &str = "HOURLOG_BUFFER";
    pub const SUB_REL_PATH: &str = "HOURLOG_SUB_REL_PATH";
    pub const LOG_LEVEL: &str = "HOURLOG_LOG_LEVEL";
    pub const SERVER_IP: &str = "HOURLOG_SERVER_IP";
}

/// Configuration shared by every destination of one logger
///
/// Read-only once the logger is built. Field names match the keys used in
/// application config files (`dir`, `buffer`, `sub_rel_path`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Root directory for all log files
    pub dir: PathBuf,

    /// Per-destination queue capacity; zero or negative means [`DEFAULT_QUEUE_CAPACITY`]
    pub buffer: i64,

    /// Rotation path template, relative to `<dir>/<category>/<type>`
    pub sub_rel_path: String,

    /// Minimum severity for the human-readable logger
    pub log_level: String,

    /// Server identifier appended to error/warning/notice lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            buffer: DEFAULT_QUEUE_CAPACITY as i64,
            sub_rel_path: DEFAULT_SUB_REL_PATH.to_string(),
            log_level: "info".to_string(),
            server_ip: None,
        }
    }
}

impl LogConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn with_sub_rel_path(mut self, template: impl Into<String>) -> Self {
        self.sub_rel_path = template.into();
        self
    }

    pub fn with_buffer(mut self, buffer: i64) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_server_ip(mut self, server_ip: impl Into<String>) -> Self {
        self.server_ip = Some(server_ip.into());
        self
    }

    /// Queue capacity actually used by channels
    pub fn queue_capacity(&self) -> usize {
        match usize::try_from(self.buffer) {
            Ok(capacity) if capacity > 0 => capacity,
            _ => DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Parsed minimum level; unknown names mean `Debug`
    pub fn level(&self) -> Level {
        Level::parse_or_debug(&self.log_level)
    }

    /// Server identifier, empty when unset
    pub fn server_ip(&self) -> &str {
        self.server_ip.as_deref().unwrap_or("")
    }

    /// Parse a JSON config document; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LogError::Config(e.to_string()))
    }

    /// Read and parse a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LogError::Config(format!("failed to read {:?}: {}", path, e)))?;
        Self::from_json_str(&content)
    }

    /// Defaults overridden by `HOURLOG_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(dir) = lookup(env_keys::DIR) {
            config.dir = PathBuf::from(dir);
        }
        if let Some(buffer) = lookup(env_keys::BUFFER) {
            config.buffer = buffer.trim().parse().map_err(|_| {
                LogError::Config(format!(
                    "{} must be an integer, got {:?}",
                    env_keys::BUFFER,
                    buffer
                ))
            })?;
        }
        if let Some(template) = lookup(env_keys::SUB_REL_PATH) {
            config.sub_rel_path = template;
        }
        if let Some(level) = lookup(env_keys::LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(server_ip) = lookup(env_keys::SERVER_IP).filter(|s| !s.is_empty()) {
            config.server_ip = Some(server_ip);
        }
        Ok(config)
    }
}
