//! Severity levels for the human-readable logger

use serde::{Deserialize, Serialize};
use std::fmt;

/// Log level, ordered from most severe to most verbose
///
/// A message is emitted when its level is `<=` the configured level, so
/// `Level::Info` lets `Panic`..`Info` through and drops `Debug`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Logs, then panics
    Panic,
    /// Logs, then exits the process
    Fatal,
    Error,
    #[serde(rename = "warning", alias = "warn")]
    Warn,
    Info,
    #[default]
    Debug,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warning",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }

    /// Parse a level name case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "panic" => Some(Self::Panic),
            "fatal" => Some(Self::Fatal),
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    /// Parse a level name, falling back to `Debug` for anything unrecognised
    pub fn parse_or_debug(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Debug)
    }

    /// Whether a message at `level` passes a logger configured at `self`
    pub fn enables(&self, level: Level) -> bool {
        level <= *self
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
