//! Error taxonomy for the file-writing core

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the path resolver, file writers, channels and registry
#[derive(Debug, Error)]
pub enum LogError {
    /// A log directory could not be created (permissions, disk space, ...)
    #[error("failed to create log directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rotation could not open or create the target file
    #[error("failed to open log file {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Buffered write or flush failed (e.g. disk full)
    #[error("failed to write log data: {0}")]
    Write(#[source] io::Error),

    /// Operation attempted on a destination after shutdown
    #[error("log destination {0} is already closed")]
    AlreadyClosed(String),

    /// Path template could not be compiled
    #[error("invalid path template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Configuration could not be read or parsed
    #[error("invalid log configuration: {0}")]
    Config(String),
}

impl LogError {
    /// True for the shutdown error, which callers usually ignore during teardown
    pub fn is_closed(&self) -> bool {
        matches!(self, LogError::AlreadyClosed(_))
    }
}

pub type Result<T> = std::result::Result<T, LogError>;
