//! # Hourlog Core Library
//!
//! Routes log lines to hour-rotated files through asynchronous,
//! per-destination channels.
//!
//! ## Modules
//!
//! - `domain` - Configuration, levels and categories
//! - `service` - Path templates, buffered writers, channels, registry
//! - `sink` - The `LineSink` trait the facade writes through
//! - `error` - Error taxonomy

pub mod domain;
pub mod error;
pub mod service;
pub mod sink;

// Re-export commonly used types
pub use domain::*;
pub use error::{LogError, Result};
pub use service::*;
pub use sink::LineSink;
