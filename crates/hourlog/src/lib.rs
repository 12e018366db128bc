//! Hourlog
//!
//! Categorized, hour-rotated log files for long-running services:
//! - category writers (`access`, `error`, `warning`, `notice`, `record`, `debug`, `stat`)
//!   that format a tab-separated line and queue it for its destination
//! - a level logger (`LevelLog`) forwarding to `tracing`
//! - client IP resolution from request metadata
//! - a process-wide default logger
//!
//! The file machinery (bounded queues, per-destination workers, rotation)
//! lives in `hourlog-core`.

pub mod category_log;
pub mod format;
pub mod global;
pub mod logger;
pub mod request_ip;

pub use category_log::CategoryLog;
pub use global::{files, init, logger, replace, set_logger};
pub use logger::{LevelLog, Logger};
pub use request_ip::{client_ip, is_public_ip, RequestContext, X_FORWARDED_FOR};

pub use hourlog_core::{Category, Level, LineSink, LogConfig, LogError, Result};
