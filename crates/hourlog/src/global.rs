//! Process-wide default logger
//!
//! Starts as [`Logger::default`] (writes under `./logs`). Nothing is spawned
//! until the first line is written, so touching the default is free.

use hourlog_core::{Level, LogConfig, Result};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::category_log::CategoryLog;
use crate::logger::{LevelLog, Logger};
use crate::request_ip::RequestContext;

lazy_static! {
    static ref DEFAULT_LOGGER: RwLock<Arc<Logger>> = RwLock::new(Arc::new(Logger::default()));
}

/// Current default logger
pub fn logger() -> Arc<Logger> {
    Arc::clone(&DEFAULT_LOGGER.read())
}

/// Category writers of the current default logger
pub fn files() -> CategoryLog {
    logger().files().clone()
}

/// Build a logger from `config` and install it as the default
///
/// The previous default is closed, so anything it buffered is on disk
/// before this returns.
pub async fn init(config: LogConfig) -> Result<Arc<Logger>> {
    let logger = Arc::new(Logger::new(config)?);
    replace(Arc::clone(&logger)).await;
    Ok(logger)
}

/// Install `logger` as the default and return the previous one, closed
pub async fn replace(logger: Arc<Logger>) -> Arc<Logger> {
    let previous = std::mem::replace(&mut *DEFAULT_LOGGER.write(), logger);
    if let Err(e) = previous.close().await {
        warn!("[hourlog] Failed to close replaced logger: {}", e);
    }
    debug!("[hourlog] Default logger replaced");
    previous
}

/// Install `logger` as the default
pub async fn set_logger(logger: Arc<Logger>) {
    replace(logger).await;
}

pub async fn flush() -> Result<()> {
    logger().flush().await
}

pub async fn close() -> Result<()> {
    logger().close().await
}

/// Level-filtered message through the default logger
pub fn log(level: Level, args: fmt::Arguments<'_>) {
    logger().log(level, args)
}

pub async fn init_stat_dirs<S: AsRef<str>>(log_types: &[S]) -> Result<()> {
    files().init_stat_dirs(log_types).await
}

pub async fn record(log_type: &str, msg: &str) -> Result<()> {
    files().record(log_type, msg).await
}

pub async fn debug(log_type: &str, msg: &str) -> Result<()> {
    files().debug(log_type, msg).await
}

pub async fn stat(log_type: &str, msg: &str) -> Result<()> {
    files().stat(log_type, msg).await
}

pub async fn access(log_type: &str, msg: &str, request: &RequestContext<'_>) -> Result<()> {
    files().access(log_type, msg, request).await
}

pub async fn error(
    log_type: &str,
    exception: &str,
    desc: &str,
    request: Option<&RequestContext<'_>>,
) -> Result<()> {
    files().error(log_type, exception, desc, request).await
}

pub async fn warning(
    log_type: &str,
    exception: &str,
    desc: &str,
    request: Option<&RequestContext<'_>>,
) -> Result<()> {
    files().warning(log_type, exception, desc, request).await
}

pub async fn notice(
    log_type: &str,
    exception: &str,
    desc: &str,
    request: Option<&RequestContext<'_>>,
) -> Result<()> {
    files().notice(log_type, exception, desc, request).await
}
