//! Logger handle: level logger plus category writers over one sink

use hourlog_core::{DestinationRegistry, Level, LineSink, LogConfig, PathTemplate, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::category_log::CategoryLog;

/// Human-readable, level-filtered logging
///
/// Implementors provide `log`; the per-level methods are thin wrappers.
pub trait LevelLog {
    /// Most verbose level still emitted
    fn level(&self) -> Level;

    /// Emit `args` at `level` if the configured level allows it
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    fn enabled(&self, level: Level) -> bool {
        self.level().enables(level)
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }

    /// Same as `info`
    fn print(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args)
    }

    /// Same as `warn`
    fn warning(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args)
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args)
    }

    /// Log at `Panic`, then panic with the same message
    fn panic(&self, args: fmt::Arguments<'_>) -> ! {
        let msg = args.to_string();
        self.log(Level::Panic, format_args!("{}", msg));
        panic!("{}", msg)
    }
}

/// A logger instance: one config, one sink, one level
///
/// Level messages go to `tracing`; category lines go to the sink through
/// [`Logger::files`]. Share it as `Arc<Logger>`.
pub struct Logger {
    config: Arc<LogConfig>,
    level: Level,
    files: CategoryLog,
}

impl Logger {
    /// Build a logger writing to a [`DestinationRegistry`] under `config.dir`
    ///
    /// Fails only if `config.sub_rel_path` is not a valid template.
    pub fn new(config: LogConfig) -> Result<Self> {
        let registry = DestinationRegistry::new(&config)?;
        Ok(Self::with_sink(config, Arc::new(registry)))
    }

    /// Build a logger over any sink
    pub fn with_sink(config: LogConfig, sink: Arc<dyn LineSink>) -> Self {
        let level = config.level();
        let config = Arc::new(config);
        Self {
            files: CategoryLog::new(Arc::clone(&config), sink),
            config,
            level,
        }
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Category writers (access, error, warning, notice, record, debug, stat)
    pub fn files(&self) -> &CategoryLog {
        &self.files
    }

    /// Flush every open destination
    pub async fn flush(&self) -> Result<()> {
        self.files.sink().flush().await
    }

    /// Drain and stop every destination; safe to call more than once
    pub async fn close(&self) -> Result<()> {
        self.files.sink().close().await
    }

    /// Log at `Fatal`, close the logger, then exit the process with status 1
    pub async fn fatal(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, args);
        if let Err(e) = self.close().await {
            eprintln!("hourlog: close before exit failed: {}", e);
        }
        std::process::exit(1)
    }
}

impl Default for Logger {
    /// Logger over [`LogConfig::default`]
    fn default() -> Self {
        let config = LogConfig::default();
        let registry = DestinationRegistry::with_template(
            config.dir.clone(),
            PathTemplate::default(),
            config.queue_capacity(),
        );
        Self::with_sink(config, Arc::new(registry))
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("dir", &self.config.dir)
            .field("level", &self.level)
            .finish()
    }
}

impl LevelLog for Logger {
    fn level(&self) -> Level {
        self.level
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }

        let server = self.config.server_ip.as_deref();
        match level {
            Level::Panic | Level::Fatal | Level::Error => {
                error!(target: "hourlog", level = %level, server, "{}", args)
            }
            Level::Warn => warn!(target: "hourlog", server, "{}", args),
            Level::Info => info!(target: "hourlog", server, "{}", args),
            Level::Debug => debug!(target: "hourlog", server, "{}", args),
        }
    }
}

/// Log through a handle at debug level: `log_debug!(logger, "x = {}", x)`
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {{
        use $crate::LevelLog as _;
        $logger.debug(format_args!($($arg)+))
    }};
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {{
        use $crate::LevelLog as _;
        $logger.info(format_args!($($arg)+))
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {{
        use $crate::LevelLog as _;
        $logger.warn(format_args!($($arg)+))
    }};
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {{
        use $crate::LevelLog as _;
        $logger.error(format_args!($($arg)+))
    }};
}
