//! hourlog-demo: `hourlog-demo [lines] [log_type]`
//!
//! Reads `HOURLOG_*` settings from the environment (or `.env`), installs the
//! default logger and writes `lines` record lines plus one of each event kind.

use anyhow::{Context, Result};
use hourlog::{global, log_info};
use hourlog_core::LogConfig;
use std::time::Instant;
use tracing::info;

const DEFAULT_LINES: usize = 1000;

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    // RUST_LOG takes precedence
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,hourlog=debug,hourlog_core=debug,hourlog_demo=debug")
    });

    let console_layer = fmt::layer()
        .with_ansi(true)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let lines = match args.next() {
        Some(n) => n.parse::<usize>().context("lines must be a number")?,
        None => DEFAULT_LINES,
    };
    let log_type = args.next().unwrap_or_else(|| "demo".to_string());

    let config = LogConfig::from_env().context("failed to read HOURLOG_* settings")?;
    info!(
        "[demo] Writing {} lines under {} (template {}, buffer {})",
        lines,
        config.dir.display(),
        config.sub_rel_path,
        config.queue_capacity()
    );

    let logger = global::init(config).await?;
    global::init_stat_dirs(&[log_type.as_str()]).await?;

    let started = Instant::now();
    for i in 0..lines {
        global::record(&log_type, &format!("seq={}\tpayload=line-{}", i, i)).await?;
    }
    global::notice(&log_type, "Startup", "demo run finished writing", None).await?;
    global::stat(&log_type, &format!("lines={}", lines)).await?;

    global::flush().await?;
    global::close().await?;

    log_info!(
        logger,
        "wrote {} lines in {:?}",
        lines,
        started.elapsed()
    );
    Ok(())
}
