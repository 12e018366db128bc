//! Category writers - format a line and hand it to the sink

use chrono::Local;
use hourlog_core::{Category, LineSink, LogConfig, Result};
use std::sync::Arc;

use crate::format::{access_line, event_line, timestamped_line};
use crate::request_ip::RequestContext;

/// Writes categorized lines to `<dir>/<category>/<type>/...`
///
/// Cheap to clone; clones share the same sink.
#[derive(Clone)]
pub struct CategoryLog {
    config: Arc<LogConfig>,
    sink: Arc<dyn LineSink>,
}

impl CategoryLog {
    pub fn new(config: Arc<LogConfig>, sink: Arc<dyn LineSink>) -> Self {
        Self { config, sink }
    }

    pub fn sink(&self) -> &Arc<dyn LineSink> {
        &self.sink
    }

    /// Persist an already formatted line
    pub async fn write(&self, category: Category, log_type: &str, line: String) -> Result<()> {
        self.sink
            .write_line(&category.destination(log_type), line)
            .await
    }

    /// Access line: `ts, msg, client ip, uri`
    pub async fn access(&self, log_type: &str, msg: &str, request: &RequestContext<'_>) -> Result<()> {
        let line = access_line(&Local::now(), msg, request);
        self.write(Category::Access, log_type, line).await
    }

    pub async fn error(
        &self,
        log_type: &str,
        exception: &str,
        desc: &str,
        request: Option<&RequestContext<'_>>,
    ) -> Result<()> {
        self.event(Category::Error, log_type, exception, desc, request)
            .await
    }

    pub async fn warning(
        &self,
        log_type: &str,
        exception: &str,
        desc: &str,
        request: Option<&RequestContext<'_>>,
    ) -> Result<()> {
        self.event(Category::Warning, log_type, exception, desc, request)
            .await
    }

    pub async fn notice(
        &self,
        log_type: &str,
        exception: &str,
        desc: &str,
        request: Option<&RequestContext<'_>>,
    ) -> Result<()> {
        self.event(Category::Notice, log_type, exception, desc, request)
            .await
    }

    /// Record line: `ts, msg`
    pub async fn record(&self, log_type: &str, msg: &str) -> Result<()> {
        let line = timestamped_line(&Local::now(), msg);
        self.write(Category::Record, log_type, line).await
    }

    /// Debug line: `ts, msg`
    pub async fn debug(&self, log_type: &str, msg: &str) -> Result<()> {
        let line = timestamped_line(&Local::now(), msg);
        self.write(Category::Debug, log_type, line).await
    }

    /// Stat line, persisted as given
    pub async fn stat(&self, log_type: &str, msg: &str) -> Result<()> {
        self.write(Category::Stat, log_type, msg.to_string()).await
    }

    /// Create `<dir>/stat/<type>` before anything is written there
    pub async fn ensure_stat_dir(&self, log_type: &str) -> Result<()> {
        self.sink
            .ensure_destination(&Category::Stat.destination(log_type))
            .await
    }

    /// Create the stat directory of every type, stopping at the first failure
    pub async fn init_stat_dirs<S: AsRef<str>>(&self, log_types: &[S]) -> Result<()> {
        for log_type in log_types {
            self.ensure_stat_dir(log_type.as_ref()).await?;
        }
        Ok(())
    }

    async fn event(
        &self,
        category: Category,
        log_type: &str,
        exception: &str,
        desc: &str,
        request: Option<&RequestContext<'_>>,
    ) -> Result<()> {
        let line = event_line(
            &Local::now(),
            exception,
            desc,
            request,
            self.config.server_ip(),
        );
        self.write(category, log_type, line).await
    }
}
