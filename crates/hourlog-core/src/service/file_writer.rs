//! Buffered, hour-rotated file writer for a single destination

use chrono::{DateTime, Local, Timelike};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use super::path_template::{ensure_dir, PathTemplate};
use crate::{LogError, Result};

/// Longest time one file stays open, even if the hour field never changed
const MAX_FILE_AGE_SECS: i64 = 60 * 60;

/// Writer for one destination directory
///
/// Holds at most one open file. Not synchronized on its own: the owning
/// channel keeps it behind a mutex shared by the worker and outside callers.
pub struct BufferedFileWriter {
    dir: PathBuf,
    template: PathTemplate,
    current: Option<OpenFile>,
    last_rotation: Option<DateTime<Local>>,
}

struct OpenFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl BufferedFileWriter {
    pub fn new(dir: impl Into<PathBuf>, template: PathTemplate) -> Self {
        Self {
            dir: dir.into(),
            template,
            current: None,
            last_rotation: None,
        }
    }

    /// Destination directory the template is resolved under
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the currently open file
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|f| f.path.as_path())
    }

    /// Creation time of the currently open file
    pub fn last_rotation(&self) -> Option<DateTime<Local>> {
        self.last_rotation
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Whether a write at `now` must go to a new file
    pub fn needs_rotation(&self, now: &DateTime<Local>) -> bool {
        match (&self.current, &self.last_rotation) {
            (Some(_), Some(last)) => {
                now.hour() != last.hour()
                    || now.signed_duration_since(*last).num_seconds() > MAX_FILE_AGE_SECS
            }
            _ => true,
        }
    }

    /// Rotate to the file for `now` if needed
    ///
    /// Returns `true` when a new file was opened. On failure no file is left
    /// open and `last_rotation` keeps its old value, so the next check retries.
    pub async fn ensure_current_file(&mut self, now: DateTime<Local>) -> Result<bool> {
        if !self.needs_rotation(&now) {
            return Ok(false);
        }

        // The outgoing file is closed even if its final flush fails
        if let Err(e) = self.close().await {
            warn!(dir = ?self.dir, error = %e, "Failed to flush outgoing log file");
        }

        let path = self.template.resolve(&self.dir, &now);
        let file = open_append(&path).await?;

        if let Some(previous) = &self.last_rotation {
            info!(
                from = %previous.format("%Y-%m-%d %H:%M:%S"),
                path = ?path,
                "Rotated log file"
            );
        } else {
            debug!(path = ?path, "Opened log file");
        }

        self.current = Some(OpenFile {
            path,
            writer: BufWriter::new(file),
        });
        self.last_rotation = Some(now);

        Ok(true)
    }

    /// Append `msg` and a newline to the buffer; dropped if no file is open
    pub async fn write_line(&mut self, msg: &str) -> Result<()> {
        let Some(current) = self.current.as_mut() else {
            return Ok(());
        };

        current
            .writer
            .write_all(msg.as_bytes())
            .await
            .map_err(LogError::Write)?;
        current.writer.write_all(b"\n").await.map_err(LogError::Write)
    }

    /// Push buffered bytes to the file
    pub async fn flush(&mut self) -> Result<()> {
        match self.current.as_mut() {
            Some(current) => current.writer.flush().await.map_err(LogError::Write),
            None => Ok(()),
        }
    }

    /// Flush and close the open file; later writes are dropped until the
    /// next `ensure_current_file`
    pub async fn close(&mut self) -> Result<()> {
        match self.current.take() {
            Some(mut current) => current.writer.shutdown().await.map_err(LogError::Write),
            None => Ok(()),
        }
    }
}

async fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|source| LogError::FileOpen {
            path: path.to_path_buf(),
            source,
        })
}
