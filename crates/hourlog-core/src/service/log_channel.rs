//! Per-destination asynchronous log channel
//!
//! Each channel owns one bounded queue and one background worker task. The
//! worker is the only writer of its file:
//!
//! ```text
//! write() ──► [bounded mpsc queue] ──► worker ──► BufferedFileWriter ──► disk
//!                                        ▲
//!                           1s ticker ───┘ (flush + rotation check)
//! ```
//!
//! The worker also checks rotation before each write, so a line never lands
//! in the previous hour's file.
//!
//! Lifecycle: `Created → Running → Draining → Stopped`. `close()` drops the
//! queue sender, lets the worker drain what is left, and waits for it.

use chrono::Local;
use parking_lot::Mutex as StateLock;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use super::file_writer::BufferedFileWriter;
use super::path_template::PathTemplate;
use crate::{LogError, Result};

/// How often the worker flushes its buffer and re-checks rotation
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Lifecycle of a channel's worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Created,
    Running,
    /// Close requested; queue closed to new messages, worker still draining
    Draining,
    Stopped,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Shared handle to a destination's file writer
pub type SharedWriter = Arc<Mutex<BufferedFileWriter>>;

/// Asynchronous channel for one destination directory
pub struct AsyncLogChannel {
    key: String,
    capacity: usize,
    sender: RwLock<Option<mpsc::Sender<String>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    writer: SharedWriter,
    state: Arc<StateLock<ChannelState>>,
}

impl AsyncLogChannel {
    /// Create the channel and spawn its worker
    ///
    /// Must be called from within a tokio runtime. The worker opens the first
    /// file itself; a failure there is logged and retried on the next tick.
    pub fn spawn(dir: impl Into<PathBuf>, template: PathTemplate, capacity: usize) -> Self {
        let dir = dir.into();
        let key = dir.to_string_lossy().into_owned();
        let capacity = capacity.max(1);

        let (tx, rx) = mpsc::channel(capacity);
        let writer = Arc::new(Mutex::new(BufferedFileWriter::new(dir, template)));
        let state = Arc::new(StateLock::new(ChannelState::Created));

        let handle = tokio::spawn(run_worker(
            key.clone(),
            rx,
            Arc::clone(&writer),
            Arc::clone(&state),
        ));
        *state.lock() = ChannelState::Running;

        debug!(destination = %key, capacity, "Started log channel");

        Self {
            key,
            capacity,
            sender: RwLock::new(Some(tx)),
            worker: Mutex::new(Some(handle)),
            writer,
            state,
        }
    }

    /// Destination key (the destination directory)
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dir(&self) -> &Path {
        Path::new(&self.key)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn state(&self) -> ChannelState {
        *self.state.lock()
    }

    /// The writer shared with the worker
    ///
    /// Holding its lock stalls the worker; outside callers should only keep it
    /// for the duration of a single operation.
    pub fn writer(&self) -> SharedWriter {
        Arc::clone(&self.writer)
    }

    /// Messages currently waiting in the queue
    pub async fn pending(&self) -> usize {
        match self.sender.read().await.as_ref() {
            Some(tx) => self.capacity - tx.capacity(),
            None => 0,
        }
    }

    /// Enqueue a line, waiting while the queue is full
    ///
    /// Fails with [`LogError::AlreadyClosed`] once `close()` has been called.
    pub async fn write(&self, msg: impl Into<String>) -> Result<()> {
        let sender = self.sender.read().await;
        match sender.as_ref() {
            Some(tx) => tx
                .send(msg.into())
                .await
                .map_err(|_| LogError::AlreadyClosed(self.key.clone())),
            None => Err(LogError::AlreadyClosed(self.key.clone())),
        }
    }

    /// Flush buffered bytes to disk, serialized against the worker
    pub async fn flush(&self) -> Result<()> {
        self.writer.lock().await.flush().await
    }

    /// Close the queue, drain it, and wait for the worker to stop
    ///
    /// Safe to call more than once; later calls wait for the first to finish.
    pub async fn close(&self) -> Result<()> {
        {
            let mut sender = self.sender.write().await;
            if sender.take().is_some() {
                let mut state = self.state.lock();
                if *state == ChannelState::Running {
                    *state = ChannelState::Draining;
                }
                debug!(destination = %self.key, "Draining log channel");
            }
        }

        let mut worker = self.worker.lock().await;
        if let Some(handle) = worker.take() {
            if let Err(e) = handle.await {
                error!(destination = %self.key, error = %e, "Log worker terminated abnormally");
                // The worker never reached its final close
                let closed = self.writer.lock().await.close().await;
                *self.state.lock() = ChannelState::Stopped;
                return closed;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for AsyncLogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLogChannel")
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .field("state", &self.state())
            .finish()
    }
}

async fn run_worker(
    key: String,
    mut rx: mpsc::Receiver<String>,
    writer: SharedWriter,
    state: Arc<StateLock<ChannelState>>,
) {
    rotate(&key, &writer).await;

    let mut ticker = interval_at(Instant::now() + FLUSH_INTERVAL, FLUSH_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => {
                    let mut writer = writer.lock().await;
                    // Rotation is checked before every write, not only on the tick
                    if let Err(e) = writer.ensure_current_file(Local::now()).await {
                        warn!(destination = %key, error = %e, "Log file rotation failed");
                    }
                    if let Err(e) = writer.write_line(&msg).await {
                        warn!(destination = %key, error = %e, "Dropped log line");
                    }
                }
                // Sender gone and queue empty
                None => break,
            },
            _ = ticker.tick() => {
                if let Err(e) = writer.lock().await.flush().await {
                    warn!(destination = %key, error = %e, "Periodic log flush failed");
                }
                rotate(&key, &writer).await;
            }
        }
    }

    if let Err(e) = writer.lock().await.close().await {
        warn!(destination = %key, error = %e, "Final log flush failed");
    }
    *state.lock() = ChannelState::Stopped;
    debug!(destination = %key, "Log channel stopped");
}

async fn rotate(key: &str, writer: &SharedWriter) {
    if let Err(e) = writer.lock().await.ensure_current_file(Local::now()).await {
        warn!(destination = %key, error = %e, "Log file rotation failed");
    }
}
