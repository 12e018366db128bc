//! Destination registry - one log channel per destination directory

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::log_channel::AsyncLogChannel;
use super::path_template::{ensure_dir, PathTemplate};
use crate::{LineSink, LogConfig, LogError, Result};

/// Lazily created channels, keyed by destination directory
#[derive(Debug)]
pub struct DestinationRegistry {
    root: PathBuf,
    template: PathTemplate,
    capacity: usize,
    destinations: RwLock<Destinations>,
}

#[derive(Debug, Default)]
struct Destinations {
    channels: HashMap<String, Arc<AsyncLogChannel>>,
    closed: bool,
}

impl DestinationRegistry {
    /// Build a registry from a config snapshot
    pub fn new(config: &LogConfig) -> Result<Self> {
        let template = PathTemplate::parse(&config.sub_rel_path)?;
        Ok(Self::with_template(
            config.dir.clone(),
            template,
            config.queue_capacity(),
        ))
    }

    pub fn with_template(root: impl Into<PathBuf>, template: PathTemplate, capacity: usize) -> Self {
        if !template.is_hourly() {
            warn!(
                template = %template,
                "Path template has no hour field; hourly rotations will reopen the same file"
            );
        }

        Self {
            root: root.into(),
            template,
            capacity,
            destinations: RwLock::new(Destinations::default()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Directory for a relative destination such as `record/orders`
    ///
    /// Only plain path segments are kept, so a destination can never point
    /// outside the root.
    pub fn destination_dir(&self, destination: &str) -> PathBuf {
        Path::new(destination)
            .components()
            .filter_map(|c| match c {
                Component::Normal(segment) => Some(segment),
                _ => None,
            })
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }

    /// Get the channel for a destination, creating it on first use
    pub async fn get_or_create(&self, destination: &str) -> Result<Arc<AsyncLogChannel>> {
        let dir = self.destination_dir(destination);
        let key = dir.to_string_lossy().into_owned();

        // Fast path: channel exists
        {
            let destinations = self.destinations.read().await;
            if destinations.closed {
                return Err(LogError::AlreadyClosed(key));
            }
            if let Some(channel) = destinations.channels.get(&key) {
                return Ok(Arc::clone(channel));
            }
        }

        // Slow path: create it
        let mut destinations = self.destinations.write().await;
        if destinations.closed {
            return Err(LogError::AlreadyClosed(key));
        }

        // Double-check (another task might have created it)
        if let Some(channel) = destinations.channels.get(&key) {
            return Ok(Arc::clone(channel));
        }

        let channel = Arc::new(AsyncLogChannel::spawn(
            dir,
            self.template.clone(),
            self.capacity,
        ));
        destinations.channels.insert(key, Arc::clone(&channel));
        Ok(channel)
    }

    /// Enqueue a line for a destination
    pub async fn write(&self, destination: &str, line: impl Into<String>) -> Result<()> {
        self.get_or_create(destination).await?.write(line).await
    }

    /// Create a destination directory up front
    pub async fn ensure_dir(&self, destination: &str) -> Result<()> {
        ensure_dir(&self.destination_dir(destination)).await
    }

    /// Number of live destinations
    pub async fn len(&self) -> usize {
        self.destinations.read().await.channels.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_closed(&self) -> bool {
        self.destinations.read().await.closed
    }

    /// Destination keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .destinations
            .read()
            .await
            .channels
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Flush every destination
    ///
    /// All destinations are attempted; the first error is returned.
    pub async fn flush_all(&self) -> Result<()> {
        let channels: Vec<Arc<AsyncLogChannel>> = {
            let destinations = self.destinations.read().await;
            destinations.channels.values().cloned().collect()
        };

        let mut first_error = None;
        for channel in channels {
            if let Err(e) = channel.flush().await {
                warn!(destination = %channel.key(), error = %e, "Failed to flush log destination");
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Stop accepting destinations, then drain and stop every channel
    ///
    /// Returns once every worker has terminated. Later calls are no-ops.
    pub async fn close_all(&self) -> Result<()> {
        let channels: Vec<Arc<AsyncLogChannel>> = {
            let mut destinations = self.destinations.write().await;
            if destinations.closed {
                return Ok(());
            }
            destinations.closed = true;
            destinations.channels.drain().map(|(_, c)| c).collect()
        };

        let count = channels.len();
        debug!(count, "Closing log destinations");

        let results = join_all(channels.iter().map(|c| c.close())).await;

        let mut first_error = None;
        for (channel, result) in channels.iter().zip(results) {
            if let Err(e) = result {
                warn!(destination = %channel.key(), error = %e, "Failed to close log destination");
                first_error.get_or_insert(e);
            }
        }

        info!(count, root = ?self.root, "Closed log destinations");
        first_error.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl LineSink for DestinationRegistry {
    async fn write_line(&self, destination: &str, line: String) -> Result<()> {
        self.write(destination, line).await
    }

    async fn flush(&self) -> Result<()> {
        self.flush_all().await
    }

    async fn close(&self) -> Result<()> {
        self.close_all().await
    }

    async fn ensure_destination(&self, destination: &str) -> Result<()> {
        self.ensure_dir(destination).await
    }
}
