//! Facade-to-core seam
//!
//! The facade formats lines and hands them to a `LineSink`; the sink only
//! persists them. `DestinationRegistry` is the production implementation,
//! tests substitute in-memory sinks.

use async_trait::async_trait;

use crate::Result;

#[async_trait]
pub trait LineSink: Send + Sync {
    /// Persist `line` (a newline is appended) to the destination named by
    /// `destination`, a relative path such as `record/orders`
    async fn write_line(&self, destination: &str, line: String) -> Result<()>;

    /// Best-effort flush of every open destination
    async fn flush(&self) -> Result<()>;

    /// Drain and stop every destination; idempotent
    async fn close(&self) -> Result<()>;

    /// Create a destination's directory ahead of the first write
    async fn ensure_destination(&self, destination: &str) -> Result<()>;
}
