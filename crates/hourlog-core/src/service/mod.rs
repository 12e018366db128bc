//! Core services
//!
//! Path resolution, the buffered file writer, per-destination channels, and
//! the registry that ties them together.

mod destination_registry;
mod file_writer;
mod log_channel;
mod path_template;

pub use destination_registry::DestinationRegistry;
pub use file_writer::BufferedFileWriter;
pub use log_channel::{AsyncLogChannel, ChannelState, SharedWriter, FLUSH_INTERVAL};
pub use path_template::{ensure_dir, PathTemplate};
