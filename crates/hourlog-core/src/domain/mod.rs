//! Domain types shared by the core and the facade
//!
//! - Configuration snapshot (`LogConfig`)
//! - Severity levels (`Level`)
//! - Log categories (`Category`)

mod category;
pub mod config;
mod level;

pub use category::Category;
pub use config::{LogConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_SUB_REL_PATH};
pub use level::Level;
