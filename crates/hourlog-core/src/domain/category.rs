//! Log categories and their on-disk sub-directories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a persisted log line
///
/// Each category owns a sub-directory under the root log dir; the caller's
/// log type adds one more level (`<root>/<category>/<type>/...`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Access,
    Error,
    Warning,
    Notice,
    Record,
    Debug,
    Stat,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Access,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Record,
        Self::Debug,
        Self::Stat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Notice => "notice",
            Self::Record => "record",
            Self::Debug => "debug",
            Self::Stat => "stat",
        }
    }

    /// Relative destination for a log type in this category, e.g. `record/mq_product`
    pub fn destination(&self, log_type: &str) -> String {
        let log_type = log_type.trim_matches('/');
        if log_type.is_empty() {
            self.as_str().to_string()
        } else {
            format!("{}/{}", self.as_str(), log_type)
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
