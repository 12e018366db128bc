//! Path template resolution for rotated log files
//!
//! Templates come in two flavours:
//! - strftime patterns (anything containing `%`): `%Y-%m/%Y-%m-%d-%H.log`
//! - reference-time layouts: `2006-01/2006-01-02/2006-01-02-15.log`, where the
//!   fields of the reference moment (Mon Jan 2 15:04:05 2006) stand for the
//!   corresponding calendar fields
//!
//! Both compile to one strftime format, checked once at parse time.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{LogError, Result, DEFAULT_SUB_REL_PATH};

/// Reference-layout tokens, longest first where they share a prefix
const LAYOUT_TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Jan", "%b"),
    ("Monday", "%A"),
    ("Mon", "%a"),
    ("2006", "%Y"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
    ("PM", "%p"),
];

/// Specifiers that change at least once an hour
const HOURLY_SPECIFIERS: &[&str] = &["%H", "%I", "%k", "%l", "%M", "%S", "%T", "%R", "%s"];

/// A compiled rotation path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    format: String,
}

impl PathTemplate {
    /// Compile a template, rejecting empty or malformed patterns
    pub fn parse(template: &str) -> Result<Self> {
        let trimmed = template.trim();
        if trimmed.is_empty() {
            return Err(invalid(template, "template is empty"));
        }

        let format = if trimmed.contains('%') {
            trimmed.to_string()
        } else {
            translate_layout(trimmed)
        };

        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid(template, "unsupported date/time specifier"));
        }

        let path = Path::new(&format);
        if path.is_absolute() {
            return Err(invalid(template, "template must be a relative path"));
        }
        if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            return Err(invalid(template, "template must not contain '..'"));
        }

        Ok(Self {
            source: template.to_string(),
            format,
        })
    }

    /// The template as configured
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled strftime format
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Whether consecutive hours resolve to different files
    pub fn is_hourly(&self) -> bool {
        HOURLY_SPECIFIERS.iter().any(|spec| self.format.contains(spec))
    }

    /// Relative path for `at`
    pub fn relative_path<Tz>(&self, at: &DateTime<Tz>) -> PathBuf
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        PathBuf::from(at.format(&self.format).to_string())
    }

    /// Absolute path for `at` under `base_dir`; pure, touches no filesystem
    pub fn resolve<Tz>(&self, base_dir: &Path, at: &DateTime<Tz>) -> PathBuf
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        base_dir.join(self.relative_path(at))
    }
}

impl Default for PathTemplate {
    /// The hourly layout from [`DEFAULT_SUB_REL_PATH`]
    fn default() -> Self {
        Self {
            source: DEFAULT_SUB_REL_PATH.to_string(),
            format: translate_layout(DEFAULT_SUB_REL_PATH),
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Create `dir` and its parents; succeeds if it already exists
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| LogError::DirectoryCreate {
            path: dir.to_path_buf(),
            source,
        })
}

fn translate_layout(layout: &str) -> String {
    let mut format = String::with_capacity(layout.len() * 2);
    let mut rest = layout;

    'scan: while !rest.is_empty() {
        for (token, spec) in LAYOUT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                format.push_str(spec);
                rest = tail;
                continue 'scan;
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            format.push(c);
        }
        rest = chars.as_str();
    }

    format
}

fn invalid(template: &str, reason: &str) -> LogError {
    LogError::InvalidTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    }
}
