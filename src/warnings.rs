//! Non-fatal persistence problems.
//!
//! Reading and copying data files degrades instead of failing: an unreadable
//! collection is treated as empty, a file that cannot be copied is skipped.
//! Each degradation is reported as a [`Warning`] so the caller can decide
//! whether to tell the operator.

use std::path::PathBuf;

/// A persistence problem that was worked around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A data file exists but could not be read or parsed; its collection
    /// was loaded as empty.
    UnreadableDataFile { path: PathBuf, reason: String },
    /// The config file could not be read or parsed; defaults were used.
    UnreadableConfig { path: PathBuf, reason: String },
    /// A data file could not be copied while switching data directories.
    CopyFailed { path: PathBuf, reason: String },
}

/// Format a warning for display.
pub fn format_warning(warning: &Warning) -> String {
    match warning {
        Warning::UnreadableDataFile { path, reason } => {
            format!(
                "Warning: could not read {} ({}) - starting with an empty collection",
                path.display(),
                reason
            )
        }
        Warning::UnreadableConfig { path, reason } => {
            format!(
                "Warning: could not read config {} ({}) - using defaults",
                path.display(),
                reason
            )
        }
        Warning::CopyFailed { path, reason } => {
            format!("Warning: could not copy {} ({})", path.display(), reason)
        }
    }
}

/// Print warnings to stderr.
pub fn report(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{}", format_warning(warning));
    }
}
