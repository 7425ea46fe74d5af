//! Error type for lfr commands.
//!
//! [CmdError] is what every command evaluation returns when it fails. None of these errors are
//! fatal: the application state stores the message and keeps running.
//!
//! Filesystem helpers in [crate::core::fm] keep returning plain [std::io::Result] and are
//! converted at the command boundary.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CmdError {
    #[error("command not found: {0}")]
    UnknownCommand(String),

    #[error("ambiguous command: {name} (candidates: {})", candidates.join(", "))]
    AmbiguousCommand {
        name: String,
        candidates: Vec<String>,
    },

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("{option}: {reason}")]
    InvalidOptionValue { option: String, reason: String },

    #[error("{}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bad pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("{failed} of {total} paths could not be scanned")]
    PartialScan { failed: usize, total: usize },

    #[error("shell: {0}")]
    Shell(String),

    #[error("{0}: no command parser attached")]
    NoParser(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

impl CmdError {
    /// Shorthand for an [CmdError::InvalidOptionValue].
    pub fn invalid_value(option: &str, reason: impl Into<String>) -> Self {
        CmdError::InvalidOptionValue {
            option: option.to_string(),
            reason: reason.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CmdError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// True for the errors caused by a mistyped command or option name.
    pub fn is_unknown(&self) -> bool {
        matches!(
            self,
            CmdError::UnknownCommand(_) | CmdError::UnknownOption(_)
        )
    }
}
