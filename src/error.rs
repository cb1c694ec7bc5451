//! Error types for assignmate
//!
//! Every failure maps to a process exit code:
//! - 2: the user can fix it (bad input, unknown or ambiguous id, declined prompt)
//! - 4: something underneath failed (data directory, JSON/TOML, lock, notifier)

use std::path::PathBuf;

use thiserror::Error;

pub mod exit_codes {
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Assignment not found: {0}")]
    AssignmentNotFound(String),

    #[error("Ambiguous assignment id '{prefix}' matches {matches} assignments")]
    AmbiguousId { prefix: String, matches: usize },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Data directory I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Assignment data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config.toml could not be parsed: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config.toml could not be written: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Timed out waiting for lock {0}")]
    LockFailed(PathBuf),

    #[error("No data directory could be determined; pass --data-dir")]
    NoDataDir,

    #[error("Notification failed: {0}")]
    Notification(String),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        if self.is_user_error() {
            exit_codes::USER_ERROR
        } else {
            exit_codes::OPERATION_FAILED
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::InvalidConfig(_)
                | Error::AssignmentNotFound(_)
                | Error::AmbiguousId { .. }
                | Error::Cancelled(_)
        )
    }

    /// Structured fields for the JSON error envelope, when the variant has any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::AssignmentNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::AmbiguousId { prefix, matches } => Some(serde_json::json!({
                "prefix": prefix,
                "matches": matches,
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.display().to_string(),
            })),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
