//! Error taxonomy. Gameplay rejections are outcomes, not errors; these cover
//! persistence, configuration and action parsing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no save found in slot {slot:?}")]
    NotFound { slot: String },
    #[error("save in slot {slot:?} is empty")]
    Empty { slot: String },
    #[error("save in slot {slot:?} is corrupt: {reason}")]
    Corrupt { slot: String, reason: String },
    #[error("failed to access save slot {slot:?}: {reason}")]
    Io { slot: String, reason: String },
    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PersistError {
    pub(crate) fn corrupt(slot: &str, reason: impl Into<String>) -> Self {
        PersistError::Corrupt {
            slot: slot.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(slot: &str, err: &io::Error) -> Self {
        PersistError::Io {
            slot: slot.to_string(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read engine config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("label table {table:?} is invalid: {reason}")]
    LabelTable { table: &'static str, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown action {0:?}")]
pub struct UnknownAction(pub String);
