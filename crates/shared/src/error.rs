use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown to users whenever a dataset cannot be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorKind {
    Transport,
    Status,
    Malformed,
    Io,
    Interrupted,
}

/// Failure while fetching or decoding a dataset.
///
/// Cloneable so one failed load can be handed to every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("request for '{location}' failed: {message}")]
    Transport { location: String, message: String },
    #[error("'{location}' answered with status {status}")]
    Status { location: String, status: u16 },
    #[error("'{location}' is not a JSON array of records: {message}")]
    Malformed { location: String, message: String },
    #[error("failed to read '{location}': {message}")]
    Io { location: String, message: String },
    #[error("load of '{location}' was interrupted: {message}")]
    Interrupted { location: String, message: String },
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            Self::Transport { .. } => LoadErrorKind::Transport,
            Self::Status { .. } => LoadErrorKind::Status,
            Self::Malformed { .. } => LoadErrorKind::Malformed,
            Self::Io { .. } => LoadErrorKind::Io,
            Self::Interrupted { .. } => LoadErrorKind::Interrupted,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Self::Transport { location, .. }
            | Self::Status { location, .. }
            | Self::Malformed { location, .. }
            | Self::Io { location, .. }
            | Self::Interrupted { location, .. } => location,
        }
    }

    pub fn user_message(&self) -> &'static str {
        LOAD_ERROR_MESSAGE
    }
}
