//! Error conditions surfaced by the registry, the control units and persistence.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("intersection {0} not found")]
    IntersectionNotFound(String),

    #[error("intersection {0} already exists")]
    DuplicateIntersection(String),

    #[error("intersection {0} is already running")]
    AlreadyRunning(String),

    #[error("cannot start intersection {0}: no tokio runtime is running")]
    RuntimeUnavailable(String),

    /// A controller found an intersection without one signal per direction.
    #[error("intersection {id} has {found} usable signals, expected 4")]
    InvalidSignalConfiguration { id: String, found: usize },

    #[error("persistence failure on {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl TrafficError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        TrafficError::Persistence {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type TrafficResult<T> = Result<T, TrafficError>;
