use std::{io, path::PathBuf};

use thiserror::Error;
use zepartners_error::{ErrorExt, StatusCode};

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Failure to read or write the durable partner snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error on snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Snapshot store unavailable: {0}")]
    Unavailable(String),
}

impl SnapshotError {
    pub(crate) fn io(
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl ErrorExt for SnapshotError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Serde(_) => StatusCode::SerializationFailed,
            Self::Io { .. } | Self::Unavailable(_) => StatusCode::PersistenceFailure,
        }
    }
}
