use std::{io, path::PathBuf};

use thiserror::Error;

/// Ошибки инициализации логирования.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Invalid logging config: {0}")]
    InvalidConfig(String),

    #[error("Failed to create log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(String),
}
