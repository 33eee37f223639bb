use thiserror::Error;
use zepartners_error::{ErrorExt, StatusCode};

/// A request line the server could not turn into an operation.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is not valid UTF-8")]
    InvalidUtf8,

    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("request exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request handler failed: {0}")]
    Internal(String),
}

impl ErrorExt for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUtf8 => StatusCode::InvalidUtf8,
            Self::Malformed(_) => StatusCode::ParseError,
            Self::TooLarge { .. } => StatusCode::SizeLimit,
            Self::Internal(_) => StatusCode::Internal,
        }
    }
}
