use thiserror::Error;
use zepartners_error::{ErrorExt, StatusCode};

use super::{GeometryError, SnapshotError};
use crate::registry::PartnerId;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    // ==== Validation ====
    #[error("invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("id already exists: {0}")]
    DuplicateId(PartnerId),

    #[error("document must be unique: {0}")]
    DuplicateDocument(String),

    // ==== Query outcomes ====
    #[error("partner not found: {0}")]
    NotFound(PartnerId),

    #[error("no partner covers this location ({lng}, {lat})")]
    NoCoverage { lng: f64, lat: f64 },

    // ==== Storage ====
    #[error("persistence failure: {0}")]
    Persistence(#[from] SnapshotError),
}

impl RegistryError {
    /// Validation failures are rejected before any state is touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeometry(_) | Self::DuplicateId(_) | Self::DuplicateDocument(_)
        )
    }
}

impl ErrorExt for RegistryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidGeometry(_) => StatusCode::InvalidGeometry,
            Self::DuplicateId(_) => StatusCode::DuplicateId,
            Self::DuplicateDocument(_) => StatusCode::DuplicateDocument,
            Self::NotFound(_) => StatusCode::NotFound,
            Self::NoCoverage { .. } => StatusCode::NoCoverage,
            Self::Persistence(_) => StatusCode::PersistenceFailure,
        }
    }
}
