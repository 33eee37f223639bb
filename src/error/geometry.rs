use thiserror::Error;
use zepartners_error::{ErrorExt, StatusCode};

pub type GeometryResult<T> = Result<T, GeometryError>;

/// Malformed or wrong-kind geometry payload.
///
/// `field` names the partner attribute the geometry came from
/// (`coverageArea` or `address`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{field} must be a GeoJSON object with a \"type\" member")]
    MissingType { field: &'static str },

    #[error("{field} must be {expected}, got {found}")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("{field} has invalid coordinates: {reason}")]
    InvalidCoordinates { field: &'static str, reason: String },

    #[error("{field} geometry is empty")]
    Empty { field: &'static str },
}

impl GeometryError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingType { field }
            | Self::WrongKind { field, .. }
            | Self::InvalidCoordinates { field, .. }
            | Self::Empty { field } => field,
        }
    }

    pub(crate) fn coords(
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidCoordinates {
            field,
            reason: reason.into(),
        }
    }
}

impl ErrorExt for GeometryError {
    fn status_code(&self) -> StatusCode {
        StatusCode::InvalidGeometry
    }
}
