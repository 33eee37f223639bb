#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ErrorExt;

/// Тело ответа с ошибкой для транспортного уровня.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: u32,
    pub detail: String,
}

impl ErrorResponse {
    /// Строит тело ответа из любой ошибки с `ErrorExt`.
    pub fn from_error<E: ErrorExt + ?Sized>(err: &E) -> Self {
        Self {
            code: err.status_code().code(),
            detail: err.client_message(),
        }
    }

    /// HTTP-статус, соответствующий коду.
    pub fn http_status(&self) -> u16 {
        crate::StatusCode::from_u32(self.code)
            .map(|c| c.http_status())
            .unwrap_or(500)
    }
}
