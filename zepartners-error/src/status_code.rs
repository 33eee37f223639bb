use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок реестра партнёров.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных (валидация, поиск)
/// - 5xxx: Хранилище (snapshot)
/// - 8xxx: Протокольные ошибки
///
/// # Реализация:
/// - `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`
///   (полезно для wire-protocol).
/// - опционально: `strum` для `AsRefStr`/`EnumIter` (feature = "strum").
/// - опционально: `serde_repr` для сериализации в виде числового значения
///   (feature = "serde").
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,
    Created = 1,

    // === 1xxx: Общие ошибки ===
    Internal = 1003,

    // === 2xxx: Ошибки данных ===
    NotFound = 2000,
    InvalidGeometry = 2010,
    DuplicateId = 2011,
    DuplicateDocument = 2012,
    NoCoverage = 2013,

    // === 5xxx: Хранилище ===
    SerializationFailed = 5003,
    PersistenceFailure = 5008,

    // === 8xxx: Протокол ===
    InvalidUtf8 = 8004,
    SizeLimit = 8007,
    ParseError = 8009,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Пытается получить вариант `StatusCode` из `u32`.
    ///
    /// Использует `TryFrom<u32>` из `num_enum`; возвращает `None`, если
    /// значение не соответствует ни одному варианту.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Является ли код ошибкой со стороны клиента: проблема в запросе или
    /// данных.
    ///
    /// Клиентские ошибки лежат в диапазоне `2xxx` и `8xxx`.
    pub fn is_client_error(&self) -> bool {
        matches!(self.code(), 2000..=2999 | 8000..=8999)
    }

    /// Является ли код ошибкой сервера: внутренняя или инфраструктурная
    /// ошибка.
    pub fn is_server_error(&self) -> bool {
        matches!(self.code(), 1000..=1999 | 5000..=7999)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success | Self::Created => LogLevel::Trace,
            Self::NotFound | Self::NoCoverage => LogLevel::Debug,
            Self::InvalidGeometry
            | Self::DuplicateId
            | Self::DuplicateDocument => LogLevel::Info,
            Self::Internal | Self::PersistenceFailure => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }

    /// HTTP-статус, соответствующий коду статуса.
    ///
    /// Используется транспортным слоем для ответа клиенту.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Success => 200,
            Self::Created => 201,
            Self::NotFound | Self::NoCoverage => 404,
            Self::InvalidGeometry
            | Self::DuplicateId
            | Self::DuplicateDocument
            | Self::InvalidUtf8
            | Self::ParseError => 400,
            Self::SizeLimit => 413,
            _ => 500,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        // Если включён feature "strum", используем human-readable имя (AsRefStr).
        // Иначе Debug-имя.
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
