use std::error::Error;

use crate::StatusCode;

/// Расширение для ошибок библиотеки (object-safe).
///
/// Предоставляет вспомогательные методы для работы с ошибками:
/// - извлечение статус-кода,
/// - безопасное сообщение для клиента,
/// - детализированное сообщение для логов.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Протокольный статус (для клиента или транспортного уровня).
    ///
    /// По умолчанию возвращает [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Безопасное сообщение для клиента.
    ///
    /// Для серверных ошибок не раскрывает детали реализации (пути файлов,
    /// сообщения ОС) и возвращает общую строку.
    fn client_message(&self) -> String {
        let code = self.status_code();
        if code.is_server_error() {
            match code {
                StatusCode::PersistenceFailure => "Failed to persist partner registry".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        }
    }

    /// Детализированное сообщение для логов.
    ///
    /// Может содержать чувствительные данные, поэтому предназначено только
    /// для внутреннего использования (логирование, отладка).
    fn log_message(&self) -> String {
        format!("{self:?}")
    }

    /// Имя типа ошибки (для логирования).
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .split("::")
            .last()
            .unwrap_or("Unknown")
            .to_string()
    }
}
