use std::{fs, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::LoggingError;

/// Формат консольного вывода.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// Настройки консольного sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_line_numbers: bool,
    /// Писать в stderr вместо stdout.
    pub to_stderr: bool,
}

/// Настройки файлового sink (ежедневная ротация).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub filename: String,
}

/// Конфигурация логирования.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень для событий сервиса (`trace`..`error`).
    pub level: String,
    /// Уровень для сторонних crate'ов.
    pub dependency_level: String,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_line_numbers: false,
            to_stderr: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("logs"),
            filename: "zepartners.log".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dependency_level: "warn".to_string(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl LoggingConfig {
    /// Проверяет уровни и имя файла.
    pub fn validate(&self) -> Result<(), LoggingError> {
        for level in [&self.level, &self.dependency_level] {
            LevelFilter::from_str(level)
                .map_err(|_| LoggingError::InvalidLevel(level.clone()))?;
        }
        if self.file.enabled && self.file.filename.trim().is_empty() {
            return Err(LoggingError::InvalidConfig(
                "file.filename must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Директива для `EnvFilter`, например `warn,zepartners=info`.
    pub fn build_filter_directive(&self) -> String {
        format!(
            "{},{}={}",
            self.dependency_level,
            env!("CARGO_CRATE_NAME"),
            self.level
        )
    }

    /// Создаёт каталог логов, если включён файловый sink.
    pub fn ensure_log_dir(&self) -> Result<(), LoggingError> {
        if self.file.enabled {
            fs::create_dir_all(&self.file.dir).map_err(|source| LoggingError::LogDir {
                path: self.file.dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
