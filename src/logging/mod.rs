pub mod config;
mod filters;
mod formatter;
pub mod handle;
pub mod sinks;

pub use config::{ConsoleConfig, FileConfig, LogFormat, LoggingConfig};
pub use handle::LoggingHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::LoggingError;

/// Инициализация логирования с конфигурацией.
///
/// Устанавливает глобальный subscriber: `EnvFilter`, консольный layer и,
/// если включён, файловый layer с ежедневной ротацией.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingHandle, LoggingError> {
    config.validate()?;
    config.ensure_log_dir()?;

    let env_filter = filters::build_filter_from_config(config);
    let mut layers = Vec::new();

    if let Some(console_layer) = sinks::console::layer_with_config(config) {
        layers.push(console_layer);
    }

    let file_guard = match sinks::file::layer_with_config(config) {
        Some((file_layer, guard)) => {
            layers.push(file_layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        console_format = ?config.console.format,
        file_enabled = config.file.enabled,
        log_dir = %config.file.dir.display(),
        "Logging system initialized"
    );

    Ok(LoggingHandle::new(file_guard))
}
