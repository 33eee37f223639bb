use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::config::LoggingConfig;

/// Файловый layer с ежедневной ротацией и неблокирующей записью.
///
/// `WorkerGuard` должен жить до завершения процесса, иначе хвост логов
/// будет потерян.
pub fn layer_with_config<S>(
    config: &LoggingConfig
) -> Option<(Box<dyn LayerTrait<S> + Send + Sync>, WorkerGuard)>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    if !config.file.enabled {
        return None;
    }

    let appender = rolling::daily(&config.file.dir, &config.file.filename);
    let (writer, guard) = non_blocking(appender);

    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer);

    Some((Box::new(layer), guard))
}
