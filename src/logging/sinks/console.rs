use tracing_subscriber::{layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::{config::LoggingConfig, formatter};

/// Console layer, если он включён.
pub fn layer_with_config<S>(config: &LoggingConfig) -> Option<Box<dyn LayerTrait<S> + Send + Sync>>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    config
        .console
        .enabled
        .then(|| formatter::build_formatter(&config.console))
}
