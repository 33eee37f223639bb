use std::io;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::Layer as LayerTrait,
    registry::LookupSpan,
};

use super::config::{ConsoleConfig, LogFormat};

/// Консольный layer в заданном формате.
///
/// Возвращается boxed trait-объект, чтобы стереть конкретный тип формата.
pub fn build_formatter<S>(console: &ConsoleConfig) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let writer = if console.to_stderr {
        BoxMakeWriter::new(io::stderr)
    } else {
        BoxMakeWriter::new(io::stdout)
    };

    let base = fmt::layer()
        .with_writer(writer)
        .with_ansi(console.with_ansi && console.format != LogFormat::Json)
        .with_target(console.with_target)
        .with_thread_ids(console.with_thread_ids)
        .with_line_number(console.with_line_numbers);

    match console.format {
        LogFormat::Json => Box::new(base.json().with_current_span(true)),
        LogFormat::Pretty => Box::new(base.pretty().with_span_events(FmtSpan::CLOSE)),
        LogFormat::Compact => Box::new(base.compact()),
    }
}
