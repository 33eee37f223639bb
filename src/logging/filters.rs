use tracing_subscriber::EnvFilter;

use super::config::LoggingConfig;

/// `RUST_LOG`, если задана; иначе директива из конфигурации.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => filter_from_directive(&config.build_filter_directive()),
    }
}

pub(crate) fn filter_from_directive(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter directive '{directive}': {e}; falling back to 'info'");
        EnvFilter::new("info")
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;

    // Буферный writer для тестов.
    #[derive(Clone, Default)]
    struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> fmt::MakeWriter<'a> for VecMakeWriter {
        type Writer = VecWriterGuard;

        fn make_writer(&'a self) -> Self::Writer {
            VecWriterGuard(self.0.clone())
        }
    }

    struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for VecWriterGuard {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_directive_falls_back() {
        assert!(EnvFilter::try_new("zepartners=loud").is_err());
        let filter = filter_from_directive("zepartners=loud");
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_filter_levels() {
        let writer = VecMakeWriter::default();
        let layer = fmt::layer()
            .with_writer(writer.clone())
            .with_filter(filter_from_directive("warn"));
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("filtered out");
            tracing::warn!("passes through");
        });

        let out = writer.0.lock().unwrap();
        let s = String::from_utf8_lossy(&out);
        assert!(s.contains("passes through"));
        assert!(!s.contains("filtered out"));
    }
}
