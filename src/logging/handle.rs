use std::time::{Duration, Instant};

use tracing_appender::non_blocking::WorkerGuard;

/// Порог, после которого shutdown считается медленным.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle для управления lifecycle логирования.
///
/// Держит guard файлового sink: пока handle жив, фоновый writer
/// продолжает сбрасывать буфер на диск.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    /// Пишет ли handle в файловый sink.
    pub fn file_sink_active(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Graceful shutdown: дожидается записи хвоста файлового лога.
    pub fn shutdown(mut self) {
        tracing::info!(
            file_sink = self.file_sink_active(),
            "Initiating logging shutdown"
        );

        let start = Instant::now();
        drop(self.file_guard.take());
        let elapsed = start.elapsed();

        if elapsed > FLUSH_TIMEOUT {
            eprintln!(
                "WARNING: Logging shutdown took {}ms (timeout: {}ms)",
                elapsed.as_millis(),
                FLUSH_TIMEOUT.as_millis()
            );
        }
    }
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoggingHandle")
            .field("file_sink_active", &self.file_sink_active())
            .finish()
    }
}
