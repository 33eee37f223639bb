use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{tcp::OwnedReadHalf, TcpListener, TcpStream},
    select,
    sync::{watch, Semaphore},
    task,
};
use tracing::{debug, error, info, warn};

use super::protocol::{execute, parse_request, Request, Response};
use crate::{error::RequestError, registry::PartnerRegistry, Settings};

/// Максимальный размер одной строки запроса.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Конфигурация TCP-сервера.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_address: String,
    /// Максимальное кол-во одновременных соединений
    pub max_connections: usize,
    pub max_request_bytes: usize,
}

/// Сигнал остановки для запущенного сервера.
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<watch::Sender<bool>>);

/// TCP-сервер: один JSON-запрос на строку, один ответ на строку.
pub struct Server {
    listener: TcpListener,
    registry: Arc<PartnerRegistry>,
    config: ServerConfig,
    connections: Arc<Semaphore>,
    shutdown: Arc<watch::Sender<bool>>,
    connection_counter: Arc<AtomicU64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:8080".to_string(),
            max_connections: 100,
            max_request_bytes: MAX_REQUEST_BYTES,
        }
    }
}

impl From<&Settings> for ServerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            listen_address: settings.listen_address.clone(),
            max_connections: settings.max_connections,
            max_request_bytes: MAX_REQUEST_BYTES,
        }
    }
}

impl ShutdownHandle {
    /// Останавливает приём новых соединений.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown");
        let _ = self.0.send(true);
    }
}

impl Server {
    pub async fn bind(
        config: ServerConfig,
        registry: Arc<PartnerRegistry>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_address)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_address))?;
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            listener,
            registry,
            connections: Arc::new(Semaphore::new(config.max_connections.max(1))),
            config,
            shutdown: Arc::new(shutdown),
            connection_counter: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(self.shutdown.clone())
    }

    /// Принимает соединения до сигнала остановки.
    pub async fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        info!(
            %addr,
            max_connections = self.config.max_connections,
            partners = self.registry.len(),
            "Server listening"
        );

        let mut shutdown_rx = self.shutdown.subscribe();
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let permit = select! {
                permit = self.connections.clone().acquire_owned() => {
                    permit.context("Connection semaphore closed")?
                }
                _ = shutdown_rx.changed() => continue,
            };

            let (socket, peer) = select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                },
                _ = shutdown_rx.changed() => continue,
            };

            let id = self.connection_counter.fetch_add(1, Ordering::Relaxed) + 1;
            let registry = self.registry.clone();
            let max_bytes = self.config.max_request_bytes;
            let shutdown = self.shutdown.subscribe();

            tokio::spawn(async move {
                debug!(connection_id = id, %peer, "Connection established");
                match handle_connection(socket, registry, max_bytes, shutdown).await {
                    Ok(served) => {
                        debug!(connection_id = id, %peer, served, "Connection closed")
                    }
                    Err(e) => {
                        error!(connection_id = id, %peer, error = %e, "Connection closed with error")
                    }
                }
                drop(permit);
            });
        }

        info!("Server stopped accepting connections");
        Ok(())
    }
}

/// Обслуживает одно соединение; возвращает число обработанных запросов.
async fn handle_connection(
    socket: TcpStream,
    registry: Arc<PartnerRegistry>,
    max_bytes: usize,
    mut shutdown: watch::Receiver<bool>,
) -> Result<u64> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = Vec::with_capacity(1024);
    let mut served = 0;

    loop {
        line.clear();
        let mut limited = (&mut reader).take((max_bytes + 1) as u64);
        let n = select! {
            n = limited.read_until(b'\n', &mut line) => n?,
            _ = shutdown.changed() => return Ok(served),
        };
        if n == 0 {
            return Ok(served);
        }

        let terminated = line.last() == Some(&b'\n');
        let payload = line.len() - usize::from(terminated);
        if payload > max_bytes {
            if !terminated {
                skip_line(&mut reader).await?;
            }
            let err = RequestError::TooLarge { limit: max_bytes };
            debug!(limit = max_bytes, "Rejected oversized request");
            writer.write_all(&Response::error(&err).to_line()?).await?;
            served += 1;
            continue;
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let response = match parse_request(&line) {
            Ok(request) => dispatch(&registry, request).await,
            Err(err) => {
                debug!(error = %err, "Rejected request line");
                Response::error(&err)
            }
        };
        if !response.is_success() {
            debug!(status = response.status, "Request answered with error");
        }

        writer.write_all(&response.to_line()?).await?;
        served += 1;
    }
}

/// Отбрасывает остаток текущей строки, не буферизуя его целиком.
async fn skip_line(reader: &mut BufReader<OwnedReadHalf>) -> std::io::Result<()> {
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = buf.len();
        reader.consume(len);
    }
}

/// Every request runs on the blocking pool.
///
/// Registration holds the registry write lock across the snapshot fsync, and
/// readers waiting on that lock must not park runtime workers.
async fn dispatch(
    registry: &Arc<PartnerRegistry>,
    request: Request,
) -> Response {
    let registry = registry.clone();
    let op = request.op_name();
    match task::spawn_blocking(move || execute(&registry, request)).await {
        Ok(response) => response,
        Err(e) => {
            error!(op, error = %e, "Request task failed");
            Response::error(&RequestError::Internal(e.to_string()))
        }
    }
}
