use std::{
    net::SocketAddr,
    sync::{mpsc, Arc},
    time::Duration,
};

use anyhow::Result;
use serde_json::{json, Value};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    task::JoinHandle,
    time::timeout,
};
use zepartners::{
    error::SnapshotResult, network::ShutdownHandle, MemorySnapshot, Partner, PartnerRegistry,
    Response, Server, ServerConfig, SnapshotStore,
};

mod generators;
use generators::*;

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Result<Self> {
        let (reader, writer) = TcpStream::connect(addr).await?.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    async fn send_raw(
        &mut self,
        line: &str,
    ) -> Result<Response> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        let mut buf = String::new();
        self.reader.read_line(&mut buf).await?;
        Ok(serde_json::from_str(&buf)?)
    }

    async fn send(
        &mut self,
        request: Value,
    ) -> Result<Response> {
        self.send_raw(&request.to_string()).await
    }
}

/// Снапшот, запись в который ждёт разрешения от теста.
struct GatedSnapshot {
    inner: MemorySnapshot,
    started: parking_lot::Mutex<mpsc::Sender<()>>,
    release: parking_lot::Mutex<mpsc::Receiver<()>>,
}

impl SnapshotStore for GatedSnapshot {
    fn read(&self) -> SnapshotResult<Option<Vec<u8>>> {
        self.inner.read()
    }

    fn write(
        &self,
        partners: &[&Partner],
    ) -> SnapshotResult<()> {
        let _ = self.started.lock().send(());
        let _ = self.release.lock().recv();
        self.inner.write(partners)
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

async fn start(config: ServerConfig) -> Result<(SocketAddr, ShutdownHandle, JoinHandle<Result<()>>)> {
    start_with(PartnerRegistry::in_memory(), config).await
}

async fn start_with(
    registry: PartnerRegistry,
    config: ServerConfig,
) -> Result<(SocketAddr, ShutdownHandle, JoinHandle<Result<()>>)> {
    let registry = Arc::new(registry);
    let server = Server::bind(config, registry).await?;
    let addr = server.local_addr()?;
    let shutdown = server.shutdown_handle();
    let task = tokio::spawn(server.run());
    Ok((addr, shutdown, task))
}

fn local_config() -> ServerConfig {
    ServerConfig {
        listen_address: "127.0.0.1:0".into(),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn register_get_nearest_health() -> Result<()> {
    let (addr, shutdown, task) = start(local_config()).await?;
    let mut client = Client::connect(addr).await?;

    let resp = client
        .send(json!({"op": "register", "partner": partner_json(json!(1), "doc-1")}))
        .await?;
    assert_eq!(resp.status, 201);
    assert_eq!(resp.body, json!({"status": "created", "id": "1"}));

    let resp = client.send(json!({"op": "get", "id": 1})).await?;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["document"], json!("doc-1"));

    let resp = client.send(json!({"op": "get", "id": "1"})).await?;
    assert_eq!(resp.status, 200);

    let resp = client.send(json!({"op": "nearest", "lng": 5.0, "lat": 5.0})).await?;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["id"], json!("1"));

    let resp = client.send(json!({"op": "health"})).await?;
    assert_eq!(resp.body, json!({"status": "ok", "partners_count": 1}));

    shutdown.shutdown();
    task.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn errors_map_to_status() -> Result<()> {
    let (addr, shutdown, task) = start(local_config()).await?;
    let mut client = Client::connect(addr).await?;

    client
        .send(json!({"op": "register", "partner": partner_json(json!("a"), "doc")}))
        .await?;

    let dup_id = client
        .send(json!({"op": "register", "partner": partner_json(json!("a"), "doc-2")}))
        .await?;
    assert_eq!(dup_id.status, 400);
    assert_eq!(dup_id.body["code"], json!(2011));

    let dup_doc = client
        .send(json!({"op": "register", "partner": partner_json(json!("b"), "doc")}))
        .await?;
    assert_eq!(dup_doc.status, 400);
    assert_eq!(dup_doc.body["code"], json!(2012));

    let mut bad = partner_json(json!("c"), "doc-c");
    bad["coverageArea"] = json!({"type": "Point", "coordinates": [0, 0]});
    let bad_geo = client.send(json!({"op": "register", "partner": bad})).await?;
    assert_eq!(bad_geo.status, 400);
    assert_eq!(bad_geo.body["code"], json!(2010));

    let missing = client.send(json!({"op": "get", "id": "zz"})).await?;
    assert_eq!(missing.status, 404);

    let uncovered = client
        .send(json!({"op": "nearest", "lng": 50.0, "lat": 50.0}))
        .await?;
    assert_eq!(uncovered.status, 404);
    assert_eq!(uncovered.body["code"], json!(2013));

    let garbage = client.send_raw("this is not json").await?;
    assert_eq!(garbage.status, 400);

    // Соединение остаётся рабочим после ошибок.
    let health = client.send(json!({"op": "health"})).await?;
    assert_eq!(health.body["partners_count"], json!(1));

    shutdown.shutdown();
    task.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn oversized_request_is_rejected() -> Result<()> {
    let (addr, shutdown, task) = start(ServerConfig {
        max_request_bytes: 64,
        ..local_config()
    })
    .await?;
    let mut client = Client::connect(addr).await?;

    let long = format!(r#"{{"op":"get","id":"{}"}}"#, "x".repeat(200));
    let resp = client.send_raw(&long).await?;
    assert_eq!(resp.status, 413);
    assert_eq!(resp.body["code"], json!(8007));

    let resp = client.send(json!({"op": "health"})).await?;
    assert_eq!(resp.status, 200);

    // Лимит относится к самому запросу, без завершающего `\n`.
    let exact = format!(r#"{{"op":"get","id":"{}"}}"#, "x".repeat(44));
    assert_eq!(exact.len(), 64);
    let resp = client.send_raw(&exact).await?;
    assert_eq!(resp.status, 404);

    let over = format!(r#"{{"op":"get","id":"{}"}}"#, "x".repeat(45));
    let resp = client.send_raw(&over).await?;
    assert_eq!(resp.status, 413);

    shutdown.shutdown();
    task.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn readers_waiting_on_slow_write_do_not_stall_server() -> Result<()> {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let registry = PartnerRegistry::new(Box::new(GatedSnapshot {
        inner: MemorySnapshot::new(),
        started: parking_lot::Mutex::new(started_tx),
        release: parking_lot::Mutex::new(release_rx),
    }));
    let (addr, shutdown, task) = start_with(registry, local_config()).await?;

    let mut writer = Client::connect(addr).await?;
    let register = tokio::spawn(async move {
        writer
            .send(json!({"op": "register", "partner": partner_json(json!(1), "doc-1")}))
            .await
    });
    tokio::task::spawn_blocking(move || started_rx.recv()).await??;

    // Больше ждущих читателей, чем рабочих потоков runtime.
    let mut readers = Vec::new();
    for _ in 0..6 {
        let mut client = Client::connect(addr).await?;
        readers.push(tokio::spawn(async move {
            client.send(json!({"op": "nearest", "lng": 5.0, "lat": 5.0})).await
        }));
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Запрос, не требующий реестра, обслуживается, пока запись висит.
    let mut probe = Client::connect(addr).await?;
    let garbage = timeout(Duration::from_secs(5), probe.send_raw("not json")).await??;
    assert_eq!(garbage.status, 400);

    release_tx.send(())?;
    assert_eq!(register.await??.status, 201);
    for reader in readers {
        assert_eq!(reader.await??.status, 200);
    }

    shutdown.shutdown();
    task.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_clients_see_consistent_state() -> Result<()> {
    let (addr, shutdown, task) = start(local_config()).await?;

    let mut handles = Vec::new();
    for i in 0..8 {
        handles.push(tokio::spawn(async move {
            let mut client = Client::connect(addr).await?;
            let partner = serde_json::to_value(square_partner(
                &format!("p{i}"),
                &format!("doc-{i}"),
                0.0,
                10.0,
                (i as f64, i as f64),
            ))?;
            let resp = client.send(json!({"op": "register", "partner": partner})).await?;
            anyhow::ensure!(resp.status == 201, "register failed: {resp:?}");

            let resp = client.send(json!({"op": "nearest", "lng": 1.0, "lat": 1.0})).await?;
            anyhow::ensure!(resp.status == 200, "nearest failed: {resp:?}");
            Ok::<(), anyhow::Error>(())
        }));
    }
    for h in handles {
        h.await??;
    }

    let mut client = Client::connect(addr).await?;
    let health = client.send(json!({"op": "health"})).await?;
    assert_eq!(health.body["partners_count"], json!(8));

    let nearest = client.send(json!({"op": "nearest", "lng": 1.0, "lat": 1.0})).await?;
    assert_eq!(nearest.body["id"], json!("p1"));

    shutdown.shutdown();
    task.await??;
    Ok(())
}
