//! Durable partner snapshot.
//!
//! The snapshot is a JSON array of partner records in registration order.
//! It is rewritten in full after every successful registration.

use std::{
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::warn;

use super::{Partner, PartnerId};
use crate::error::{GeometryError, SnapshotError, SnapshotResult};

/// Durable storage for the full partner set.
pub trait SnapshotStore: Send + Sync {
    /// Raw snapshot contents; `None` when nothing was persisted yet.
    fn read(&self) -> SnapshotResult<Option<Vec<u8>>>;

    /// Replaces the stored snapshot with `partners`.
    fn write(
        &self,
        partners: &[&Partner],
    ) -> SnapshotResult<()>;

    /// Human readable location, for logs.
    fn describe(&self) -> String;
}

/// Something skipped or degraded while loading a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadDiagnostic {
    /// The snapshot as a whole could not be decoded; the registry starts empty.
    MalformedSnapshot { reason: String },
    /// Record at `position` is not a partner record and was dropped.
    MalformedRecord { position: usize, reason: String },
    /// A second record with an already-loaded id was dropped.
    DuplicateRecord { position: usize, id: PartnerId },
    /// Record kept in the store but excluded from coverage matching.
    Unindexed { id: PartnerId, error: GeometryError },
}

/// Snapshot stored as a single JSON file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash never leaves a half-written snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshot {
    path: PathBuf,
}

/// In-memory snapshot store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemorySnapshot {
    contents: Mutex<Option<Vec<u8>>>,
    fail_writes: AtomicBool,
}

////////////////////////////////////////////////////////////////////////////////
// Decoding
////////////////////////////////////////////////////////////////////////////////

/// Decodes snapshot bytes, tolerating damage.
///
/// Empty input is an empty snapshot. Input that is not a JSON array yields
/// no records and a [`LoadDiagnostic::MalformedSnapshot`]. Individual
/// records that do not decode are dropped with a diagnostic.
pub fn decode_snapshot(bytes: &[u8]) -> (Vec<Partner>, Vec<LoadDiagnostic>) {
    let mut diagnostics = Vec::new();

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return (Vec::new(), diagnostics);
    }

    let items: Vec<Value> = match serde_json::from_slice(bytes) {
        Ok(items) => items,
        Err(e) => {
            diagnostics.push(LoadDiagnostic::MalformedSnapshot {
                reason: e.to_string(),
            });
            return (Vec::new(), diagnostics);
        }
    };

    let mut partners: Vec<Partner> = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Partner>(item) {
            Ok(partner) if partners.iter().any(|p| p.id == partner.id) => {
                diagnostics.push(LoadDiagnostic::DuplicateRecord {
                    position,
                    id: partner.id,
                });
            }
            Ok(partner) => partners.push(partner),
            Err(e) => diagnostics.push(LoadDiagnostic::MalformedRecord {
                position,
                reason: e.to_string(),
            }),
        }
    }

    (partners, diagnostics)
}

/// Encodes partners as the pretty-printed snapshot document.
pub fn encode_snapshot(partners: &[&Partner]) -> SnapshotResult<Vec<u8>> {
    let mut buf = serde_json::to_vec_pretty(partners)?;
    buf.push(b'\n');
    Ok(buf)
}

////////////////////////////////////////////////////////////////////////////////
// JsonFileSnapshot
////////////////////////////////////////////////////////////////////////////////

impl JsonFileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl SnapshotStore for JsonFileSnapshot {
    fn read(&self) -> SnapshotResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapshotError::io(&self.path, e)),
        }
    }

    fn write(
        &self,
        partners: &[&Partner],
    ) -> SnapshotResult<()> {
        let bytes = encode_snapshot(partners)?;
        let dir = self.parent_dir();

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SnapshotError::io(dir, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| SnapshotError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| SnapshotError::io(&self.path, e.error))?;

        // Переименование уже видно; без fsync каталога оно может не пережить сбой.
        if let Err(error) = sync_dir(dir) {
            warn!(dir = %dir.display(), %error, "Failed to fsync snapshot directory");
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Flushes directory metadata so a completed rename is durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// MemorySnapshot
////////////////////////////////////////////////////////////////////////////////

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with raw contents.
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: Mutex::new(Some(bytes.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn set_fail_writes(
        &self,
        fail: bool,
    ) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.lock().clone()
    }
}

impl SnapshotStore for MemorySnapshot {
    fn read(&self) -> SnapshotResult<Option<Vec<u8>>> {
        Ok(self.contents.lock().clone())
    }

    fn write(
        &self,
        partners: &[&Partner],
    ) -> SnapshotResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SnapshotError::Unavailable("writes disabled".into()));
        }
        let bytes = encode_snapshot(partners)?;
        *self.contents.lock() = Some(bytes);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::MalformedSnapshot { reason } => write!(f, "malformed snapshot: {reason}"),
            Self::MalformedRecord { position, reason } => {
                write!(f, "record #{position} dropped: {reason}")
            }
            Self::DuplicateRecord { position, id } => {
                write!(f, "record #{position} dropped: duplicate id {id}")
            }
            Self::Unindexed { id, error } => write!(f, "partner {id} not indexed: {error}"),
        }
    }
}
