use std::{collections::HashMap, path::Path};

use geo::Point;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::{
    decode_snapshot, matching::select_nearest, CoverageShape, JsonFileSnapshot, LoadDiagnostic,
    MemorySnapshot, Partner, PartnerId, SnapshotStore,
};
use crate::{
    error::{RegistryError, RegistryResult},
    index::{CoverageIndex, IndexStats},
};

/// A stored partner together with its parsed geometry.
///
/// `shape` is `None` for records loaded from a snapshot whose geometry no
/// longer parses; such records are readable but never matched.
#[derive(Debug, Clone)]
struct Entry {
    partner: Partner,
    shape: Option<CoverageShape>,
}

/// Store and index, always mutated together under one lock.
#[derive(Debug, Default)]
struct RegistryState {
    /// Records in registration order.
    entries: Vec<Entry>,
    by_id: HashMap<PartnerId, usize>,
    index: CoverageIndex,
}

/// The partner registry service.
///
/// Owns the canonical partner records, the coverage index and the snapshot
/// store. Registration holds the write lock from validation until the index
/// is updated, so readers never observe the store and index out of step.
pub struct PartnerRegistry {
    state: RwLock<RegistryState>,
    snapshot: Box<dyn SnapshotStore>,
}

impl PartnerRegistry {
    /// Empty registry writing to `snapshot`. Existing contents are not read.
    pub fn new(snapshot: Box<dyn SnapshotStore>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            snapshot,
        }
    }

    /// Empty registry backed by an in-memory snapshot.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemorySnapshot::new()))
    }

    /// Loads the registry from a JSON snapshot file.
    ///
    /// A missing file is an empty registry.
    pub fn open(path: impl AsRef<Path>) -> RegistryResult<(Self, Vec<LoadDiagnostic>)> {
        Self::load(Box::new(JsonFileSnapshot::new(path.as_ref())))
    }

    /// Loads the registry from `snapshot`.
    ///
    /// Damaged content never fails the load: see [`decode_snapshot`] for what
    /// is dropped. Records whose geometry does not parse are kept but left
    /// out of the index. Only a read failure of the store itself is an error.
    pub fn load(snapshot: Box<dyn SnapshotStore>) -> RegistryResult<(Self, Vec<LoadDiagnostic>)> {
        let source = snapshot.describe();
        let bytes = snapshot.read()?;

        let (partners, mut diagnostics) = match bytes {
            Some(bytes) => decode_snapshot(&bytes),
            None => {
                info!(snapshot = %source, "No snapshot found, starting with empty registry");
                (Vec::new(), Vec::new())
            }
        };

        let mut state = RegistryState::default();
        for partner in partners {
            let shape = match CoverageShape::parse(&partner) {
                Ok(shape) => Some(shape),
                Err(error) => {
                    diagnostics.push(LoadDiagnostic::Unindexed {
                        id: partner.id.clone(),
                        error,
                    });
                    None
                }
            };
            state.by_id.insert(partner.id.clone(), state.entries.len());
            state.entries.push(Entry { partner, shape });
        }

        // Только записи с корректной геометрией попадают в индекс.
        let indexed = state
            .entries
            .iter()
            .filter(|e| e.shape.is_some())
            .map(|e| &e.partner);
        let skipped = state.index.rebuild(indexed);
        diagnostics.extend(skipped.into_iter().map(|d| LoadDiagnostic::Unindexed {
            id: d.id,
            error: d.error,
        }));

        for diagnostic in &diagnostics {
            warn!(snapshot = %source, %diagnostic, "Snapshot load diagnostic");
        }
        info!(
            snapshot = %source,
            partners = state.entries.len(),
            indexed = state.index.len(),
            diagnostics = diagnostics.len(),
            "Partner registry loaded"
        );

        Ok((
            Self {
                state: RwLock::new(state),
                snapshot,
            },
            diagnostics,
        ))
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Операции
    ////////////////////////////////////////////////////////////////////////////////

    /// Registers a new partner and returns its id.
    ///
    /// Checks id uniqueness, then document uniqueness, then parses both
    /// geometries. The resulting snapshot is persisted before memory is
    /// touched; a persistence failure leaves the registry unchanged.
    pub fn register(
        &self,
        partner: Partner,
    ) -> RegistryResult<PartnerId> {
        let mut state = self.state.write();

        if state.by_id.contains_key(&partner.id) {
            warn!(partner_id = %partner.id, "Registration rejected: duplicate id");
            return Err(RegistryError::DuplicateId(partner.id));
        }
        if state
            .entries
            .iter()
            .any(|e| e.partner.document == partner.document)
        {
            warn!(partner_id = %partner.id, "Registration rejected: duplicate document");
            return Err(RegistryError::DuplicateDocument(partner.document));
        }
        let shape = CoverageShape::parse(&partner).inspect_err(|error| {
            warn!(partner_id = %partner.id, %error, "Registration rejected: invalid geometry");
        })?;

        {
            let mut records: Vec<&Partner> = state.entries.iter().map(|e| &e.partner).collect();
            records.push(&partner);
            self.snapshot.write(&records).inspect_err(|error| {
                warn!(partner_id = %partner.id, %error, "Registration aborted: snapshot write failed");
            })?;
        }

        let id = partner.id.clone();
        let position = state.entries.len();
        state.index.insert(id.clone(), shape.bbox);
        state.by_id.insert(id.clone(), position);
        state.entries.push(Entry {
            partner,
            shape: Some(shape),
        });

        info!(partner_id = %id, partners = state.entries.len(), "Partner registered");
        Ok(id)
    }

    /// The partner stored under `id`.
    pub fn get(
        &self,
        id: &PartnerId,
    ) -> RegistryResult<Partner> {
        let state = self.state.read();
        state
            .by_id
            .get(id)
            .map(|&pos| state.entries[pos].partner.clone())
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// The partner whose coverage area contains `(lng, lat)` and whose
    /// address is closest to it.
    ///
    /// Ties are resolved in favour of the first candidate in index order.
    pub fn nearest(
        &self,
        lng: f64,
        lat: f64,
    ) -> RegistryResult<Partner> {
        let state = self.state.read();
        let candidates = state.index.query_point(lng, lat);
        debug!(lng, lat, candidates = candidates.len(), "Coverage candidates");

        let resolved = candidates.iter().filter_map(|id| {
            state.by_id.get(id).map(|&pos| {
                let entry = &state.entries[pos];
                (&entry.partner, entry.shape.as_ref())
            })
        });

        select_nearest(resolved, Point::new(lng, lat))
            .map(|m| m.partner.clone())
            .ok_or(RegistryError::NoCoverage { lng, lat })
    }

    /// Number of stored partners, including unindexed ones.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records in registration order.
    pub fn snapshot(&self) -> Vec<Partner> {
        self.state
            .read()
            .entries
            .iter()
            .map(|e| e.partner.clone())
            .collect()
    }

    pub fn index_stats(&self) -> IndexStats {
        self.state.read().index.stats()
    }

    /// Whether `id` takes part in coverage matching.
    pub fn is_indexed(
        &self,
        id: &PartnerId,
    ) -> bool {
        self.state.read().index.contains(id)
    }
}

impl std::fmt::Debug for PartnerRegistry {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("PartnerRegistry")
            .field("partners", &self.len())
            .field("snapshot", &self.snapshot.describe())
            .finish()
    }
}
