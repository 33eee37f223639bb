//! R*-tree based coverage index.
//!
//! Maps partner identifiers to the bounding box of their coverage area,
//! backed by the `rstar` crate. The index only prunes by bounding box; exact
//! polygon containment is left to the matching engine.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use rstar::{RTree, RTreeObject, AABB};
use tracing::{debug, warn};

use crate::{
    error::GeometryError,
    geo::{bounding_box, parse_coverage_area, BoundingBox},
    registry::{Partner, PartnerId},
};

/// Entry stored inside the R-tree.
#[derive(Debug, Clone)]
struct CoverageEntry {
    id: PartnerId,
    bbox: BoundingBox,
    /// Insertion sequence; query results are ordered by it.
    seq: u64,
}

impl PartialEq for CoverageEntry {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.id == other.id
    }
}

impl RTreeObject for CoverageEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bbox.to_aabb()
    }
}

/// A record skipped while rebuilding the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDiagnostic {
    pub id: PartnerId,
    pub error: GeometryError,
}

/// Counters for monitoring index usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub total_insertions: u64,
    pub total_queries: u64,
    pub total_rebuilds: u64,
    pub indexed: usize,
}

/// Bounding-box index over partner coverage areas.
#[derive(Debug, Default)]
pub struct CoverageIndex {
    tree: RTree<CoverageEntry>,
    /// Cached entries for efficient replacement/removal
    entries: HashMap<PartnerId, CoverageEntry>,
    total_insertions: u64,
    total_rebuilds: u64,
    total_queries: AtomicU64,
    next_seq: u64,
}

impl CoverageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `id`.
    ///
    /// An existing entry is removed from the tree first, so the old box is
    /// never reachable by a query afterwards.
    pub fn insert(
        &mut self,
        id: PartnerId,
        bbox: BoundingBox,
    ) {
        if let Some(existing) = self.entries.remove(&id) {
            let _ = self.tree.remove(&existing);
        }

        let entry = CoverageEntry {
            id,
            bbox,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.tree.insert(entry.clone());
        self.entries.insert(entry.id.clone(), entry);
        self.total_insertions += 1;
    }

    /// Every indexed id whose bounding box contains `(lon, lat)`.
    ///
    /// Box edges count as inside. Ids come in insertion order, independent of
    /// the tree shape, so a rebuilt index answers exactly like the live one.
    pub fn query_point(
        &self,
        lon: f64,
        lat: f64,
    ) -> Vec<PartnerId> {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        let probe = AABB::from_point([lon, lat]);
        let mut hits: Vec<&CoverageEntry> =
            self.tree.locate_in_envelope_intersecting(&probe).collect();
        hits.sort_unstable_by_key(|entry| entry.seq);
        hits.into_iter().map(|entry| entry.id.clone()).collect()
    }

    /// Clears the index and bulk-loads it from a full partner snapshot.
    ///
    /// Records whose coverage area fails to parse are skipped and reported;
    /// the remaining records are still indexed. Sequence numbers follow the
    /// order of `partners`, and a repeated id keeps its last box.
    pub fn rebuild<'a, I>(
        &mut self,
        partners: I,
    ) -> Vec<IndexDiagnostic>
    where
        I: IntoIterator<Item = &'a Partner>,
    {
        self.clear();
        let mut diagnostics = Vec::new();
        let mut entries: HashMap<PartnerId, CoverageEntry> = HashMap::new();
        let mut seq = 0;

        for partner in partners {
            let bbox = parse_coverage_area(&partner.coverage_area).and_then(|area| {
                bounding_box(&area).ok_or(GeometryError::Empty {
                    field: crate::geo::COVERAGE_FIELD,
                })
            });

            match bbox {
                Ok(bbox) => {
                    let entry = CoverageEntry {
                        id: partner.id.clone(),
                        bbox,
                        seq,
                    };
                    seq += 1;
                    entries.insert(entry.id.clone(), entry);
                }
                Err(error) => {
                    warn!(partner_id = %partner.id, %error, "Skipping partner with unparsable coverage area");
                    diagnostics.push(IndexDiagnostic {
                        id: partner.id.clone(),
                        error,
                    });
                }
            }
        }

        self.tree = RTree::bulk_load(entries.values().cloned().collect());
        self.entries = entries;
        self.next_seq = seq;
        self.total_rebuilds += 1;

        debug!(
            indexed = self.entries.len(),
            skipped = diagnostics.len(),
            "Coverage index rebuilt"
        );
        diagnostics
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
        self.next_seq = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks whether a given partner is indexed.
    pub fn contains(
        &self,
        id: &PartnerId,
    ) -> bool {
        self.entries.contains_key(id)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_insertions: self.total_insertions,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            total_rebuilds: self.total_rebuilds,
            indexed: self.tree.size(),
        }
    }
}
