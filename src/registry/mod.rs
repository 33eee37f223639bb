//! Partner registry: canonical records, uniqueness rules, durable snapshot
//! and nearest-covering-partner queries.

pub mod matching;
pub mod partner;
pub mod snapshot;
pub mod store;

pub use matching::{CoverageShape, Match};
pub use partner::*;
pub use snapshot::*;
pub use store::PartnerRegistry;
