/// Service configuration loading.
pub mod config;
/// Error types: geometry, snapshot, registry, request, logging.
pub mod error;
/// Geometry engine: GeoJSON parsing, containment, planar distance.
pub mod geo;
/// R-tree coverage index over partner bounding boxes.
pub mod index;
/// Logging setup (filters, formats, sinks).
pub mod logging;
/// Network stack: line-delimited JSON protocol and Tokio-based server.
pub mod network;
/// Partner registry, durable snapshot and nearest-partner matching.
pub mod registry;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// config
pub use config::Settings;
/// Operation errors and result types.
pub use error::{
    GeometryError, LoggingError, RegistryError, RegistryResult, RequestError, SnapshotError,
};
/// Geometry values.
pub use geo::{BoundingBox, RawGeometry};
/// Spatial index.
pub use index::{CoverageIndex, IndexStats};
/// Logging entry point.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// Network server and protocol.
pub use network::{Request, Response, Server, ServerConfig};
/// Registry API.
pub use registry::{
    JsonFileSnapshot, LoadDiagnostic, MemorySnapshot, Partner, PartnerId, PartnerRegistry,
    SnapshotStore,
};
