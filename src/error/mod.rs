pub mod geometry;
pub mod logging;
pub mod registry;
pub mod request;
pub mod snapshot;

pub use geometry::{GeometryError, GeometryResult};
pub use logging::LoggingError;
pub use registry::{RegistryError, RegistryResult};
pub use request::RequestError;
pub use snapshot::{SnapshotError, SnapshotResult};
