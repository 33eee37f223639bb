//! Geometry engine: GeoJSON parsing, bounding boxes, containment and
//! planar distance.

pub mod bbox;
pub mod geojson;
pub mod shape;

pub use bbox::*;
pub use geojson::*;
pub use shape::*;
