//! Spatial index over partner coverage bounding boxes.

pub mod rtree;

pub use rtree::*;
