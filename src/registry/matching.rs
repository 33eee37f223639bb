//! Nearest-covering-partner selection.
//!
//! The spatial index only narrows the search to partners whose bounding box
//! holds the query point. Each candidate is re-tested against its real
//! coverage polygons before distances are compared.

use geo::{MultiPolygon, Point};

use super::Partner;
use crate::{
    error::{GeometryError, GeometryResult},
    geo::{
        bounding_box, contains, distance, parse_address_point, parse_coverage_area, BoundingBox,
        COVERAGE_FIELD,
    },
};

/// Parsed geometry of a partner, cached next to the raw record.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageShape {
    pub area: MultiPolygon<f64>,
    pub address: Point<f64>,
    pub bbox: BoundingBox,
}

/// A candidate that truly covers the query point.
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub partner: &'a Partner,
    pub distance: f64,
}

impl CoverageShape {
    /// Parses both geometries of `partner`.
    pub fn parse(partner: &Partner) -> GeometryResult<Self> {
        let area = parse_coverage_area(&partner.coverage_area)?;
        let address = parse_address_point(&partner.address)?;
        let bbox = bounding_box(&area).ok_or(GeometryError::Empty {
            field: COVERAGE_FIELD,
        })?;
        Ok(Self {
            area,
            address,
            bbox,
        })
    }

    pub fn covers(
        &self,
        point: &Point<f64>,
    ) -> bool {
        self.bbox.contains_point(point.x(), point.y()) && contains(&self.area, point)
    }
}

/// Every candidate whose coverage area really contains `point`, in
/// candidate order, with its distance from the partner address.
///
/// Candidates without a parsed shape are skipped.
pub fn covering<'a, I>(
    candidates: I,
    point: Point<f64>,
) -> Vec<Match<'a>>
where
    I: IntoIterator<Item = (&'a Partner, Option<&'a CoverageShape>)>,
{
    candidates
        .into_iter()
        .filter_map(|(partner, shape)| {
            let shape = shape?;
            shape.covers(&point).then(|| Match {
                partner,
                distance: distance(shape.address, point),
            })
        })
        .collect()
}

/// The covering candidate closest to `point`.
///
/// On equal distances the earliest candidate wins.
pub fn select_nearest<'a, I>(
    candidates: I,
    point: Point<f64>,
) -> Option<Match<'a>>
where
    I: IntoIterator<Item = (&'a Partner, Option<&'a CoverageShape>)>,
{
    covering(candidates, point)
        .into_iter()
        .fold(None, |best: Option<Match<'a>>, m| match best {
            Some(b) if b.distance <= m.distance => Some(b),
            _ => Some(m),
        })
}
