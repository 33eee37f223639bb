//! Разбор геометрий и геометрические предикаты.
//!
//! Расстояние считается на плоскости (долгота/широта как декартовы
//! координаты), без учёта эллипсоида.

use geo::{
    Area, BoundingRect, Coord, Distance, Euclidean, Intersects, LineString, MultiPolygon, Point,
    Polygon,
};

use super::{
    bbox::BoundingBox,
    geojson::{GeometryKind, MultiPolygonCoords, PolygonCoords, Position, RawGeometry, Ring},
};
use crate::error::{GeometryError, GeometryResult};

pub const COVERAGE_FIELD: &str = "coverageArea";
pub const ADDRESS_FIELD: &str = "address";

/// Разбирает зону покрытия: `Polygon` или `MultiPolygon`.
///
/// Одиночный полигон нормализуется в коллекцию из одного элемента.
pub fn parse_coverage_area(raw: &RawGeometry) -> GeometryResult<MultiPolygon<f64>> {
    let field = COVERAGE_FIELD;
    let polygons = match raw.kind(field)? {
        Some(GeometryKind::Polygon) => {
            let coords: PolygonCoords = raw.coordinates(field)?;
            vec![build_polygon(field, coords)?]
        }
        Some(GeometryKind::MultiPolygon) => {
            let coords: MultiPolygonCoords = raw.coordinates(field)?;
            coords
                .into_iter()
                .map(|polygon| build_polygon(field, polygon))
                .collect::<GeometryResult<Vec<_>>>()?
        }
        _ => {
            return Err(GeometryError::WrongKind {
                field,
                expected: "a MultiPolygon or Polygon",
                found: raw.type_name().unwrap_or_default().to_string(),
            })
        }
    };

    let area = MultiPolygon::new(polygons);
    if area.0.is_empty() || area.unsigned_area() <= 0.0 {
        return Err(GeometryError::Empty { field });
    }
    Ok(area)
}

/// Разбирает адрес партнёра: ровно одна `Point`.
pub fn parse_address_point(raw: &RawGeometry) -> GeometryResult<Point<f64>> {
    let field = ADDRESS_FIELD;
    match raw.kind(field)? {
        Some(GeometryKind::Point) => {
            let position: Position = raw.coordinates(field)?;
            Ok(Point::from(to_coord(field, &position)?))
        }
        _ => Err(GeometryError::WrongKind {
            field,
            expected: "a Point",
            found: raw.type_name().unwrap_or_default().to_string(),
        }),
    }
}

/// Минимальный bounding box, охватывающий все полигоны.
pub fn bounding_box(area: &MultiPolygon<f64>) -> Option<BoundingBox> {
    area.bounding_rect().map(BoundingBox::from_rect)
}

/// Лежит ли точка внутри какого-либо полигона.
///
/// Граница считается покрытой: точка на ребре или в вершине даёт `true`.
pub fn contains(
    area: &MultiPolygon<f64>,
    point: &Point<f64>,
) -> bool {
    area.intersects(point)
}

/// Евклидово расстояние на плоскости, в единицах входных координат.
pub fn distance(
    a: Point<f64>,
    b: Point<f64>,
) -> f64 {
    Euclidean::distance(a, b)
}

fn build_polygon(
    field: &'static str,
    rings: PolygonCoords,
) -> GeometryResult<Polygon<f64>> {
    let mut rings = rings.into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| GeometryError::coords(field, "polygon without exterior ring"))?;
    let exterior = build_ring(field, &exterior)?;
    let interiors = rings
        .map(|ring| build_ring(field, &ring))
        .collect::<GeometryResult<Vec<_>>>()?;

    // Polygon::new сам замыкает незамкнутые кольца.
    Ok(Polygon::new(exterior, interiors))
}

fn build_ring(
    field: &'static str,
    ring: &Ring,
) -> GeometryResult<LineString<f64>> {
    let coords = ring
        .iter()
        .map(|position| to_coord(field, position))
        .collect::<GeometryResult<Vec<_>>>()?;

    let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for c in &coords {
        if !distinct.contains(c) {
            distinct.push(*c);
        }
    }
    if distinct.len() < 3 {
        return Err(GeometryError::coords(
            field,
            format!(
                "ring needs at least 3 distinct vertices, got {}",
                distinct.len()
            ),
        ));
    }

    Ok(LineString::new(coords))
}

fn to_coord(
    field: &'static str,
    position: &Position,
) -> GeometryResult<Coord<f64>> {
    match position.as_slice() {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        [_, _, ..] => Err(GeometryError::coords(field, "non-finite ordinate")),
        _ => Err(GeometryError::coords(
            field,
            format!("position needs [lng, lat], got {} values", position.len()),
        )),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
