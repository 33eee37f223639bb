//! Сырые GeoJSON-геометрии партнёра.
//!
//! Геометрия хранится в том виде, в каком пришла от клиента, и разбирается
//! в типизированные значения `geo` только по требованию. Так snapshot
//! воспроизводит исходный payload байт-в-байт (с точностью до форматирования
//! JSON), а записи с битой геометрией переживают загрузку.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{GeometryError, GeometryResult};

/// Вид GeoJSON-геометрии, поддерживаемый движком.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Polygon,
    MultiPolygon,
}

/// GeoJSON-геометрия в исходном (не разобранном) виде.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawGeometry(Value);

/// Позиция GeoJSON: `[lon, lat, ...]`.
pub(crate) type Position = Vec<f64>;
pub(crate) type Ring = Vec<Position>;
pub(crate) type PolygonCoords = Vec<Ring>;
pub(crate) type MultiPolygonCoords = Vec<PolygonCoords>;

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }

    fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(GeometryKind::Point),
            "Polygon" => Some(GeometryKind::Polygon),
            "MultiPolygon" => Some(GeometryKind::MultiPolygon),
            _ => None,
        }
    }
}

impl RawGeometry {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Точка `{"type":"Point","coordinates":[lon, lat]}`.
    pub fn point(
        lon: f64,
        lat: f64,
    ) -> Self {
        Self(json!({ "type": "Point", "coordinates": [lon, lat] }))
    }

    /// Полигон из одного внешнего кольца.
    pub fn polygon(ring: &[(f64, f64)]) -> Self {
        let ring: Vec<[f64; 2]> = ring.iter().map(|&(x, y)| [x, y]).collect();
        Self(json!({ "type": "Polygon", "coordinates": [ring] }))
    }

    /// Мультиполигон из набора внешних колец.
    pub fn multi_polygon(rings: &[&[(f64, f64)]]) -> Self {
        let polygons: Vec<Vec<Vec<[f64; 2]>>> = rings
            .iter()
            .map(|ring| vec![ring.iter().map(|&(x, y)| [x, y]).collect()])
            .collect();
        Self(json!({ "type": "MultiPolygon", "coordinates": polygons }))
    }

    /// Значение поля `type`, если оно есть.
    pub fn type_name(&self) -> Option<&str> {
        self.0.get("type")?.as_str()
    }

    /// Определяет вид геометрии.
    ///
    /// `Ok(None)`: поле `type` есть, но вид не поддерживается (LineString,
    /// GeometryCollection и т.п.).
    pub(crate) fn kind(
        &self,
        field: &'static str,
    ) -> GeometryResult<Option<GeometryKind>> {
        let name = self
            .type_name()
            .ok_or(GeometryError::MissingType { field })?;
        Ok(GeometryKind::from_type_name(name))
    }

    /// Десериализует поле `coordinates` в нужную вложенность.
    pub(crate) fn coordinates<T: DeserializeOwned>(
        &self,
        field: &'static str,
    ) -> GeometryResult<T> {
        let coords = self
            .0
            .get("coordinates")
            .ok_or_else(|| GeometryError::coords(field, "missing \"coordinates\" member"))?;
        T::deserialize(coords).map_err(|e| GeometryError::coords(field, e.to_string()))
    }
}

impl From<Value> for RawGeometry {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_detection() {
        let p = RawGeometry::point(1.0, 2.0);
        assert_eq!(p.kind("address").unwrap(), Some(GeometryKind::Point));

        let line = RawGeometry::new(json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]}));
        assert_eq!(line.kind("coverageArea").unwrap(), None);

        let no_type = RawGeometry::new(json!({"coordinates": [0, 0]}));
        assert_eq!(
            no_type.kind("address"),
            Err(GeometryError::MissingType { field: "address" })
        );
    }

    #[test]
    fn test_coordinates_type_mismatch() {
        let bad = RawGeometry::new(json!({"type": "Point", "coordinates": "nope"}));
        let err = bad.coordinates::<Position>("address").unwrap_err();
        assert!(matches!(
            err,
            GeometryError::InvalidCoordinates {
                field: "address",
                ..
            }
        ));
    }

    #[test]
    fn test_serde_is_transparent() {
        let raw = RawGeometry::polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let text = serde_json::to_string(&raw).unwrap();
        assert!(text.contains(r#""type":"Polygon""#));

        let back: RawGeometry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, raw);
    }
}
