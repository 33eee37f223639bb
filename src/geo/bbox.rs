use geo::Rect;
use rstar::AABB;

/// Прямоугольная область (bounding box) на карте.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl BoundingBox {
    /// Создаёт bounding box из двух углов.
    pub fn new(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Создаёт bounding box из `geo::Rect`.
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    /// Проверяет, содержит ли bbox точку (границы включительно).
    pub fn contains_point(
        &self,
        lon: f64,
        lat: f64,
    ) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Кортеж в порядке `(minX, minY, maxX, maxY)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }

    /// Конверсия в envelope для R-tree.
    pub fn to_aabb(&self) -> AABB<[f64; 2]> {
        let (min_x, min_y, max_x, max_y) = self.bounds();
        AABB::from_corners([min_x, min_y], [max_x, max_y])
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
