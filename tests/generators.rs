//! Общие фикстуры и proptest-генераторы для интеграционных тестов.
#![allow(dead_code)]

use proptest::prelude::*;
use serde_json::{json, Value};
use zepartners::{Partner, RawGeometry};

/// Партнёр с квадратной зоной покрытия `[min, max]²`.
pub fn square_partner(
    id: &str,
    document: &str,
    min: f64,
    max: f64,
    address: (f64, f64),
) -> Partner {
    Partner::new(
        id,
        format!("{id} Trading"),
        format!("{id} Owner"),
        document,
        RawGeometry::polygon(&[(min, min), (max, min), (max, max), (min, max), (min, min)]),
        RawGeometry::point(address.0, address.1),
    )
}

/// Партнёр из сценария Pinheiros: треугольная зона покрытия.
pub fn pinheiros_partner() -> Partner {
    Partner::new(
        "A",
        "Adega Pinheiros",
        "Zé da Silva",
        "doc-1",
        RawGeometry::polygon(&[
            (-46.58, -23.55),
            (-46.58, -23.54),
            (-46.57, -23.54),
            (-46.58, -23.55),
        ]),
        RawGeometry::point(-46.574, -23.551),
    )
}

pub fn partner_json(
    id: Value,
    document: &str,
) -> Value {
    json!({
        "id": id,
        "tradingName": "Adega da Cerveja",
        "ownerName": "Zé da Silva",
        "document": document,
        "coverageArea": {
            "type": "MultiPolygon",
            "coordinates": [[[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]]
        },
        "address": {"type": "Point", "coordinates": [5, 5]}
    })
}

/// Квадрат: (центр, полуразмер).
#[derive(Debug, Clone, Copy)]
pub struct SquareSpec {
    pub center: (f64, f64),
    pub half: f64,
    pub address: (f64, f64),
}

impl SquareSpec {
    pub fn into_partner(
        self,
        i: usize,
    ) -> Partner {
        let (cx, cy) = self.center;
        let h = self.half;
        Partner::new(
            i as u64,
            format!("P{i}"),
            "Owner",
            format!("doc-{i}"),
            RawGeometry::polygon(&[
                (cx - h, cy - h),
                (cx + h, cy - h),
                (cx + h, cy + h),
                (cx - h, cy + h),
                (cx - h, cy - h),
            ]),
            RawGeometry::point(self.address.0, self.address.1),
        )
    }

    pub fn covers(
        &self,
        x: f64,
        y: f64,
    ) -> bool {
        (x - self.center.0).abs() <= self.half && (y - self.center.1).abs() <= self.half
    }

    pub fn distance_sq(
        &self,
        x: f64,
        y: f64,
    ) -> f64 {
        (self.address.0 - x).powi(2) + (self.address.1 - y).powi(2)
    }
}

/// Координаты на сетке 1/8, чтобы избежать пограничных погрешностей.
pub fn grid_coord(range: i32) -> impl Strategy<Value = f64> {
    (-range * 8..=range * 8).prop_map(|v| v as f64 / 8.0)
}

pub fn square_spec() -> impl Strategy<Value = SquareSpec> {
    (grid_coord(20), grid_coord(20), 1..=40i32, grid_coord(25), grid_coord(25)).prop_map(
        |(cx, cy, half, ax, ay)| SquareSpec {
            center: (cx, cy),
            half: half as f64 / 4.0,
            address: (ax, ay),
        },
    )
}

pub fn square_specs(max: usize) -> impl Strategy<Value = Vec<SquareSpec>> {
    prop::collection::vec(square_spec(), 1..=max)
}
