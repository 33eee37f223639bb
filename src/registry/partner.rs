use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use crate::geo::RawGeometry;

/// Canonical partner identifier.
///
/// Clients may send identifiers as JSON strings or numbers; both are
/// normalized to their string form here, so `7` and `"7"` name the same
/// partner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartnerId(String);

/// A registered delivery partner.
///
/// Geometries are kept as submitted so the snapshot reproduces them exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: PartnerId,
    pub trading_name: String,
    pub owner_name: String,
    pub document: String,
    pub coverage_area: RawGeometry,
    pub address: RawGeometry,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Str(String),
    Num(Number),
}

impl PartnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for PartnerId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PartnerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PartnerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PartnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for PartnerId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<u64> for PartnerId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for PartnerId {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PartnerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match IdRepr::deserialize(deserializer)? {
            IdRepr::Str(s) => Self(s),
            IdRepr::Num(n) => Self(n.to_string()),
        })
    }
}

impl Partner {
    pub fn new(
        id: impl Into<PartnerId>,
        trading_name: impl Into<String>,
        owner_name: impl Into<String>,
        document: impl Into<String>,
        coverage_area: RawGeometry,
        address: RawGeometry,
    ) -> Self {
        Self {
            id: id.into(),
            trading_name: trading_name.into(),
            owner_name: owner_name.into(),
            document: document.into(),
            coverage_area,
            address,
        }
    }
}
