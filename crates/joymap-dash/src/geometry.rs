//! World geometry index for joining dataset rows onto map shapes.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use joymap_data::CountryRecord;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// TopoJSON object holding country shapes in world-110m.
pub const COUNTRIES_FEATURE: &str = "countries";

#[derive(Deserialize)]
struct Topology {
    objects: HashMap<String, TopoObject>,
}

#[derive(Deserialize)]
struct TopoObject {
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
}

#[derive(Deserialize)]
struct TopoGeometry {
    #[serde(default)]
    id: Option<serde_json::Value>,
}

/// Region identifiers present in a geometry layer.
#[derive(Debug, Clone, Default)]
pub struct GeometryIndex {
    ids: HashSet<u32>,
}

impl GeometryIndex {
    /// Index a TopoJSON file on disk.
    pub fn load(path: impl AsRef<Path>, feature: &str) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let index = Self::from_slice(&bytes, feature)?;
        tracing::info!(path = %path.display(), shapes = index.len(), "Geometry indexed");
        Ok(index)
    }

    /// Index a TopoJSON document.
    ///
    /// Numeric ids and numeric strings (`"004"`) are accepted; shapes without
    /// a usable id (e.g. `"-99"` for disputed areas) are skipped.
    pub fn from_slice(bytes: &[u8], feature: &str) -> Result<Self> {
        let topology: Topology = serde_json::from_slice(bytes)?;
        let object = topology
            .objects
            .get(feature)
            .ok_or_else(|| Error::Geometry(format!("object {feature:?} not found")))?;

        let ids = object
            .geometries
            .iter()
            .filter_map(|geometry| geometry.id.as_ref())
            .filter_map(region_id)
            .collect();
        Ok(Self { ids })
    }

    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, region_id: u32) -> bool {
        self.ids.contains(&region_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn region_id(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A dataset row whose region has no shape in the geometry layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinMismatch {
    pub region_id: u32,
    pub country: String,
}

/// Split records into those drawable on the map and those without geometry.
///
/// With no index every record is kept.
pub fn join<'a>(
    index: Option<&GeometryIndex>,
    records: &'a [CountryRecord],
) -> (Vec<&'a CountryRecord>, Vec<JoinMismatch>) {
    let Some(index) = index else {
        return (records.iter().collect(), Vec::new());
    };

    let mut matched = Vec::with_capacity(records.len());
    let mut mismatches = Vec::new();
    for record in records {
        if index.contains(record.region_id) {
            matched.push(record);
        } else {
            mismatches.push(JoinMismatch {
                region_id: record.region_id,
                country: record.country.clone(),
            });
        }
    }
    (matched, mismatches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "objects": {
            "countries": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "id": 4, "arcs": [[0]]},
                    {"type": "Polygon", "id": "008", "arcs": [[1]]},
                    {"type": "Polygon", "id": "-99", "arcs": [[2]]},
                    {"type": "Polygon", "arcs": [[3]]}
                ]
            },
            "land": {"type": "GeometryCollection", "geometries": []}
        },
        "arcs": []
    }"#;

    fn record(region_id: u32, country: &str) -> CountryRecord {
        CountryRecord {
            region_id,
            country: country.to_string(),
            health: 60.0,
            freedom: 0.7,
            economy: 9.0,
            delta_happy: 5.0,
            happiness_rank: 50,
        }
    }

    #[test]
    fn indexes_numeric_and_string_ids() {
        let index = GeometryIndex::from_slice(TOPOLOGY.as_bytes(), COUNTRIES_FEATURE).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains(4));
        assert!(index.contains(8));
    }

    #[test]
    fn missing_feature_is_an_error() {
        let err = GeometryIndex::from_slice(TOPOLOGY.as_bytes(), "states").unwrap_err();
        assert!(matches!(err, Error::Geometry(_)));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = GeometryIndex::from_slice(b"not json", COUNTRIES_FEATURE).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn join_excludes_records_without_geometry() {
        let index = GeometryIndex::from_ids([4, 8]);
        let records = vec![record(4, "Afghanistan"), record(16, "Samoa"), record(8, "Albania")];

        let (matched, mismatches) = join(Some(&index), &records);
        let names: Vec<_> = matched.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["Afghanistan", "Albania"]);
        assert_eq!(
            mismatches,
            vec![JoinMismatch { region_id: 16, country: "Samoa".to_string() }]
        );
    }

    #[test]
    fn join_without_index_keeps_everything() {
        let records = vec![record(4, "Afghanistan"), record(16, "Samoa")];
        let (matched, mismatches) = join(None, &records);
        assert_eq!(matched.len(), 2);
        assert!(mismatches.is_empty());
    }

    #[test]
    fn load_reads_topology_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world-110m.json");
        std::fs::write(&path, TOPOLOGY).unwrap();

        let index = GeometryIndex::load(&path, COUNTRIES_FEATURE).unwrap();
        assert!(index.contains(4));
    }
}
