//! Department boundaries and the boundary x period join.
//!
//! Boundaries come from a GeoJSON `FeatureCollection` with one Polygon or
//! MultiPolygon per department, named by a feature property (`NOMBDEP` in
//! the published file).
//!
//! The join is a left join on the exact region name: every boundary
//! appears once per period of the aggregate, with absent measures when the
//! aggregate has no row for it. Spelling mismatches between the two inputs
//! are not repaired; they show up as warnings and in the [`JoinReport`].

use crate::error::LoadError;
use fip_core::spatial::Geometry;
use fip_core::{AggregateTable, Boundary, Period, SpatialRow, SpatialTable, TableError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap, HashSet};

const POLYGON_KINDS: [&str; 2] = ["Polygon", "MultiPolygon"];

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Value>,
}

/// Parse a GeoJSON FeatureCollection into boundaries, in file order.
///
/// Fails on a feature without a region name, a geometry that is not a
/// (multi)polygon, or two features naming the same region.
pub fn parse_boundaries(json: &str, region_property: &str) -> Result<Vec<Boundary>, LoadError> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    if collection.kind != "FeatureCollection" {
        return Err(LoadError::Boundaries(format!(
            "expected a FeatureCollection, found '{}'",
            collection.kind
        )));
    }

    let mut seen = HashSet::new();
    let mut boundaries = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.into_iter().enumerate() {
        let region = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(region_property))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                LoadError::Boundaries(format!(
                    "feature {} has no '{}' property",
                    i, region_property
                ))
            })?
            .to_string();

        let geometry = Geometry::new(feature.geometry.unwrap_or(Value::Null));
        match geometry.kind() {
            Some(kind) if POLYGON_KINDS.contains(&kind) => {}
            other => {
                return Err(LoadError::Boundaries(format!(
                    "region '{}' has unsupported geometry {:?}",
                    region, other
                )))
            }
        }

        if !seen.insert(region.clone()) {
            return Err(LoadError::DuplicateRegion(region));
        }
        boundaries.push(Boundary { region, geometry });
    }

    log::info!("geo: Loaded {} boundaries", boundaries.len());
    Ok(boundaries)
}

/// Region names that did not line up between boundaries and aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct JoinReport {
    /// Regions with aggregate rows but no boundary; their data is not mapped.
    pub unmatched_regions: Vec<String>,
    /// Boundaries with no aggregate row in any period; always drawn empty.
    pub boundaries_without_data: Vec<String>,
}

impl JoinReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched_regions.is_empty() && self.boundaries_without_data.is_empty()
    }
}

/// Left-join boundaries with an aggregate keyed by (period, `region_column`).
///
/// Produces `boundaries.len() * periods.len()` rows ordered by period, then
/// boundary file order. Should the aggregate carry further keys, rows of
/// the same (period, region) are summed so each boundary still appears once
/// per period.
pub fn join_boundaries(
    boundaries: &[Boundary],
    table: &AggregateTable,
    region_column: &str,
) -> Result<(SpatialTable, JoinReport), TableError> {
    let region_idx = table.key_index(region_column)?;
    let width = table.measures().len();

    let mut by_key: HashMap<(Period, &str), Vec<f64>> = HashMap::new();
    for row in table.rows() {
        let sums = by_key
            .entry((row.period, row.keys[region_idx].as_str()))
            .or_insert_with(|| vec![0.0; width]);
        for (sum, value) in sums.iter_mut().zip(&row.values) {
            *sum += value;
        }
    }

    let periods = table.periods();
    let mut rows = Vec::with_capacity(boundaries.len() * periods.len());
    let mut matched: HashSet<&str> = HashSet::new();
    for &period in &periods {
        for boundary in boundaries {
            let values = match by_key.get(&(period, boundary.region.as_str())) {
                Some(sums) => {
                    matched.insert(boundary.region.as_str());
                    sums.iter().copied().map(Some).collect()
                }
                None => vec![None; width],
            };
            rows.push(SpatialRow {
                region: boundary.region.clone(),
                period,
                geometry: boundary.geometry.clone(),
                values,
            });
        }
    }

    let boundary_names: HashSet<&str> = boundaries.iter().map(|b| b.region.as_str()).collect();
    let unmatched_regions: Vec<String> = by_key
        .keys()
        .map(|(_, region)| *region)
        .filter(|region| !boundary_names.contains(region))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let boundaries_without_data: Vec<String> = boundaries
        .iter()
        .map(|b| b.region.as_str())
        .filter(|region| !matched.contains(region))
        .map(str::to_string)
        .collect();

    for region in &unmatched_regions {
        log::warn!(
            "geo: Region '{}' has {} data but no boundary; it will not appear on maps",
            region,
            region_column
        );
    }
    if !periods.is_empty() {
        for region in &boundaries_without_data {
            log::warn!("geo: Boundary '{}' has no data in any period", region);
        }
    }

    let spatial = SpatialTable::new(table.measures().to_vec(), rows)?;
    log::info!(
        "geo: Joined {} boundaries x {} periods into {} rows",
        boundaries.len(),
        periods.len(),
        spatial.len()
    );
    Ok((
        spatial,
        JoinReport {
            unmatched_regions,
            boundaries_without_data,
        },
    ))
}
