//! Reductions to a scalar, and the map projection of the spatial aggregate.

use crate::models::{RegionMap, RegionValue};
use fip_core::{AggregateTable, SpatialTable, TableError};
use std::collections::HashSet;

/// Sum of `measure` over the spatial rows; regions without data count as 0.
pub fn sum_spatial(table: &SpatialTable, measure: &str) -> Result<f64, TableError> {
    let idx = table.measure_index(measure)?;
    Ok(table
        .rows()
        .iter()
        .filter_map(|row| row.values[idx])
        .sum())
}

/// Number of distinct values of the key column `key`.
pub fn count_distinct(table: &AggregateTable, key: &str) -> Result<usize, TableError> {
    let idx = table.key_index(key)?;
    let distinct: HashSet<&str> = table.rows().iter().map(|row| row.keys[idx].as_str()).collect();
    Ok(distinct.len())
}

/// Project one measure of the spatial aggregate into a titled choropleth.
///
/// Row order is kept, so regions come out in boundary file order.
pub fn region_map(
    table: &SpatialTable,
    measure: &str,
    title: impl Into<String>,
) -> Result<RegionMap, TableError> {
    let idx = table.measure_index(measure)?;
    let regions = table
        .rows()
        .iter()
        .map(|row| RegionValue {
            region: row.region.clone(),
            period: row.period,
            value: row.values[idx],
            geometry: row.geometry.clone(),
        })
        .collect();
    Ok(RegionMap {
        title: title.into(),
        measure: measure.to_string(),
        regions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fip_core::spatial::Geometry;
    use fip_core::{AggregateRow, Period, SpatialRow};
    use serde_json::json;

    fn p(s: &str) -> Period {
        Period::from_date_str(s).unwrap()
    }

    fn institutions() -> AggregateTable {
        AggregateTable::new(
            vec!["region".into(), "institution_id".into()],
            vec!["deposits".into()],
            vec![
                AggregateRow::new(p("2020-03"), vec!["LIMA".into(), "B1".into()], vec![300.0]),
                AggregateRow::new(p("2020-03"), vec!["LIMA".into(), "B2".into()], vec![200.0]),
                AggregateRow::new(p("2020-03"), vec!["CUSCO".into(), "B1".into()], vec![5.5]),
            ],
        )
        .unwrap()
    }

    fn spatial() -> SpatialTable {
        let geometry = Geometry::new(json!({"type": "Polygon", "coordinates": []}));
        SpatialTable::new(
            vec!["deposits".into(), "loans".into()],
            vec![
                SpatialRow {
                    region: "LIMA".into(),
                    period: p("2020-03"),
                    geometry: geometry.clone(),
                    values: vec![Some(500.0), Some(250.0)],
                },
                SpatialRow {
                    region: "PUNO".into(),
                    period: p("2020-03"),
                    geometry,
                    values: vec![None, None],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn empty_inputs_reduce_to_zero() {
        let empty = AggregateTable::empty(vec!["region".into()], vec!["deposits".into()]);
        assert_eq!(count_distinct(&empty, "region").unwrap(), 0);
        let no_regions = SpatialTable::new(vec!["deposits".into()], vec![]).unwrap();
        assert_eq!(sum_spatial(&no_regions, "deposits").unwrap(), 0.0);
    }

    #[test]
    fn unknown_measure_is_an_error() {
        assert!(sum_spatial(&spatial(), "debtors").is_err());
        assert!(count_distinct(&institutions(), "deposits").is_err());
    }

    #[test]
    fn counts_distinct_ids_across_regions() {
        assert_eq!(count_distinct(&institutions(), "institution_id").unwrap(), 2);
        assert_eq!(count_distinct(&institutions(), "region").unwrap(), 2);
    }

    #[test]
    fn spatial_sum_treats_missing_as_zero() {
        assert_eq!(sum_spatial(&spatial(), "loans").unwrap(), 250.0);
    }

    #[test]
    fn region_map_keeps_regions_without_data() {
        let map = region_map(&spatial(), "deposits", "Deposits").unwrap();
        assert_eq!(map.title, "Deposits");
        assert_eq!(map.regions.len(), 2);
        assert_eq!(map.regions[1].value, None);
        assert_eq!(map.regions.iter().filter(|r| r.value.is_some()).count(), 1);

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["regions"][0]["period"], "2020-03");
        assert_eq!(json["regions"][0]["geometry"]["type"], "Polygon");
    }
}
