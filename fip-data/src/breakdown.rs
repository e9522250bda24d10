//! Categorical breakdowns: ranked bars and share slices.

use crate::models::{CategoryValue, ShareSlice};
use fip_core::{AggregateTable, TableError};
use indexmap::IndexMap;

/// Sum the given measures per distinct value of `category`.
///
/// Categories come out in first-encounter order.
pub(crate) fn group_sums(
    table: &AggregateTable,
    category: &str,
    measures: &[&str],
) -> Result<IndexMap<String, Vec<f64>>, TableError> {
    let key = table.key_index(category)?;
    let indexes = measures
        .iter()
        .map(|m| table.measure_index(m))
        .collect::<Result<Vec<_>, _>>()?;

    let mut groups: IndexMap<String, Vec<f64>> = IndexMap::new();
    for row in table.rows() {
        let sums = groups
            .entry(row.keys[key].clone())
            .or_insert_with(|| vec![0.0; indexes.len()]);
        for (sum, &idx) in sums.iter_mut().zip(&indexes) {
            *sum += row.values[idx];
        }
    }
    Ok(groups)
}

/// Group by `category`, sum `measure`, largest first.
///
/// Ties keep first-encounter order.
pub fn ranked_breakdown(
    table: &AggregateTable,
    category: &str,
    measure: &str,
) -> Result<Vec<CategoryValue>, TableError> {
    let mut bars: Vec<CategoryValue> = group_sums(table, category, &[measure])?
        .into_iter()
        .map(|(category, sums)| CategoryValue {
            category,
            value: sums[0],
        })
        .collect();
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
    Ok(bars)
}

/// Group by `category`, sum `measure` and express each group as a share of
/// the total.
///
/// Empty when the total is zero, since no share can be computed.
pub fn share_breakdown(
    table: &AggregateTable,
    category: &str,
    measure: &str,
) -> Result<Vec<ShareSlice>, TableError> {
    let groups = group_sums(table, category, &[measure])?;
    let total: f64 = groups.values().map(|sums| sums[0]).sum();
    if total == 0.0 || !total.is_finite() {
        return Ok(Vec::new());
    }
    Ok(groups
        .into_iter()
        .map(|(category, sums)| ShareSlice {
            category,
            value: sums[0],
            share: sums[0] / total,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fip_core::{AggregateRow, Period};

    fn credit() -> AggregateTable {
        let p = Period::from_date_str("2020-03").unwrap();
        let row = |fi: &str, industry: &str, loans: f64| {
            AggregateRow::new(p, vec![fi.into(), industry.into()], vec![loans])
        };
        AggregateTable::new(
            vec!["fi_type".into(), "industry_cat".into()],
            vec!["loans".into()],
            vec![
                row("Banks", "Commerce", 30.0),
                row("Banks", "Mining", 60.0),
                row("Cajas", "Commerce", 20.0),
                row("Cajas", "Agriculture", 50.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn ranked_sums_and_sorts_descending() {
        let bars = ranked_breakdown(&credit(), "industry_cat", "loans").unwrap();
        let order: Vec<(&str, f64)> = bars.iter().map(|b| (b.category.as_str(), b.value)).collect();
        assert_eq!(
            order,
            vec![("Mining", 60.0), ("Commerce", 50.0), ("Agriculture", 50.0)]
        );
    }

    #[test]
    fn ranked_sums_across_other_keys() {
        let bars = ranked_breakdown(&credit(), "fi_type", "loans").unwrap();
        assert_eq!(bars[0].category, "Banks");
        assert_eq!(bars[1].category, "Cajas");
        assert_eq!(bars[0].value, 90.0);
        assert_eq!(bars[1].value, 70.0);
    }

    #[test]
    fn ranked_empty_table_is_empty() {
        let empty = credit().filter(|_| false);
        assert!(ranked_breakdown(&empty, "fi_type", "loans").unwrap().is_empty());
    }

    #[test]
    fn shares_sum_to_one() {
        let slices = share_breakdown(&credit(), "fi_type", "loans").unwrap();
        assert_eq!(slices.len(), 2);
        let total: f64 = slices.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((slices[0].share - 90.0 / 160.0).abs() < 1e-12);
    }

    #[test]
    fn shares_of_zero_total_are_empty() {
        let zero = credit().filter(|_| false);
        assert!(share_breakdown(&zero, "fi_type", "loans").unwrap().is_empty());
    }

    #[test]
    fn unknown_category_is_an_error() {
        let err = ranked_breakdown(&credit(), "region", "loans").unwrap_err();
        assert_eq!(err, TableError::ColumnNotFound("region".into()));
    }
}
