//! Aggregate tables: summed measures keyed by (period, dimension values).
//!
//! A table is a small column-named frame. Key columns hold categorical
//! strings, measure columns hold `f64` sums that have already been scaled
//! into their display unit by the aggregator. Every (period, keys)
//! combination appears at most once; [`AggregateTable::new`] rejects
//! duplicates so the invariant holds for every table that exists.

use crate::error::TableError;
use crate::period::Period;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// One aggregated row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub period: Period,
    /// Dimension values, in the order of [`AggregateTable::keys`].
    pub keys: Vec<String>,
    /// Measure sums, in the order of [`AggregateTable::measures`].
    pub values: Vec<f64>,
}

impl AggregateRow {
    pub fn new(period: Period, keys: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            period,
            keys,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AggregateTable {
    keys: Vec<String>,
    measures: Vec<String>,
    rows: Vec<AggregateRow>,
}

impl AggregateTable {
    /// Build a table, checking row widths and key uniqueness.
    pub fn new(
        keys: Vec<String>,
        measures: Vec<String>,
        rows: Vec<AggregateRow>,
    ) -> Result<Self, TableError> {
        let mut seen: HashSet<(Period, &[String])> = HashSet::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.keys.len() != keys.len() {
                return Err(TableError::WidthMismatch {
                    row: i,
                    kind: "key",
                    expected: keys.len(),
                    found: row.keys.len(),
                });
            }
            if row.values.len() != measures.len() {
                return Err(TableError::WidthMismatch {
                    row: i,
                    kind: "measure",
                    expected: measures.len(),
                    found: row.values.len(),
                });
            }
            if !seen.insert((row.period, row.keys.as_slice())) {
                return Err(TableError::DuplicateKey {
                    row: i,
                    period: row.period.to_string(),
                    key: row.keys.join("/"),
                });
            }
        }
        Ok(Self {
            keys,
            measures,
            rows,
        })
    }

    /// A table with the given columns and no rows.
    pub fn empty(keys: Vec<String>, measures: Vec<String>) -> Self {
        Self {
            keys,
            measures,
            rows: Vec::new(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn measures(&self) -> &[String] {
        &self.measures
    }

    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a key column.
    pub fn key_index(&self, name: &str) -> Result<usize, TableError> {
        self.keys
            .iter()
            .position(|k| k == name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Position of a measure column.
    pub fn measure_index(&self, name: &str) -> Result<usize, TableError> {
        self.measures
            .iter()
            .position(|m| m == name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Distinct periods present in the table, ascending.
    pub fn periods(&self) -> Vec<Period> {
        self.rows
            .iter()
            .map(|r| r.period)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Look up the row for an exact (period, keys) combination.
    pub fn get(&self, period: Period, keys: &[&str]) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| {
            r.period == period
                && r.keys.len() == keys.len()
                && r.keys.iter().zip(keys).all(|(a, b)| a == b)
        })
    }

    /// Keep the rows matching `keep`, in their original order.
    ///
    /// A subset of a unique table is unique, so no re-validation happens.
    pub fn filter<F>(&self, keep: F) -> AggregateTable
    where
        F: Fn(&AggregateRow) -> bool,
    {
        AggregateTable {
            keys: self.keys.clone(),
            measures: self.measures.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Rows sorted by `measure`, largest first.
    ///
    /// The sort is stable: equal values keep their encounter order.
    pub fn ranked_by(&self, measure: &str) -> Result<AggregateTable, TableError> {
        let idx = self.measure_index(measure)?;
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| b.values[idx].total_cmp(&a.values[idx]));
        Ok(AggregateTable {
            keys: self.keys.clone(),
            measures: self.measures.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Period {
        Period::from_date_str(s).unwrap()
    }

    fn row(period: &str, key: &str, value: f64) -> AggregateRow {
        AggregateRow::new(p(period), vec![key.to_string()], vec![value])
    }

    fn table(rows: Vec<AggregateRow>) -> AggregateTable {
        AggregateTable::new(vec!["region".into()], vec!["loans".into()], rows).unwrap()
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = AggregateTable::new(
            vec!["region".into()],
            vec!["loans".into()],
            vec![row("2020-01", "LIMA", 1.0), row("2020-01", "LIMA", 2.0)],
        )
        .unwrap_err();
        assert!(matches!(err, TableError::DuplicateKey { row: 1, .. }));
    }

    #[test]
    fn same_key_in_different_periods_is_allowed() {
        let t = table(vec![row("2020-01", "LIMA", 1.0), row("2020-02", "LIMA", 2.0)]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn rejects_width_mismatch() {
        let err = AggregateTable::new(
            vec!["region".into()],
            vec!["loans".into(), "deposits".into()],
            vec![row("2020-01", "LIMA", 1.0)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::WidthMismatch {
                row: 0,
                kind: "measure",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn periods_are_distinct_and_sorted() {
        let t = table(vec![
            row("2020-02", "LIMA", 1.0),
            row("2019-12", "LIMA", 1.0),
            row("2020-02", "PIURA", 1.0),
        ]);
        assert_eq!(t.periods(), vec![p("2019-12"), p("2020-02")]);
    }

    #[test]
    fn ranked_by_is_descending_and_stable() {
        let t = table(vec![
            row("2020-01", "A", 5.0),
            row("2020-01", "B", 9.0),
            row("2020-01", "C", 5.0),
            row("2020-01", "D", 1.0),
            row("2020-01", "E", 9.0),
        ]);
        let ranked = t.ranked_by("loans").unwrap();
        let order: Vec<&str> = ranked.rows().iter().map(|r| r.keys[0].as_str()).collect();
        assert_eq!(order, vec!["B", "E", "A", "C", "D"]);
    }

    #[test]
    fn ranked_by_unknown_measure_fails() {
        let t = table(vec![row("2020-01", "A", 5.0)]);
        assert_eq!(
            t.ranked_by("debtors").unwrap_err(),
            TableError::ColumnNotFound("debtors".into())
        );
    }

    #[test]
    fn get_finds_exact_key() {
        let t = table(vec![row("2020-01", "LIMA", 3.0), row("2020-01", "CUSCO", 4.0)]);
        assert_eq!(t.get(p("2020-01"), &["CUSCO"]).unwrap().values, vec![4.0]);
        assert!(t.get(p("2020-02"), &["CUSCO"]).is_none());
        assert!(t.get(p("2020-01"), &["Cusco"]).is_none());
    }
}
