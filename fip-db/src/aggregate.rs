//! Group-and-sum aggregation over the raw tables.
//!
//! An [`AggregateSpec`] names a dataset, the key columns to group by (the
//! period is always the first grouping key) and the measures to sum. Each
//! measure carries the [`Unit`] it is reported in; the division by the
//! unit's scale happens inside the SQL sum, exactly once. Nothing
//! downstream divides again.
//!
//! Missing measure values are NULL in storage and are summed as zero via
//! `COALESCE`, so a group never reports an absent total. A NULL key only
//! drops its row from aggregates that group by that key; coarser groupings
//! still count it.
//!
//! Output rows follow the first-encounter order of their key combination in
//! the raw data (`ORDER BY MIN(rowid)`); ranking is a separate, stable step
//! ([`fip_core::AggregateTable::ranked_by`]).

use crate::error::LoadError;
use crate::schema::Dataset;
use crate::Database;
use fip_core::columns::PERIOD;
use fip_core::format::Unit;
use fip_core::{AggregateRow, AggregateTable, Period};
use rusqlite::params_from_iter;

/// One summed measure and the unit it is reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureSpec {
    pub column: String,
    pub unit: Unit,
}

/// Declarative description of a `GROUP BY period, keys... SUM(measures)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    pub dataset: Dataset,
    pub keys: Vec<String>,
    pub measures: Vec<MeasureSpec>,
}

impl AggregateSpec {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            keys: Vec::new(),
            measures: Vec::new(),
        }
    }

    pub fn key(mut self, column: impl Into<String>) -> Self {
        self.keys.push(column.into());
        self
    }

    pub fn measure(mut self, column: impl Into<String>, unit: Unit) -> Self {
        self.measures.push(MeasureSpec {
            column: column.into(),
            unit,
        });
        self
    }

    /// Reject columns the dataset does not have, and repeated columns.
    ///
    /// Column names are spliced into SQL, so only names from the dataset
    /// descriptor ever get that far.
    fn validate(&self) -> Result<(), LoadError> {
        let unknown = |column: &str| LoadError::UnknownColumn {
            table: self.dataset.table,
            column: column.to_string(),
        };
        for (i, key) in self.keys.iter().enumerate() {
            if !self.dataset.has_key(key) || self.keys[..i].contains(key) {
                return Err(unknown(key));
            }
        }
        for (i, m) in self.measures.iter().enumerate() {
            if !self.dataset.has_measure(&m.column)
                || self.measures[..i].iter().any(|p| p.column == m.column)
            {
                return Err(unknown(&m.column));
            }
        }
        Ok(())
    }

    fn to_sql(&self) -> String {
        let group_by: Vec<&str> = std::iter::once(PERIOD)
            .chain(self.keys.iter().map(String::as_str))
            .collect();
        let sums: Vec<String> = self
            .measures
            .iter()
            .enumerate()
            .map(|(i, m)| format!("SUM(COALESCE({}, 0)) / ?{}", m.column, i + 1))
            .collect();
        let select: Vec<String> = group_by
            .iter()
            .map(|c| c.to_string())
            .chain(sums)
            .collect();
        let present: Vec<String> = self
            .keys
            .iter()
            .map(|k| format!("{} IS NOT NULL", k))
            .collect();
        let filter = if present.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", present.join(" AND "))
        };
        format!(
            "SELECT {} FROM {}{} GROUP BY {} ORDER BY MIN(rowid)",
            select.join(", "),
            self.dataset.table,
            filter,
            group_by.join(", ")
        )
    }
}

impl Database {
    /// Run an aggregation and return its table.
    ///
    /// The result has one row per distinct (period, keys) combination; its
    /// measure columns are named after the source columns.
    pub fn aggregate(&self, spec: &AggregateSpec) -> Result<AggregateTable, LoadError> {
        spec.validate()?;
        let sql = spec.to_sql();
        let key_count = spec.keys.len();
        let measure_count = spec.measures.len();
        let scales: Vec<f64> = spec.measures.iter().map(|m| m.unit.scale()).collect();

        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&sql)?;
        let raw_rows: Vec<(String, Vec<String>, Vec<f64>)> = stmt
            .query_map(params_from_iter(scales.iter()), |row| {
                let period: String = row.get(0)?;
                let keys = (0..key_count)
                    .map(|i| row.get::<_, String>(1 + i))
                    .collect::<Result<Vec<_>, _>>()?;
                let values = (0..measure_count)
                    .map(|i| row.get::<_, f64>(1 + key_count + i))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((period, keys, values))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let rows = raw_rows
            .into_iter()
            .map(|(period, keys, values)| {
                let period = Period::from_date_str(&period).map_err(|source| {
                    LoadError::InvalidPeriod {
                        dataset: spec.dataset.table,
                        line: 0,
                        source,
                    }
                })?;
                Ok(AggregateRow::new(period, keys, values))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;

        let table = AggregateTable::new(
            spec.keys.clone(),
            spec.measures.iter().map(|m| m.column.clone()).collect(),
            rows,
        )?;
        log::info!(
            "aggregate: {} by period{}{} returned {} rows",
            spec.dataset.table,
            if key_count > 0 { ", " } else { "" },
            spec.keys.join(", "),
            table.len()
        );
        Ok(table)
    }

    /// Distinct periods present in a dataset, ascending.
    pub fn query_periods(&self, dataset: &Dataset) -> Result<Vec<Period>, LoadError> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT period FROM {} ORDER BY period",
            dataset.table
        ))?;
        let raw: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let periods = raw
            .iter()
            .map(|p| {
                Period::from_date_str(p).map_err(|source| LoadError::InvalidPeriod {
                    dataset: dataset.table,
                    line: 0,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "aggregate: query_periods({}) returned {} periods",
            dataset.table,
            periods.len()
        );
        Ok(periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CREDIT, DEPOSITS, INDUSTRY_LOANS};
    use fip_core::columns::{credit, deposits};
    use std::collections::HashMap;

    const DEPOSITS_CSV: &str = "\
Date|Region|CODIGO_ENTIDAD_ID|Deposits|Loans
2020-03-31|LIMA|B001|300000000|100000000
2020-03-31|CUSCO|B001|2000000|1000000
2020-03-15|LIMA|B002|200000000|
2020-04-30|LIMA|B001|310000000|110000000
2020-03-31|PIURA|B003||500000
";

    fn p(s: &str) -> Period {
        Period::from_date_str(s).unwrap()
    }

    fn deposits_db() -> Database {
        let db = Database::new().unwrap();
        db.load_deposits(DEPOSITS_CSV).unwrap();
        db
    }

    fn by_region() -> AggregateSpec {
        AggregateSpec::new(DEPOSITS)
            .key(deposits::REGION)
            .measure(deposits::DEPOSITS, Unit::Millions)
            .measure(deposits::LOANS, Unit::Millions)
    }

    #[test]
    fn groups_by_period_and_key() {
        let db = deposits_db();
        let table = db.aggregate(&by_region()).unwrap();
        assert_eq!(table.len(), 4);
        let lima = table.get(p("2020-03"), &["LIMA"]).unwrap();
        // 300M + 200M deposits, 100M + missing loans
        assert!((lima.values[0] - 500.0).abs() < 1e-9);
        assert!((lima.values[1] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn missing_measures_sum_as_zero() {
        let db = deposits_db();
        let table = db.aggregate(&by_region()).unwrap();
        let piura = table.get(p("2020-03"), &["PIURA"]).unwrap();
        assert_eq!(piura.values[0], 0.0);
        assert!((piura.values[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rows_follow_first_encounter_order() {
        let db = deposits_db();
        let table = db.aggregate(&by_region()).unwrap();
        let order: Vec<(String, &str)> = table
            .rows()
            .iter()
            .map(|r| (r.period.to_string(), r.keys[0].as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2020-03".to_string(), "LIMA"),
                ("2020-03".to_string(), "CUSCO"),
                ("2020-04".to_string(), "LIMA"),
                ("2020-03".to_string(), "PIURA"),
            ]
        );
    }

    #[test]
    fn aggregation_is_complete() {
        // Every group sum equals the sum over the raw records of that group.
        let db = deposits_db();
        let table = db
            .aggregate(
                &AggregateSpec::new(DEPOSITS)
                    .key(deposits::REGION)
                    .measure(deposits::DEPOSITS, Unit::Units),
            )
            .unwrap();

        let mut expected: HashMap<(String, String), f64> = HashMap::new();
        for line in DEPOSITS_CSV.lines().skip(1) {
            let fields: Vec<&str> = line.split('|').collect();
            let period = p(fields[0]).to_string();
            let value: f64 = fields[3].parse().unwrap_or(0.0);
            *expected.entry((period, fields[1].to_string())).or_default() += value;
        }

        assert_eq!(table.len(), expected.len());
        for row in table.rows() {
            let key = (row.period.to_string(), row.keys[0].clone());
            assert_eq!(row.values[0], expected[&key], "group {:?}", key);
        }
    }

    #[test]
    fn scale_is_applied_exactly_once() {
        let db = deposits_db();
        let raw = db
            .aggregate(
                &AggregateSpec::new(DEPOSITS)
                    .key(deposits::REGION)
                    .measure(deposits::DEPOSITS, Unit::Units),
            )
            .unwrap();
        let scaled = db
            .aggregate(
                &AggregateSpec::new(DEPOSITS)
                    .key(deposits::REGION)
                    .measure(deposits::DEPOSITS, Unit::Millions),
            )
            .unwrap();
        for (r, s) in raw.rows().iter().zip(scaled.rows()) {
            assert_eq!(r.keys, s.keys);
            assert!((r.values[0] / 1_000_000.0 - s.values[0]).abs() < 1e-9);
        }
    }

    #[test]
    fn period_only_grouping() {
        let db = deposits_db();
        let table = db
            .aggregate(&AggregateSpec::new(DEPOSITS).measure(deposits::LOANS, Unit::Millions))
            .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.keys().is_empty());
        let march = table.get(p("2020-03"), &[]).unwrap();
        assert!((march.values[0] - 101.5).abs() < 1e-9);
    }

    #[test]
    fn multi_key_credit_aggregate() {
        let db = Database::new().unwrap();
        db.load_credit(
            "\
Date|FI_TYPE|LOAN_TYPE|industry_cat|Loans|Loans_new|Debtors
2020-03-31|Banks|Corporate|Mining|1000000|2000|300
2020-03-31|Banks|Corporate|Mining|3000000|1000|700
2020-03-31|Cajas|Small business|Commerce|500000|4000|1500
",
        )
        .unwrap();
        let spec = AggregateSpec::new(CREDIT)
            .key(credit::FI_TYPE)
            .key(credit::LOAN_TYPE)
            .key(credit::INDUSTRY)
            .measure(credit::LOANS, Unit::Millions)
            .measure(credit::NEW_LOANS, Unit::Thousands)
            .measure(credit::DEBTORS, Unit::Thousands);
        let table = db.aggregate(&spec).unwrap();
        assert_eq!(table.len(), 2);
        let mining = table
            .get(p("2020-03"), &["Banks", "Corporate", "Mining"])
            .unwrap();
        assert_eq!(mining.values, vec![4.0, 3.0, 1.0]);
        assert_eq!(
            table.measures(),
            &["loans".to_string(), "loans_new".to_string(), "debtors".to_string()]
        );
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let db = deposits_db();
        let err = db
            .aggregate(&AggregateSpec::new(DEPOSITS).key("region; DROP TABLE deposits"))
            .unwrap_err();
        assert!(matches!(err, LoadError::UnknownColumn { .. }));

        let err = db
            .aggregate(&AggregateSpec::new(INDUSTRY_LOANS).measure("deposits", Unit::Units))
            .unwrap_err();
        assert!(matches!(err, LoadError::UnknownColumn { table: "industry_loans", .. }));
    }

    #[test]
    fn repeated_columns_are_rejected() {
        let db = deposits_db();
        let err = db
            .aggregate(&by_region().measure(deposits::LOANS, Unit::Thousands))
            .unwrap_err();
        assert!(matches!(err, LoadError::UnknownColumn { .. }));
    }

    #[test]
    fn empty_dataset_aggregates_to_empty_table() {
        let db = Database::new().unwrap();
        let table = db.aggregate(&by_region()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.measures().len(), 2);
    }

    #[test]
    fn blank_keys_only_leave_the_groupings_that_use_them() {
        let db = Database::new().unwrap();
        db.load_deposits(
            "\
Date|Region|CODIGO_ENTIDAD_ID|Deposits|Loans
2020-03-31|LIMA|B01|400000000|0
2020-03-31|LIMA||100000000|0
",
        )
        .unwrap();

        let regions = db
            .aggregate(
                &AggregateSpec::new(DEPOSITS)
                    .key(deposits::REGION)
                    .measure(deposits::DEPOSITS, Unit::Millions),
            )
            .unwrap();
        let lima = regions.get(p("2020-03"), &["LIMA"]).unwrap();
        assert!((lima.values[0] - 500.0).abs() < 1e-9);

        let institutions = db
            .aggregate(
                &AggregateSpec::new(DEPOSITS)
                    .key(deposits::REGION)
                    .key(deposits::INSTITUTION_ID)
                    .measure(deposits::DEPOSITS, Unit::Millions),
            )
            .unwrap();
        assert_eq!(institutions.len(), 1);
        assert_eq!(institutions.rows()[0].keys, vec!["LIMA", "B01"]);
    }

    #[test]
    fn query_periods_sorted_ascending() {
        let db = deposits_db();
        assert_eq!(
            db.query_periods(&DEPOSITS).unwrap(),
            vec![p("2020-03"), p("2020-04")]
        );
    }
}
