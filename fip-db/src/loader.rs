//! Delimited-file loading for populating the in-memory SQLite database.
//!
//! Every dataset file has a header row; columns are located by header name,
//! so extra columns and column order do not matter. The period is derived
//! from the `Date` column by truncating to `YYYY-MM`.
//!
//! # Row handling
//!
//! - Empty date: row skipped and counted
//! - Empty key field: stored as NULL and counted; the row still feeds every
//!   aggregate that does not group by that key, and never forms a group of
//!   its own
//! - Date not starting with `YYYY-MM`: fatal [`LoadError::InvalidPeriod`]
//! - Empty / `NA` / `NaN` / `null` measure: stored as NULL (summed as zero)
//! - Any other non-numeric measure: fatal [`LoadError::InvalidMeasure`]
//! - Wrong number of fields: fatal [`LoadError::Csv`]
//!
//! # Example file
//! ```text
//! Date|Region|CODIGO_ENTIDAD_ID|Deposits|Loans
//! 2020-03-31|LIMA|B001|250000000|120000000
//! 2020-03-31|CUSCO|B002||3500000
//! ```

use crate::error::LoadError;
use crate::schema::{Dataset, CREDIT, DEPOSITS, INDUSTRY_LOANS};
use crate::Database;
use csv::StringRecord;
use fip_core::Period;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use std::path::Path;

/// Default field separator of the published files.
pub const DEFAULT_DELIMITER: u8 = b'|';

/// Spellings treated as a missing measure.
const MISSING_MARKERS: [&str; 6] = ["", "NA", "NaN", "nan", "null", "None"];

/// Row counts from one load call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    /// Rows left out for an empty date.
    pub skipped: usize,
    /// Loaded rows with at least one empty key.
    pub missing_keys: usize,
}

impl Database {
    /// Load deposits by region and institution (an10).
    ///
    /// Expected headers: `Date|Region|CODIGO_ENTIDAD_ID|Deposits|Loans`
    pub fn load_deposits(&self, data: &str) -> Result<LoadReport, LoadError> {
        self.load_dataset(&DEPOSITS, data, DEFAULT_DELIMITER)
    }

    /// Load loans by industry category (rep4b2).
    ///
    /// Expected headers: `Date|industry_category|Loans`
    pub fn load_industry_loans(&self, data: &str) -> Result<LoadReport, LoadError> {
        self.load_dataset(&INDUSTRY_LOANS, data, DEFAULT_DELIMITER)
    }

    /// Load credit by institution type, loan type and industry (an03).
    ///
    /// Expected headers: `Date|FI_TYPE|LOAN_TYPE|industry_cat|Loans|Loans_new|Debtors`
    pub fn load_credit(&self, data: &str) -> Result<LoadReport, LoadError> {
        self.load_dataset(&CREDIT, data, DEFAULT_DELIMITER)
    }

    /// Read a dataset file from disk and load it.
    pub fn load_dataset_file(
        &self,
        dataset: &Dataset,
        path: &Path,
        delimiter: u8,
    ) -> Result<LoadReport, LoadError> {
        let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_dataset(dataset, &data, delimiter)
    }

    /// Parse delimited text and insert every valid row into the dataset's
    /// table inside a single transaction.
    ///
    /// Nothing is committed unless the whole input parses.
    pub fn load_dataset(
        &self,
        dataset: &Dataset,
        data: &str,
        delimiter: u8,
    ) -> Result<LoadReport, LoadError> {
        let csv_err = |source| LoadError::Csv {
            dataset: dataset.table,
            source,
        };
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(data.as_bytes());

        let headers = rdr.headers().map_err(csv_err)?.clone();
        let date_idx = header_index(&headers, dataset, dataset.date_header)?;
        let key_idx = dataset
            .keys
            .iter()
            .map(|c| header_index(&headers, dataset, c.header))
            .collect::<Result<Vec<_>, _>>()?;
        let measure_idx = dataset
            .measures
            .iter()
            .map(|c| header_index(&headers, dataset, c.header))
            .collect::<Result<Vec<_>, _>>()?;

        let sql = insert_sql(dataset);
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let mut report = LoadReport::default();
        {
            let mut stmt = tx.prepare(&sql)?;
            let mut values: Vec<Value> =
                Vec::with_capacity(1 + dataset.keys.len() + dataset.measures.len());

            for result in rdr.records() {
                let r = result.map_err(csv_err)?;
                let line = r.position().map(|p| p.line()).unwrap_or(0);
                values.clear();

                let date = r.get(date_idx).unwrap_or("").trim();
                if date.is_empty() {
                    report.skipped += 1;
                    continue;
                }
                let period = Period::from_date_str(date).map_err(|source| {
                    LoadError::InvalidPeriod {
                        dataset: dataset.table,
                        line,
                        source,
                    }
                })?;
                values.push(Value::Text(period.to_string()));

                let mut missing_key = false;
                for &idx in &key_idx {
                    let key = r.get(idx).unwrap_or("").trim();
                    if key.is_empty() {
                        missing_key = true;
                        values.push(Value::Null);
                    } else {
                        values.push(Value::Text(key.to_string()));
                    }
                }
                if missing_key {
                    report.missing_keys += 1;
                }

                for (column, &idx) in dataset.measures.iter().zip(&measure_idx) {
                    let raw = r.get(idx).unwrap_or("").trim();
                    let value = parse_measure(raw).ok_or_else(|| LoadError::InvalidMeasure {
                        dataset: dataset.table,
                        line,
                        column: column.header,
                        value: raw.to_string(),
                    })?;
                    values.push(value.map(Value::Real).unwrap_or(Value::Null));
                }

                stmt.execute(params_from_iter(values.iter()))?;
                report.loaded += 1;
            }
        }
        tx.commit()?;

        log::info!(
            "loader: Loaded {} {} rows, skipped {} with empty date",
            report.loaded,
            dataset.table,
            report.skipped
        );
        if report.skipped > 0 {
            log::warn!(
                "loader: {} {} rows had an empty date and were left out",
                report.skipped,
                dataset.table
            );
        }
        if report.missing_keys > 0 {
            log::warn!(
                "loader: {} {} rows have an empty key and only count toward totals that ignore it",
                report.missing_keys,
                dataset.table
            );
        }
        Ok(report)
    }
}

fn header_index(
    headers: &StringRecord,
    dataset: &Dataset,
    header: &'static str,
) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h.trim() == header)
        .ok_or(LoadError::MissingColumn {
            dataset: dataset.table,
            column: header,
        })
}

fn insert_sql(dataset: &Dataset) -> String {
    let columns: Vec<&str> = std::iter::once("period")
        .chain(dataset.keys.iter().map(|c| c.name))
        .chain(dataset.measures.iter().map(|c| c.name))
        .collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        dataset.table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// `Some(None)` for a missing marker, `Some(Some(v))` for a finite number,
/// `None` for anything else.
fn parse_measure(raw: &str) -> Option<Option<f64>> {
    if MISSING_MARKERS.contains(&raw) {
        return Some(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(Some(v)),
        _ => None,
    }
}
