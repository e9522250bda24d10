//! Region boundaries and the spatial aggregate built from them.
//!
//! Geometry is kept as opaque GeoJSON: nothing here does geometry math, the
//! rendering layer draws it. A geometry is shared between every period row
//! of its region through an `Arc`, so joining N boundaries with M periods
//! clones N x M pointers, not N x M polygons.

use crate::error::TableError;
use crate::period::Period;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A GeoJSON geometry object (`{"type": "Polygon", "coordinates": ...}`).
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(Arc<Value>);

impl Geometry {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    /// The GeoJSON `type` member, if present.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_value().serialize(serializer)
    }
}

/// One region outline, keyed by its exact region name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Boundary {
    pub region: String,
    pub geometry: Geometry,
}

/// One (boundary, period) row of the spatial aggregate.
///
/// `values` follow [`SpatialTable::measures`]; `None` means the region had
/// no aggregate row for this period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialRow {
    pub region: String,
    pub period: Period,
    pub geometry: Geometry,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SpatialTable {
    measures: Vec<String>,
    rows: Vec<SpatialRow>,
}

impl SpatialTable {
    pub fn new(measures: Vec<String>, rows: Vec<SpatialRow>) -> Result<Self, TableError> {
        for (i, row) in rows.iter().enumerate() {
            if row.values.len() != measures.len() {
                return Err(TableError::WidthMismatch {
                    row: i,
                    kind: "measure",
                    expected: measures.len(),
                    found: row.values.len(),
                });
            }
        }
        Ok(Self { measures, rows })
    }

    pub fn measures(&self) -> &[String] {
        &self.measures
    }

    pub fn rows(&self) -> &[SpatialRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn measure_index(&self, name: &str) -> Result<usize, TableError> {
        self.measures
            .iter()
            .position(|m| m == name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    /// Distinct periods, ascending.
    pub fn periods(&self) -> Vec<Period> {
        self.rows
            .iter()
            .map(|r| r.period)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Keep the rows matching `keep`, in their original order.
    pub fn filter<F>(&self, keep: F) -> SpatialTable
    where
        F: Fn(&SpatialRow) -> bool,
    {
        SpatialTable {
            measures: self.measures.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}
