//! Row filters applied before any reduction.

use fip_core::{AggregateTable, Period, SpatialTable, TableError};

/// Rows whose period equals `period` exactly.
pub fn select_period(table: &AggregateTable, period: Period) -> AggregateTable {
    table.filter(|row| row.period == period)
}

/// Rows whose `column` key is not `value`.
///
/// Fails only if the table has no such key column.
pub fn exclude(
    table: &AggregateTable,
    column: &str,
    value: &str,
) -> Result<AggregateTable, TableError> {
    let idx = table.key_index(column)?;
    Ok(table.filter(|row| row.keys[idx] != value))
}

/// Like [`exclude`], applied only when `include` is false.
pub fn exclude_unless(
    table: &AggregateTable,
    include: bool,
    column: &str,
    value: &str,
) -> Result<AggregateTable, TableError> {
    if include {
        // Still reject a bad column name so a typo does not hide behind the toggle.
        table.key_index(column)?;
        Ok(table.clone())
    } else {
        exclude(table, column, value)
    }
}

/// Spatial rows for one period.
pub fn select_spatial_period(table: &SpatialTable, period: Period) -> SpatialTable {
    table.filter(|row| row.period == period)
}

/// Spatial rows for every region except `region`.
pub fn exclude_region(table: &SpatialTable, region: &str) -> SpatialTable {
    table.filter(|row| row.region != region)
}
