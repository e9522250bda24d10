//! Derived views over the static aggregates.
//!
//! Every function here is pure: it reads an aggregate (or the spatial
//! aggregate) plus explicit selection values and returns a fresh table,
//! scalar or chart series. Calling one twice with the same inputs returns
//! equal outputs. Empty inputs give empty outputs (zero sums, empty
//! series), never errors; the only error is naming a column the table does
//! not have.
//!
//! Typical chain for a count card:
//!
//! ```rust
//! use fip_core::{AggregateRow, AggregateTable, Period};
//! use fip_data::{filter, reduce};
//!
//! let period = Period::from_date_str("2020-03").unwrap();
//! let table = AggregateTable::new(
//!     vec!["region".into(), "institution_id".into()],
//!     vec!["deposits".into()],
//!     vec![
//!         AggregateRow::new(period, vec!["LIMA".into(), "B1".into()], vec![400.0]),
//!         AggregateRow::new(period, vec!["CUSCO".into(), "B2".into()], vec![100.0]),
//!         AggregateRow::new(period, vec!["CUSCO".into(), "B3".into()], vec![50.0]),
//!     ],
//! )
//! .unwrap();
//!
//! let selected = filter::select_period(&table, period);
//! let without_lima = filter::exclude(&selected, "region", "LIMA").unwrap();
//! assert_eq!(reduce::count_distinct(&without_lima, "institution_id").unwrap(), 2);
//! ```

pub mod breakdown;
pub mod filter;
pub mod models;
pub mod ratio;
pub mod reduce;

pub use models::{CategoryValue, RatioPoint, RegionMap, RegionValue, ShareSlice};
