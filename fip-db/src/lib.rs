//! In-memory SQLite layer for the Peru financial inclusion datasets.
//!
//! This crate loads the `|`-delimited deposit, industry and credit files
//! into an in-memory SQLite database, aggregates them with SQL
//! `GROUP BY period, ...` + `SUM(...)` queries, joins the regional
//! aggregate onto the department boundaries and freezes everything into an
//! immutable [`Catalog`].
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper; the database only lives while the
//!   catalog is being built
//! - Loader methods take CSV text so tests and embedded data need no files
//! - Aggregation returns [`fip_core::AggregateTable`]s whose measures are
//!   already scaled into their display unit
//! - The [`Catalog`] owns plain Rust tables and is `Send + Sync`, so one
//!   `Arc<Catalog>` serves every session
//!
//! # Usage
//!
//! ```rust
//! use fip_core::format::Unit;
//! use fip_db::{schema, AggregateSpec, Database};
//!
//! let db = Database::new().unwrap();
//! db.load_deposits("Date|Region|CODIGO_ENTIDAD_ID|Deposits|Loans\n2020-03-31|LIMA|B001|500000000|1000000\n").unwrap();
//!
//! let spec = AggregateSpec::new(schema::DEPOSITS)
//!     .key("region")
//!     .measure("deposits", Unit::Millions);
//! let table = db.aggregate(&spec).unwrap();
//! assert_eq!(table.rows()[0].values, vec![500.0]);
//! ```

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod geo;
mod loader;
pub mod schema;

pub use aggregate::{AggregateSpec, MeasureSpec};
pub use catalog::{Catalog, DatasetCoverage, Sources};
pub use error::LoadError;
pub use geo::JoinReport;
pub use loader::LoadReport;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database holding the raw records.
///
/// Cheaply cloneable (via `Rc`); single-threaded by construction. Nothing
/// outside the catalog build keeps one alive.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    ///
    /// The database is empty after creation; use the `load_*` methods
    /// to populate it.
    pub fn new() -> Result<Self, LoadError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }

    /// Number of raw rows stored for a dataset.
    pub fn count_rows(&self, dataset: &schema::Dataset) -> Result<usize, LoadError> {
        let conn = self.conn.borrow();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", dataset.table),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
