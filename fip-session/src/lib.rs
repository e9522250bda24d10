//! Per-session state for the dashboard.
//!
//! A session holds the user's selection (one period plus a fixed set of
//! boolean toggles) and a [`SelectionStore`] of named derivations over the
//! shared, immutable [`fip_db::Catalog`]. Each derivation declares what it
//! reads; its result is memoized against the values of exactly those
//! inputs, so changing a toggle only recomputes the views that read it.
//!
//! [`Dashboard`] wires the concrete views of the financial inclusion
//! dashboard onto a store.

pub mod dashboard;
pub mod selection;
pub mod store;

pub use dashboard::{Dashboard, View};
pub use selection::{Dependency, InputValue, Reads, Selection, SelectionChange, SelectionError};
pub use store::SelectionStore;
