//! The financial inclusion dashboard: every named view, wired onto a
//! [`SelectionStore`] over the shared [`Catalog`].
//!
//! | view | reads | source |
//! |---|---|---|
//! | `sum_loans`, `sum_deposits` | period, `include_lima` | regions |
//! | `num_financial_institutions` | period | deposits by institution |
//! | `map_loans`, `map_deposits` | period, `include_lima` | regions |
//! | `loans_by_industry`, `new_loans_by_industry`, `debtors_by_industry` | period, `include_personal_loans` | credit |
//! | `loans_by_industry_category` | period, `include_personal_loans` | loans by industry category |
//! | `loan_per_debtor` | period, `include_personal_loans` | credit |
//! | `loans_by_loan_type` | period | credit |
//!
//! The summary cards and the maps read the same boundary-joined rows, so a
//! region missing from the boundary file counts in neither.

use crate::selection::{Dependency, Reads, Selection, SelectionChange, SelectionError};
use crate::store::SelectionStore;
use fip_core::columns::{credit, deposits, industry_loans};
use fip_core::config::DashboardConfig;
use fip_core::format::{format_count, format_magnitude, Unit};
use fip_core::{AggregateTable, Period, SpatialTable};
use fip_data::{breakdown, filter, ratio, reduce};
use fip_data::{CategoryValue, RatioPoint, RegionMap, ShareSlice};
use fip_db::Catalog;
use serde::Serialize;
use std::sync::Arc;

/// View names.
pub mod views {
    pub const SUM_LOANS: &str = "sum_loans";
    pub const SUM_DEPOSITS: &str = "sum_deposits";
    pub const NUM_FINANCIAL_INSTITUTIONS: &str = "num_financial_institutions";
    pub const MAP_LOANS: &str = "map_loans";
    pub const MAP_DEPOSITS: &str = "map_deposits";
    pub const LOANS_BY_INDUSTRY: &str = "loans_by_industry";
    pub const NEW_LOANS_BY_INDUSTRY: &str = "new_loans_by_industry";
    pub const DEBTORS_BY_INDUSTRY: &str = "debtors_by_industry";
    pub const LOANS_BY_INDUSTRY_CATEGORY: &str = "loans_by_industry_category";
    pub const LOAN_PER_DEBTOR: &str = "loan_per_debtor";
    pub const LOANS_BY_LOAN_TYPE: &str = "loans_by_loan_type";

    pub const ALL: [&str; 11] = [
        SUM_LOANS,
        SUM_DEPOSITS,
        NUM_FINANCIAL_INSTITUTIONS,
        MAP_LOANS,
        MAP_DEPOSITS,
        LOANS_BY_INDUSTRY,
        NEW_LOANS_BY_INDUSTRY,
        DEBTORS_BY_INDUSTRY,
        LOANS_BY_INDUSTRY_CATEGORY,
        LOAN_PER_DEBTOR,
        LOANS_BY_LOAN_TYPE,
    ];
}

/// Toggle names and their defaults.
pub mod toggles {
    /// Keep the excluded region (LIMA) in the map and summary views.
    pub const INCLUDE_LIMA: &str = "include_lima";
    /// Keep the personal/mortgage category in the industry views.
    pub const INCLUDE_PERSONAL_LOANS: &str = "include_personal_loans";

    pub const DEFAULTS: [(&str, bool); 2] = [(INCLUDE_LIMA, true), (INCLUDE_PERSONAL_LOANS, false)];
}

/// A rendered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    /// A formatted card value such as `"500.00 M"`.
    Text { text: String },
    Map(RegionMap),
    Ranked { bars: Vec<CategoryValue> },
    Scatter { points: Vec<RatioPoint> },
    Shares { slices: Vec<ShareSlice> },
}

impl View {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            View::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// One user's dashboard page.
///
/// Pages are independent: two `Dashboard`s over the same catalog keep their
/// own period, toggles and memos.
pub struct Dashboard {
    store: SelectionStore<Catalog, View>,
}

impl Dashboard {
    pub fn new(catalog: Arc<Catalog>, config: DashboardConfig) -> Result<Dashboard, SelectionError> {
        let selection = Selection::new(catalog.periods(), toggles::DEFAULTS)?;
        let mut store = SelectionStore::new(catalog, selection);
        register_views(&mut store, &config)?;
        let view_count = views::ALL.len();
        let period_count = store.selection().periods().len();
        log::info!("dashboard: {view_count} views over {period_count} periods");
        Ok(Dashboard { store })
    }

    pub fn periods(&self) -> &[Period] {
        self.store.selection().periods()
    }

    pub fn period(&self) -> Period {
        self.store.selection().period()
    }

    pub fn selection(&self) -> &Selection {
        self.store.selection()
    }

    /// Select a period; returns the invalidated views.
    pub fn set_period(&mut self, period: Period) -> Result<Vec<String>, SelectionError> {
        self.store.set_period(period)
    }

    pub fn set_toggle(&mut self, name: &str, value: bool) -> Result<Vec<String>, SelectionError> {
        self.store.set_toggle(name, value)
    }

    pub fn apply(&mut self, changes: &[SelectionChange]) -> Result<Vec<String>, SelectionError> {
        self.store.apply(changes)
    }

    pub fn view(&mut self, name: &str) -> anyhow::Result<Arc<View>> {
        self.store.get(name)
    }

    /// Every view for the current selection, in display order.
    pub fn render_all(&mut self) -> anyhow::Result<Vec<(&'static str, Arc<View>)>> {
        let mut rendered = Vec::with_capacity(views::ALL.len());
        for name in views::ALL {
            rendered.push((name, self.store.get(name)?));
        }
        Ok(rendered)
    }

    /// How many times a view has been computed; `None` for unknown names.
    pub fn runs(&self, name: &str) -> Option<usize> {
        self.store.runs(name)
    }
}

fn with_lima() -> Vec<Dependency> {
    vec![Dependency::Period, Dependency::toggle(toggles::INCLUDE_LIMA)]
}

fn with_personal_loans() -> Vec<Dependency> {
    vec![Dependency::Period, Dependency::toggle(toggles::INCLUDE_PERSONAL_LOANS)]
}

fn register_views(
    store: &mut SelectionStore<Catalog, View>,
    config: &DashboardConfig,
) -> Result<(), SelectionError> {
    for (name, measure) in [
        (views::SUM_LOANS, deposits::LOANS),
        (views::SUM_DEPOSITS, deposits::DEPOSITS),
    ] {
        let region = config.excluded_region.clone();
        store.register(name, with_lima(), move |catalog: &Catalog, reads| {
            let rows = regional_shapes(catalog.regions(), reads, &region)?;
            let total = reduce::sum_spatial(&rows, measure)?;
            Ok(View::Text {
                text: format_magnitude(total, Unit::Millions),
            })
        })?;
    }

    store.register(
        views::NUM_FINANCIAL_INSTITUTIONS,
        vec![Dependency::Period],
        |catalog: &Catalog, reads| {
            let rows = filter::select_period(catalog.institutions(), reads.period()?);
            let count = reduce::count_distinct(&rows, deposits::INSTITUTION_ID)?;
            Ok(View::Text {
                text: format_count(count),
            })
        },
    )?;

    for (name, measure, label) in [
        (views::MAP_LOANS, deposits::LOANS, "Loans"),
        (views::MAP_DEPOSITS, deposits::DEPOSITS, "Deposits"),
    ] {
        let region = config.excluded_region.clone();
        store.register(name, with_lima(), move |catalog: &Catalog, reads| {
            let period = reads.period()?;
            let rows = regional_shapes(catalog.regions(), reads, &region)?;
            let title = format!("{label} by Region in Peru ({period})");
            Ok(View::Map(reduce::region_map(&rows, measure, title)?))
        })?;
    }

    for (name, measure) in [
        (views::LOANS_BY_INDUSTRY, credit::LOANS),
        (views::NEW_LOANS_BY_INDUSTRY, credit::NEW_LOANS),
        (views::DEBTORS_BY_INDUSTRY, credit::DEBTORS),
    ] {
        let category = config.excluded_category.clone();
        store.register(name, with_personal_loans(), move |catalog: &Catalog, reads| {
            let rows = industry_rows(catalog.credit_by_industry(), reads, credit::INDUSTRY, &category)?;
            Ok(View::Ranked {
                bars: breakdown::ranked_breakdown(&rows, credit::INDUSTRY, measure)?,
            })
        })?;
    }

    let category = config.excluded_category.clone();
    store.register(
        views::LOANS_BY_INDUSTRY_CATEGORY,
        with_personal_loans(),
        move |catalog: &Catalog, reads| {
            let rows = industry_rows(
                catalog.loans_by_industry_category(),
                reads,
                industry_loans::INDUSTRY_CATEGORY,
                &category,
            )?;
            Ok(View::Ranked {
                bars: breakdown::ranked_breakdown(
                    &rows,
                    industry_loans::INDUSTRY_CATEGORY,
                    industry_loans::LOANS,
                )?,
            })
        },
    )?;

    let category = config.excluded_category.clone();
    let domain = config.ratio_domain;
    store.register(
        views::LOAN_PER_DEBTOR,
        with_personal_loans(),
        move |catalog: &Catalog, reads| {
            let rows = industry_rows(catalog.credit_by_industry(), reads, credit::INDUSTRY, &category)?;
            Ok(View::Scatter {
                points: ratio::ratio_points(
                    &rows,
                    credit::INDUSTRY,
                    credit::LOANS,
                    credit::DEBTORS,
                    &domain,
                )?,
            })
        },
    )?;

    store.register(
        views::LOANS_BY_LOAN_TYPE,
        vec![Dependency::Period],
        |catalog: &Catalog, reads| {
            let rows = filter::select_period(catalog.credit_by_industry(), reads.period()?);
            Ok(View::Shares {
                slices: breakdown::share_breakdown(&rows, credit::LOAN_TYPE, credit::LOANS)?,
            })
        },
    )?;

    Ok(())
}

fn regional_shapes(
    table: &SpatialTable,
    reads: &Reads<'_>,
    excluded_region: &str,
) -> anyhow::Result<SpatialTable> {
    let rows = filter::select_spatial_period(table, reads.period()?);
    if reads.toggle(toggles::INCLUDE_LIMA)? {
        Ok(rows)
    } else {
        Ok(filter::exclude_region(&rows, excluded_region))
    }
}

fn industry_rows(
    table: &AggregateTable,
    reads: &Reads<'_>,
    column: &str,
    excluded_category: &str,
) -> anyhow::Result<AggregateTable> {
    let rows = filter::select_period(table, reads.period()?);
    let include = reads.toggle(toggles::INCLUDE_PERSONAL_LOANS)?;
    Ok(filter::exclude_unless(&rows, include, column, excluded_category)?)
}
