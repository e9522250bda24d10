//! The immutable context every session reads from.
//!
//! A [`Catalog`] is built once at startup: the raw files are loaded into a
//! throwaway [`Database`], aggregated, joined onto the boundaries and copied
//! out into plain tables. After construction nothing mutates it, so one
//! `Arc<Catalog>` is shared by all sessions without locking.
//!
//! # Canonical pipeline
//!
//! | table | dataset | keys | measures (unit) |
//! |---|---|---|---|
//! | `deposits_by_region` | an10 | region | deposits (M), loans (M) |
//! | `institutions` | an10 | region, institution_id | deposits (M) |
//! | `regions` | boundaries x `deposits_by_region` | region | deposits (M), loans (M) |
//! | `loans_by_industry_category` | rep4b2 | industry_category | loans (M), ranked |
//! | `credit_by_industry` | an03 | fi_type, loan_type, industry_cat | loans (M), loans_new (K), debtors (K) |

use crate::aggregate::AggregateSpec;
use crate::error::LoadError;
use crate::geo::{join_boundaries, parse_boundaries, JoinReport};
use crate::loader::{LoadReport, DEFAULT_DELIMITER};
use crate::schema::{Dataset, CREDIT, DEPOSITS, INDUSTRY_LOANS};
use crate::Database;
use fip_core::columns::{boundary, credit, deposits, industry_loans};
use fip_core::config::DataConfig;
use fip_core::format::Unit;
use fip_core::{AggregateTable, Boundary, Period, SpatialTable};
use std::path::Path;

/// Raw contents of the four inputs.
#[derive(Debug, Clone, Copy)]
pub struct Sources<'a> {
    pub deposits: &'a str,
    pub industry_loans: &'a str,
    pub credit: &'a str,
    pub boundaries: &'a str,
    pub delimiter: u8,
    pub region_property: &'a str,
}

impl<'a> Sources<'a> {
    /// Sources in the published format (`|` delimiter, `NOMBDEP` names).
    pub fn new(deposits: &'a str, industry_loans: &'a str, credit: &'a str, boundaries: &'a str) -> Self {
        Self {
            deposits,
            industry_loans,
            credit,
            boundaries,
            delimiter: DEFAULT_DELIMITER,
            region_property: boundary::REGION_PROPERTY,
        }
    }
}

/// What one raw dataset contributed: load counts and the periods it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCoverage {
    pub dataset: &'static str,
    pub report: LoadReport,
    pub rows: usize,
    /// Distinct periods in the raw rows, ascending.
    pub periods: Vec<Period>,
}

impl DatasetCoverage {
    fn collect(db: &Database, dataset: &Dataset, report: LoadReport) -> Result<Self, LoadError> {
        Ok(Self {
            dataset: dataset.table,
            report,
            rows: db.count_rows(dataset)?,
            periods: db.query_periods(dataset)?,
        })
    }
}

/// Static aggregates shared read-only by every session.
#[derive(Debug, Clone)]
pub struct Catalog {
    periods: Vec<Period>,
    coverage: Vec<DatasetCoverage>,
    deposits_by_region: AggregateTable,
    institutions: AggregateTable,
    regions: SpatialTable,
    loans_by_industry_category: AggregateTable,
    credit_by_industry: AggregateTable,
    boundaries: Vec<Boundary>,
    join_report: JoinReport,
}

impl Catalog {
    /// Read the four files named by `config` and build the catalog.
    ///
    /// Any missing or malformed file aborts the whole load.
    pub fn load(config: &DataConfig) -> Result<Catalog, LoadError> {
        let db = Database::new()?;
        let delimiter = config.delimiter_byte();
        let mut reports = Vec::with_capacity(3);
        for (dataset, path) in [
            (DEPOSITS, config.deposits_path()),
            (INDUSTRY_LOANS, config.industry_loans_path()),
            (CREDIT, config.credit_path()),
        ] {
            reports.push((dataset, db.load_dataset_file(&dataset, &path, delimiter)?));
        }
        let boundaries = read(&config.boundaries_path())?;
        log::info!("catalog: Read input files from {}", config.data_dir.display());

        Catalog::build(&db, &reports, &boundaries, &config.region_property)
    }

    /// Build the catalog from in-memory inputs.
    pub fn from_sources(sources: &Sources<'_>) -> Result<Catalog, LoadError> {
        let db = Database::new()?;
        let mut reports = Vec::with_capacity(3);
        for (dataset, data) in [
            (DEPOSITS, sources.deposits),
            (INDUSTRY_LOANS, sources.industry_loans),
            (CREDIT, sources.credit),
        ] {
            reports.push((dataset, db.load_dataset(&dataset, data, sources.delimiter)?));
        }
        Catalog::build(&db, &reports, sources.boundaries, sources.region_property)
    }

    /// Aggregate a loaded database and join it onto the boundaries.
    fn build(
        db: &Database,
        reports: &[(Dataset, LoadReport)],
        boundaries: &str,
        region_property: &str,
    ) -> Result<Catalog, LoadError> {
        let coverage = reports
            .iter()
            .map(|(dataset, report)| DatasetCoverage::collect(db, dataset, *report))
            .collect::<Result<Vec<_>, _>>()?;

        let deposits_by_region = db.aggregate(
            &AggregateSpec::new(DEPOSITS)
                .key(deposits::REGION)
                .measure(deposits::DEPOSITS, Unit::Millions)
                .measure(deposits::LOANS, Unit::Millions),
        )?;
        let institutions = db.aggregate(
            &AggregateSpec::new(DEPOSITS)
                .key(deposits::REGION)
                .key(deposits::INSTITUTION_ID)
                .measure(deposits::DEPOSITS, Unit::Millions),
        )?;
        let loans_by_industry_category = db
            .aggregate(
                &AggregateSpec::new(INDUSTRY_LOANS)
                    .key(industry_loans::INDUSTRY_CATEGORY)
                    .measure(industry_loans::LOANS, Unit::Millions),
            )?
            .ranked_by(industry_loans::LOANS)?;
        let credit_by_industry = db.aggregate(
            &AggregateSpec::new(CREDIT)
                .key(credit::FI_TYPE)
                .key(credit::LOAN_TYPE)
                .key(credit::INDUSTRY)
                .measure(credit::LOANS, Unit::Millions)
                .measure(credit::NEW_LOANS, Unit::Thousands)
                .measure(credit::DEBTORS, Unit::Thousands),
        )?;

        let boundaries = parse_boundaries(boundaries, region_property)?;
        let (regions, join_report) =
            join_boundaries(&boundaries, &deposits_by_region, deposits::REGION)?;

        let periods = deposits_by_region.periods();
        if periods.is_empty() {
            return Err(LoadError::NoPeriods(DEPOSITS.table));
        }
        log::info!(
            "catalog: {} periods from {} to {}",
            periods.len(),
            periods[0],
            periods[periods.len() - 1]
        );

        Ok(Catalog {
            periods,
            coverage,
            deposits_by_region,
            institutions,
            regions,
            loans_by_industry_category,
            credit_by_industry,
            boundaries,
            join_report,
        })
    }

    /// Selectable periods, ascending; never empty.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Per-dataset load counts and period ranges, in load order.
    pub fn coverage(&self) -> &[DatasetCoverage] {
        &self.coverage
    }

    /// Earliest selectable period.
    pub fn default_period(&self) -> Period {
        self.periods[0]
    }

    pub fn deposits_by_region(&self) -> &AggregateTable {
        &self.deposits_by_region
    }

    /// Deposits per (region, institution); the source of institution counts.
    pub fn institutions(&self) -> &AggregateTable {
        &self.institutions
    }

    /// Boundaries x periods with deposit and loan totals.
    pub fn regions(&self) -> &SpatialTable {
        &self.regions
    }

    pub fn loans_by_industry_category(&self) -> &AggregateTable {
        &self.loans_by_industry_category
    }

    pub fn credit_by_industry(&self) -> &AggregateTable {
        &self.credit_by_industry
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn join_report(&self) -> &JoinReport {
        &self.join_report
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
