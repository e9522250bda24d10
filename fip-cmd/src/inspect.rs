use crate::load_catalog;
use fip_core::config::Config;
use fip_core::Period;
use fip_db::{DatasetCoverage, JoinReport};
use log::{info, warn};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PeriodList {
    default: Period,
    periods: Vec<Period>,
}

#[derive(Serialize)]
struct DatasetSummary {
    dataset: &'static str,
    rows: usize,
    skipped: usize,
    missing_keys: usize,
    periods: usize,
    first_period: Option<Period>,
    last_period: Option<Period>,
}

impl From<&DatasetCoverage> for DatasetSummary {
    fn from(coverage: &DatasetCoverage) -> Self {
        Self {
            dataset: coverage.dataset,
            rows: coverage.rows,
            skipped: coverage.report.skipped,
            missing_keys: coverage.report.missing_keys,
            periods: coverage.periods.len(),
            first_period: coverage.periods.first().copied(),
            last_period: coverage.periods.last().copied(),
        }
    }
}

#[derive(Serialize)]
struct CheckReport<'a> {
    periods: usize,
    first_period: Period,
    last_period: Period,
    boundaries: usize,
    deposits_by_region: usize,
    institutions: usize,
    loans_by_industry_category: usize,
    credit_by_industry: usize,
    datasets: Vec<DatasetSummary>,
    join: &'a JoinReport,
}

pub fn run_periods<W: Write>(config: &Config, out: &mut W) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let list = PeriodList {
        default: catalog.default_period(),
        periods: catalog.periods().to_vec(),
    };
    serde_json::to_writer_pretty(out, &list)?;
    Ok(())
}

pub fn run_check<W: Write>(config: &Config, out: &mut W) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let periods = catalog.periods();
    let first_period = catalog.default_period();
    let report = CheckReport {
        periods: periods.len(),
        first_period,
        last_period: periods.last().copied().unwrap_or(first_period),
        boundaries: catalog.boundaries().len(),
        deposits_by_region: catalog.deposits_by_region().len(),
        institutions: catalog.institutions().len(),
        loans_by_industry_category: catalog.loans_by_industry_category().len(),
        credit_by_industry: catalog.credit_by_industry().len(),
        datasets: catalog.coverage().iter().map(DatasetSummary::from).collect(),
        join: catalog.join_report(),
    };
    for dataset in &report.datasets {
        match dataset.last_period {
            Some(last) if last == report.last_period => {}
            Some(last) => warn!(
                "{} ends at {}, deposits at {}",
                dataset.dataset, last, report.last_period
            ),
            None => warn!("{} has no rows", dataset.dataset),
        }
    }
    if report.join.is_clean() {
        info!("Every region matched a boundary");
    } else {
        warn!(
            "{} region(s) without a boundary, {} boundary(ies) without data",
            report.join.unmatched_regions.len(),
            report.join.boundaries_without_data.len()
        );
    }
    serde_json::to_writer_pretty(out, &report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixture_config;
    use serde_json::Value;

    #[test]
    fn lists_fixture_periods() {
        let mut out = Vec::new();
        run_periods(&fixture_config(), &mut out).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["default"], "2020-01");
        assert_eq!(
            json["periods"],
            serde_json::json!(["2020-01", "2020-02", "2020-03"])
        );
    }

    #[test]
    fn check_reports_boundaries_without_data() {
        let mut out = Vec::new();
        run_check(&fixture_config(), &mut out).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["boundaries"], 5);
        assert_eq!(json["periods"], 3);
        assert_eq!(json["last_period"], "2020-03");
        assert_eq!(json["join"]["boundaries_without_data"], serde_json::json!(["LORETO"]));
        assert_eq!(json["join"]["unmatched_regions"], serde_json::json!([]));
    }

    #[test]
    fn check_reports_each_dataset() {
        let mut out = Vec::new();
        run_check(&fixture_config(), &mut out).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();
        let datasets = json["datasets"].as_array().unwrap();
        assert_eq!(datasets.len(), 3);
        assert_eq!(datasets[0]["dataset"], "deposits");
        assert_eq!(datasets[0]["rows"], 27);
        assert_eq!(datasets[1]["dataset"], "industry_loans");
        assert_eq!(datasets[1]["rows"], 18);
        assert_eq!(datasets[2]["dataset"], "credit");
        assert_eq!(datasets[2]["rows"], 22);
        for dataset in datasets {
            assert_eq!(dataset["periods"], 3);
            assert_eq!(dataset["first_period"], "2020-01");
            assert_eq!(dataset["last_period"], "2020-03");
            assert_eq!(dataset["skipped"], 0);
        }
    }
}
