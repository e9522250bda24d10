//! SQL schema and dataset descriptors for the in-memory SQLite database.
//!
//! Each raw dataset lands in one table holding the derived `period` key,
//! its categorical keys and its nullable measures. Raw records repeat keys
//! freely, so the tables carry no primary key; uniqueness only exists after
//! aggregation.

use fip_core::columns::{credit, deposits, industry_loans, DATE_HEADER};

/// A column of a raw dataset: the header in the file and the stored name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub name: &'static str,
}

/// Layout of one `|`-delimited input file and the table it loads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset {
    pub table: &'static str,
    /// Header holding the raw date the period is derived from.
    pub date_header: &'static str,
    pub keys: &'static [Column],
    pub measures: &'static [Column],
}

impl Dataset {
    pub fn has_key(&self, name: &str) -> bool {
        self.keys.iter().any(|c| c.name == name)
    }

    pub fn has_measure(&self, name: &str) -> bool {
        self.measures.iter().any(|c| c.name == name)
    }
}

/// Deposits and loans by region and institution (an10).
pub const DEPOSITS: Dataset = Dataset {
    table: deposits::TABLE,
    date_header: DATE_HEADER,
    keys: &[
        Column {
            header: deposits::REGION_HEADER,
            name: deposits::REGION,
        },
        Column {
            header: deposits::INSTITUTION_ID_HEADER,
            name: deposits::INSTITUTION_ID,
        },
    ],
    measures: &[
        Column {
            header: deposits::DEPOSITS_HEADER,
            name: deposits::DEPOSITS,
        },
        Column {
            header: deposits::LOANS_HEADER,
            name: deposits::LOANS,
        },
    ],
};

/// Loans by industry category (rep4b2).
pub const INDUSTRY_LOANS: Dataset = Dataset {
    table: industry_loans::TABLE,
    date_header: DATE_HEADER,
    keys: &[Column {
        header: industry_loans::INDUSTRY_CATEGORY_HEADER,
        name: industry_loans::INDUSTRY_CATEGORY,
    }],
    measures: &[Column {
        header: industry_loans::LOANS_HEADER,
        name: industry_loans::LOANS,
    }],
};

/// Loans, new loans and debtors by institution type, loan type and industry (an03).
pub const CREDIT: Dataset = Dataset {
    table: credit::TABLE,
    date_header: DATE_HEADER,
    keys: &[
        Column {
            header: credit::FI_TYPE_HEADER,
            name: credit::FI_TYPE,
        },
        Column {
            header: credit::LOAN_TYPE_HEADER,
            name: credit::LOAN_TYPE,
        },
        Column {
            header: credit::INDUSTRY_HEADER,
            name: credit::INDUSTRY,
        },
    ],
    measures: &[
        Column {
            header: credit::LOANS_HEADER,
            name: credit::LOANS,
        },
        Column {
            header: credit::NEW_LOANS_HEADER,
            name: credit::NEW_LOANS,
        },
        Column {
            header: credit::DEBTORS_HEADER,
            name: credit::DEBTORS,
        },
    ],
};

/// All datasets, in load order.
pub const DATASETS: [Dataset; 3] = [DEPOSITS, INDUSTRY_LOANS, CREDIT];

/// Returns the full SQL schema as a single batch string.
///
/// This creates the following tables:
/// - `deposits` - period, region, institution_id, deposits, loans
/// - `industry_loans` - period, industry_category, loans
/// - `credit` - period, fi_type, loan_type, industry_cat, loans, loans_new, debtors
///
/// Measures are nullable `REAL`s: a missing value is stored as NULL and
/// summed as zero by the aggregator. Keys are nullable `TEXT`s: a row with
/// a blank key still counts toward groupings that do not use that key.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS deposits (
        period TEXT NOT NULL,
        region TEXT,
        institution_id TEXT,
        deposits REAL,
        loans REAL
    );
    CREATE INDEX IF NOT EXISTS idx_deposits_period ON deposits(period);

    CREATE TABLE IF NOT EXISTS industry_loans (
        period TEXT NOT NULL,
        industry_category TEXT,
        loans REAL
    );
    CREATE INDEX IF NOT EXISTS idx_industry_loans_period ON industry_loans(period);

    CREATE TABLE IF NOT EXISTS credit (
        period TEXT NOT NULL,
        fi_type TEXT,
        loan_type TEXT,
        industry_cat TEXT,
        loans REAL,
        loans_new REAL,
        debtors REAL
    );
    CREATE INDEX IF NOT EXISTS idx_credit_period ON credit(period);
    "#
}
