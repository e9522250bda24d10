//! Column-name constants for the raw datasets and the stored tables.
//! Header names are what the `|`-delimited files carry; column names are
//! what the tables and views expose.

/// Period key shared by every table.
pub const PERIOD: &str = "period";

/// Header holding the raw date in every dataset.
pub const DATE_HEADER: &str = "Date";

// ── Deposits by region and institution (an10) ──────────────────────────────
pub mod deposits {
    pub const TABLE: &str = "deposits";

    pub const REGION: &str = "region";
    pub const INSTITUTION_ID: &str = "institution_id";
    pub const DEPOSITS: &str = "deposits";
    pub const LOANS: &str = "loans";

    pub const REGION_HEADER: &str = "Region";
    pub const INSTITUTION_ID_HEADER: &str = "CODIGO_ENTIDAD_ID";
    pub const DEPOSITS_HEADER: &str = "Deposits";
    pub const LOANS_HEADER: &str = "Loans";
}

// ── Loans by industry category (rep4b2) ────────────────────────────────────
pub mod industry_loans {
    pub const TABLE: &str = "industry_loans";

    pub const INDUSTRY_CATEGORY: &str = "industry_category";
    pub const LOANS: &str = "loans";

    pub const INDUSTRY_CATEGORY_HEADER: &str = "industry_category";
    pub const LOANS_HEADER: &str = "Loans";
}

// ── Credit by institution type, loan type and industry (an03) ──────────────
pub mod credit {
    pub const TABLE: &str = "credit";

    pub const FI_TYPE: &str = "fi_type";
    pub const LOAN_TYPE: &str = "loan_type";
    pub const INDUSTRY: &str = "industry_cat";
    pub const LOANS: &str = "loans";
    pub const NEW_LOANS: &str = "loans_new";
    pub const DEBTORS: &str = "debtors";

    pub const FI_TYPE_HEADER: &str = "FI_TYPE";
    pub const LOAN_TYPE_HEADER: &str = "LOAN_TYPE";
    pub const INDUSTRY_HEADER: &str = "industry_cat";
    pub const LOANS_HEADER: &str = "Loans";
    pub const NEW_LOANS_HEADER: &str = "Loans_new";
    pub const DEBTORS_HEADER: &str = "Debtors";
}

// ── Region boundaries ──────────────────────────────────────────────────────
pub mod boundary {
    /// GeoJSON feature property naming the department.
    pub const REGION_PROPERTY: &str = "NOMBDEP";
}
