//! Human-readable magnitudes for the summary cards.
//!
//! Values reaching these functions are already expressed in their display
//! unit (the aggregator divides once). Formatting never rescales; it only
//! rounds, groups thousands and appends the unit suffix.

use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};

/// Decimal places shown on scalar cards.
pub const SCALAR_DECIMALS: usize = 2;

/// Display unit of an aggregated measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Units,
    Thousands,
    Millions,
}

impl Unit {
    /// Divisor the aggregator applies to raw sums to land in this unit.
    pub fn scale(&self) -> f64 {
        match self {
            Unit::Units => 1.0,
            Unit::Thousands => 1_000.0,
            Unit::Millions => 1_000_000.0,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Units => "",
            Unit::Thousands => "K",
            Unit::Millions => "M",
        }
    }
}

/// Format an already-scaled value: `1234.5` in millions -> `"1,234.50 M"`.
pub fn format_magnitude(value: f64, unit: Unit) -> String {
    let number = format_grouped(value, SCALAR_DECIMALS);
    match unit.suffix() {
        "" => number,
        suffix => format!("{number} {suffix}"),
    }
}

/// Format a count with thousands grouping: `12345` -> `"12,345"`.
pub fn format_count(count: usize) -> String {
    count.to_formatted_string(&Locale::en)
}

/// Round to `decimals` places and insert `,` between thousands groups.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let abs = value.abs();
    let fixed = format!("{abs:.decimals$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = match int_part.parse::<u128>() {
        Ok(int) => int.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };

    let mut out = String::with_capacity(grouped.len() + decimals + 2);
    // "-0.00" reads as noise on a card.
    if value.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}
