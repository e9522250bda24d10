use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Display and storage format of a period: "YYYY-MM".
pub const PERIOD_FORMAT: &str = "%Y-%m";

/// Raised when a date string does not start with a valid `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid period '{0}': expected a date starting with YYYY-MM")]
pub struct ParsePeriodError(pub String);

/// A calendar month, the primary grouping and filter key of every aggregate.
///
/// Internally the first day of the month, so the derived ordering is
/// calendar order.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub struct Period(NaiveDate);

impl Period {
    /// Build a period from a year and a 1-based month.
    pub fn new(year: i32, month: u32) -> Option<Period> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period)
    }

    /// Truncate an ISO-like date string to its month.
    ///
    /// Only the first 7 characters are inspected and they must read `YYYY-MM`,
    /// so `2020-03`, `2020-03-31` and `2020-03-31 00:00:00` all yield 2020-03.
    pub fn from_date_str(s: &str) -> Result<Period, ParsePeriodError> {
        let trimmed = s.trim();
        let invalid = || ParsePeriodError(trimmed.to_string());
        let head = trimmed.get(..7).ok_or_else(invalid)?;
        let bytes = head.as_bytes();
        let digits = |range: &[u8]| range.iter().all(u8::is_ascii_digit);
        if bytes[4] != b'-' || !digits(&bytes[..4]) || !digits(&bytes[5..]) {
            return Err(invalid());
        }
        let year: i32 = head[..4].parse().map_err(|_| invalid())?;
        let month: u32 = head[5..].parse().map_err(|_| invalid())?;
        Period::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(PERIOD_FORMAT))
    }
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::from_date_str(s)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Period::from_date_str(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_year_month() {
        let p = Period::from_date_str("2020-03").unwrap();
        assert_eq!(p, Period::new(2020, 3).unwrap());
        assert_eq!(p.to_string(), "2020-03");
    }

    #[test]
    fn ignores_everything_after_seven_characters() {
        let expected = Period::new(2020, 3).unwrap();
        assert_eq!(Period::from_date_str("2020-03-31").unwrap(), expected);
        assert_eq!(Period::from_date_str("2020-03-31 00:00:00").unwrap(), expected);
        assert_eq!(Period::from_date_str("2020-03-01T12:00:00Z").unwrap(), expected);
        assert_eq!(Period::from_date_str("  2020-03-15  ").unwrap(), expected);
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Period::from_date_str("2020").is_err());
        assert!(Period::from_date_str("20200315").is_err());
        assert!(Period::from_date_str("2020/03/15").is_err());
        assert!(Period::from_date_str("2020-13-01").is_err());
        assert!(Period::from_date_str("2020-00-01").is_err());
        assert!(Period::from_date_str("abcd-ef").is_err());
        assert!(Period::from_date_str("").is_err());
        // Multi-byte input must not panic on the slice boundary.
        assert!(Period::from_date_str("2020-0é").is_err());
    }

    #[test]
    fn orders_by_calendar() {
        let dec = Period::from_date_str("2019-12").unwrap();
        let jan = Period::from_date_str("2020-01").unwrap();
        let feb = Period::from_date_str("2020-02").unwrap();
        let mut periods = vec![feb, dec, jan];
        periods.sort();
        assert_eq!(periods, vec![dec, jan, feb]);
    }

    #[test]
    fn serializes_as_string() {
        let p = Period::new(2019, 1).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"2019-01\"");
        let back: Period = serde_json::from_str("\"2019-01-31\"").unwrap();
        assert_eq!(back, p);
    }
}
