//! Calendar month keys such as `2025-09`, used to group expenses into monthly reports.

use anyhow::{bail, Context};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A four-digit year and a month, displayed as `YYYY-MM`.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Creates a key, returning `None` unless `month` is in `1..=12` and `year` has four digits.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing `date`.
    pub fn of_date(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month())
    }

    /// The month of the current local date. Reports open on this month by default.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        // chrono dates in the current era always have a valid month
        Self::of_date(today).unwrap_or(Self {
            year: today.year(),
            month: today.month(),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

/// Derives the month of an expense date. Returns `None` when `date` is not a calendar date, which
/// means the expense belongs to no month and shows up in no monthly report.
///
/// Accepts `YYYY-MM-DD` and ISO datetimes, whose date part is used as written.
pub fn month_key_of(date: &str) -> Option<MonthKey> {
    parse_date(date).and_then(MonthKey::of_date)
}

/// Parses an expense date.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let trimmed = date.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once('-')
            .with_context(|| format!("Invalid month '{s}', expected YYYY-MM"))?;
        if year.len() != 4 || month.len() != 2 {
            bail!("Invalid month '{s}', expected YYYY-MM");
        }
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in month '{s}'"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month number in month '{s}'"))?;
        MonthKey::new(year, month).with_context(|| format!("Month '{s}' is out of range"))
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MonthKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> MonthKey {
        MonthKey::from_str(s).unwrap()
    }

    #[test]
    fn test_month_key_of_iso_date() {
        assert_eq!(month_key_of("2025-09-30"), Some(key("2025-09")));
        assert_eq!(month_key_of("2025-01-01"), Some(key("2025-01")));
    }

    #[test]
    fn test_month_key_of_datetime() {
        assert_eq!(month_key_of("2025-09-30T23:30:00"), Some(key("2025-09")));
        assert_eq!(month_key_of("2025-09-01T00:00:00Z"), Some(key("2025-09")));
        assert_eq!(month_key_of("2025-12-31T10:15"), Some(key("2025-12")));
    }

    #[test]
    fn test_month_key_of_invalid() {
        assert_eq!(month_key_of(""), None);
        assert_eq!(month_key_of("   "), None);
        assert_eq!(month_key_of("not-a-date"), None);
        assert_eq!(month_key_of("2025-02-30"), None);
        assert_eq!(month_key_of("2025-13-01"), None);
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(MonthKey::new(2025, 9).unwrap().to_string(), "2025-09");
        assert_eq!(MonthKey::new(987, 12).unwrap().to_string(), "0987-12");
    }

    #[test]
    fn test_from_str_rejects_bad_input() {
        assert!(MonthKey::from_str("2025-9").is_err());
        assert!(MonthKey::from_str("2025-00").is_err());
        assert!(MonthKey::from_str("2025-13").is_err());
        assert!(MonthKey::from_str("202509").is_err());
        assert!(MonthKey::from_str("").is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        assert!(key("2024-12") < key("2025-01"));
        assert!(key("2025-02") < key("2025-10"));
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&key("2025-09")).unwrap();
        assert_eq!(json, "\"2025-09\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key("2025-09"));
    }
}
