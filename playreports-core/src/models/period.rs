//! Report month arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ReportsError;

/// Calendar month a report set belongs to.
///
/// Stored as the first day of the month so that arithmetic never has to
/// deal with day overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportMonth(NaiveDate);

impl ReportMonth {
    /// Returns the month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Creates a month from its year and 1-based month number.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Returns the current month in local time.
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    /// The `YYYYMM` key used in report object names.
    pub fn key(&self) -> String {
        self.0.format("%Y%m").to_string()
    }

    /// The following month.
    ///
    /// Sales reports for a period are published in the month after it.
    /// Returns `None` past the last representable month.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for ReportMonth {
    type Err = ReportsError;

    /// Accepts `YYYY-MM-DD`, `YYYY-MM` and `YYYYMM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        for candidate in [format!("{s}-01"), format!("{s}01")] {
            if let Ok(date) = NaiveDate::parse_from_str(&candidate, "%Y-%m-%d") {
                return Ok(Self::from_date(date));
            }
            if let Ok(date) = NaiveDate::parse_from_str(&candidate, "%Y%m%d") {
                return Ok(Self::from_date(date));
            }
        }
        Err(ReportsError::Configuration(format!(
            "invalid report date '{s}', expected YYYY-MM-DD, YYYY-MM or YYYYMM"
        )))
    }
}
