//! Period expressions: `YYYY`, `YYYY-YYYY`, comma separated.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PeriodError;

/// Earliest accepted year.
pub const MIN_YEAR: i32 = 1900;

/// Latest accepted year.
pub const MAX_YEAR: i32 = 2100;

/// A parsed period: the sorted set of years plus warnings for dropped parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Sorted distinct years.
    pub years: Vec<i32>,

    /// Why parts of the expression were dropped.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

impl Period {
    /// A single inclusive year range.
    #[must_use]
    pub fn range(from: i32, until: i32) -> Self {
        Self { years: (from.min(until)..=from.max(until)).collect(), warnings: Vec::new() }
    }

    /// First year.
    #[must_use]
    pub fn first_year(&self) -> i32 {
        self.years.first().copied().unwrap_or(MIN_YEAR)
    }

    /// Last year.
    #[must_use]
    pub fn last_year(&self) -> i32 {
        self.years.last().copied().unwrap_or(MAX_YEAR)
    }

    /// Registry `from-pub-date` filter value.
    #[must_use]
    pub fn from_date(&self) -> String {
        format!("{}-01-01", self.first_year())
    }

    /// Registry `until-pub-date` filter value.
    #[must_use]
    pub fn until_date(&self) -> String {
        format!("{}-12-31", self.last_year())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first_year() == self.last_year() {
            write!(f, "{}", self.first_year())
        } else {
            write!(f, "{}-{}", self.first_year(), self.last_year())
        }
    }
}

/// Parse a period expression such as `"2020-2022,2024"`.
///
/// Spaces are ignored. Parts that do not parse, reversed ranges, and years
/// outside 1900–2100 are dropped with a warning. Fails only when no year
/// survives.
pub fn parse_period(expr: &str) -> Result<Period, PeriodError> {
    let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
    let mut years = BTreeSet::new();
    let mut warnings = Vec::new();

    for part in compact.split(',').filter(|p| !p.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            match (start.parse::<i32>(), end.parse::<i32>()) {
                (Ok(s), Ok(e)) if in_range(s) && in_range(e) && s <= e => {
                    years.extend(s..=e);
                }
                (Ok(_), Ok(_)) => {
                    warnings.push(format!(
                        "range '{part}' is outside {MIN_YEAR}-{MAX_YEAR} or reversed"
                    ));
                }
                _ => warnings.push(format!("could not parse range '{part}'")),
            }
        } else {
            match part.parse::<i32>() {
                Ok(y) if in_range(y) => {
                    years.insert(y);
                }
                Ok(y) => warnings.push(format!("year {y} is outside {MIN_YEAR}-{MAX_YEAR}")),
                Err(_) => warnings.push(format!("'{part}' is not a year")),
            }
        }
    }

    for warning in &warnings {
        tracing::warn!(%warning, "Dropped part of period expression");
    }

    if years.is_empty() {
        return Err(PeriodError::NoValidYears { warnings });
    }

    Ok(Period { years: years.into_iter().collect(), warnings })
}

const fn in_range(year: i32) -> bool {
    year >= MIN_YEAR && year <= MAX_YEAR
}
