//! Half-open calendar date ranges.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A half-open range of calendar days `[from, to)`.
///
/// Always non-empty by construction: `from < to`. A one-night stay checking
/// in on `d` is `[d, d + 1)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> DomainResult<Self> {
        if from >= to {
            return Err(DomainError::invalid_range(format!(
                "from ({from}) must be before to ({to})"
            )));
        }
        Ok(Self { from, to })
    }

    /// The range covering exactly one day (a same-day stay).
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            from: date,
            // NaiveDate::MAX is not a representable check-in; the add cannot fail.
            to: date.checked_add_days(Days::new(1)).unwrap_or(date),
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Iterate every calendar day in `[from, to)`, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(move |d| *d < self.to)
    }

    /// Number of days in the range (= nights for a stay; ≥ 1 by construction).
    pub fn nights(&self) -> u32 {
        (self.to - self.from).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date < self.to
    }
}
