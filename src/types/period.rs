//! Inclusive calendar-day periods

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use super::{CostlensError, Result};

/// Inclusive `[start, end]` range of calendar days. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CostlensError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Whole calendar month. `None` for a month outside 1..=12 or an unrepresentable year.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = last_day_of_month(year, month)?;
        Some(Self { start, end })
    }

    /// Calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        // A day that exists always has a representable month around it
        Self::month(date.year(), date.month()).unwrap_or_else(|| Self::single_day(date))
    }

    /// Calendar month before the one containing `date`
    pub fn previous_month_of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        match first.pred_opt() {
            Some(last_of_prev) => Self::month_of(last_of_prev),
            None => Self::month_of(date),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Equal-length window ending the day before `start`.
    ///
    /// This is not the prior calendar month unless `self` is a whole month
    /// of the same length as its predecessor.
    pub fn previous(&self) -> Self {
        let end = self.start - Duration::days(1);
        let start = end - Duration::days(self.days() - 1);
        Self { start, end }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Last calendar day of `month` in `year`
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}
