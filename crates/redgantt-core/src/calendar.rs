//! Holiday calendar and gantt date range

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ReversedRange;

/// Non-working day predicate: weekends plus an explicit list of dates.
///
/// The explicit list matches exact dates only; it never widens to a
/// day-of-week rule.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HolidayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: dates.into_iter().collect(),
        }
    }

    /// True for Saturday, Sunday, or any explicitly listed date.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || self.holidays.contains(&date)
    }
}

/// Inclusive date interval the gantt grid spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl GanttRange {
    /// Build a range, rejecting a reversed interval.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReversedRange> {
        if start > end {
            return Err(ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the interval, endpoints included.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterate every date from start to end inclusive.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.day_count() as usize)
    }
}
