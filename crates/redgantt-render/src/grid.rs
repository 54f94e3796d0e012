//! Date grid mapping
//!
//! Walks the configured interval day by day and assigns each date a grid
//! column with its month-boundary and holiday attributes. Column indices
//! are 1-based spreadsheet coordinates; the first day column is H.

use chrono::{Datelike, NaiveDate};
use redgantt_core::{GanttRange, HolidayCalendar};

/// First day column of the gantt grid (column H, 1-based).
pub const GANTT_START_COL: u16 = 8;

/// One per-day column descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridColumn {
    /// 1-based spreadsheet column
    pub index: u16,
    pub date: NaiveDate,
    /// Stamp a month label above the day label for this column
    pub is_month_boundary: bool,
    /// Weekend or explicitly configured holiday
    pub is_holiday: bool,
}

/// Map the inclusive interval to sequential columns starting at
/// [`GANTT_START_COL`].
pub fn map_date_grid(range: &GanttRange, calendar: &HolidayCalendar) -> Vec<GridColumn> {
    range
        .iter_days()
        .enumerate()
        .map(|(offset, date)| GridColumn {
            index: GANTT_START_COL + offset as u16,
            date,
            is_month_boundary: date == range.start() || date.day() == 1,
            is_holiday: calendar.is_holiday(date),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn grid(start: NaiveDate, end: NaiveDate, holidays: Vec<NaiveDate>) -> Vec<GridColumn> {
        let range = GanttRange::new(start, end).unwrap();
        map_date_grid(&range, &HolidayCalendar::new(holidays))
    }

    #[test]
    fn column_count_covers_the_interval_inclusive() {
        let cols = grid(date(2024, 1, 30), date(2024, 2, 2), Vec::new());
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0].date, date(2024, 1, 30));
        assert_eq!(cols[3].date, date(2024, 2, 2));
    }

    #[test]
    fn columns_are_sequential_from_h() {
        let cols = grid(date(2024, 1, 30), date(2024, 2, 2), Vec::new());
        let indices: Vec<u16> = cols.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![8, 9, 10, 11]);
    }

    #[test]
    fn month_boundary_on_first_column_and_first_of_month() {
        let cols = grid(date(2024, 1, 30), date(2024, 2, 2), Vec::new());
        let boundaries: Vec<bool> = cols.iter().map(|c| c.is_month_boundary).collect();
        // 01-30 is the interval start, 02-01 is a first-of-month
        assert_eq!(boundaries, vec![true, false, true, false]);
    }

    #[test]
    fn configured_weekday_holiday_is_flagged() {
        // 2024-02-01 is a Thursday
        let cols = grid(date(2024, 1, 30), date(2024, 2, 2), vec![date(2024, 2, 1)]);
        assert!(cols[2].is_holiday);
        assert!(!cols[1].is_holiday); // Wednesday 01-31, not listed
    }

    #[test]
    fn weekends_are_flagged_without_configuration() {
        // 2024-02-03/04 are Sat/Sun
        let cols = grid(date(2024, 2, 2), date(2024, 2, 5), Vec::new());
        let holidays: Vec<bool> = cols.iter().map(|c| c.is_holiday).collect();
        assert_eq!(holidays, vec![false, true, true, false]);
    }

    #[test]
    fn single_day_grid() {
        let cols = grid(date(2024, 3, 15), date(2024, 3, 15), Vec::new());
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].index, GANTT_START_COL);
        assert!(cols[0].is_month_boundary);
    }
}
