//! Calendar date windows.
//!
//! # Time Model
//! Timetables work at day resolution. A window is a closed interval of
//! calendar dates: both `start` and `end` are covered, and the day sequence
//! steps by exactly one day with no gaps across month or year boundaries.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::value::parse_date_text;
use crate::error::{Result, TimetableError};

/// An inclusive calendar date range `[start, end]`.
///
/// [`DateWindow::new`] enforces `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    /// First covered day.
    pub start: NaiveDate,
    /// Last covered day (inclusive).
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TimetableError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of covered days.
    #[inline]
    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Whether a date lies inside the window.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Zero-based day index of a date, or `None` outside the window.
    #[inline]
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.start).num_days() as usize)
        } else {
            None
        }
    }

    /// Every covered day in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        day_stride(self.start, self.end)
    }
}

/// Walks `start, start + 1 day, ... end` inclusive. Empty when `end < start`.
pub fn day_stride(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let mut current = Some(start);
    std::iter::from_fn(move || {
        let day = current.filter(|d| *d <= end)?;
        current = day.checked_add_signed(Duration::days(1));
        Some(day)
    })
}

/// Parses an explicit window bound such as `"2016,12,18"` or `"2016-12-18"`.
pub fn parse_window_date(input: &str) -> Result<NaiveDate> {
    parse_date_text(input).ok_or_else(|| TimetableError::InvalidDate {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_inclusive() {
        let w = DateWindow::new(date(2020, 1, 7), date(2020, 1, 18)).unwrap();
        assert_eq!(w.len_days(), 12);
        assert!(w.contains(date(2020, 1, 7)));
        assert!(w.contains(date(2020, 1, 18))); // inclusive end
        assert!(!w.contains(date(2020, 1, 19)));
        assert_eq!(w.index_of(date(2020, 1, 10)), Some(3));
        assert_eq!(w.index_of(date(2020, 1, 6)), None);
    }

    #[test]
    fn test_reversed_window_rejected() {
        assert!(matches!(
            DateWindow::new(date(2020, 2, 1), date(2020, 1, 1)),
            Err(TimetableError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_day_stride_crosses_year_boundary() {
        let days: Vec<NaiveDate> = day_stride(date(2019, 12, 30), date(2020, 1, 2)).collect();
        assert_eq!(
            days,
            vec![date(2019, 12, 30), date(2019, 12, 31), date(2020, 1, 1), date(2020, 1, 2)]
        );
        assert!(days.windows(2).all(|w| w[1] - w[0] == Duration::days(1)));
    }

    #[test]
    fn test_day_stride_leap_day() {
        let days: Vec<NaiveDate> = day_stride(date(2020, 2, 28), date(2020, 3, 1)).collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days[1], date(2020, 2, 29));
    }

    #[test]
    fn test_day_stride_empty_when_reversed() {
        assert_eq!(day_stride(date(2020, 1, 2), date(2020, 1, 1)).count(), 0);
    }

    #[test]
    fn test_parse_window_date() {
        assert_eq!(parse_window_date("2016,12,18").unwrap(), date(2016, 12, 18));
        assert_eq!(parse_window_date("2016-12-18").unwrap(), date(2016, 12, 18));
        assert!(matches!(
            parse_window_date("18.12.2016"),
            Err(TimetableError::InvalidDate { .. })
        ));
    }
}
