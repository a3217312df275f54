//! Date-window resolution.
//!
//! # Algorithm
//!
//! 1. For every specification of every group, collect the dates it refers to:
//!    all non-null values of a referenced column, or, for a filter range, the
//!    start (and end) column values of rows passing the filter.
//! 2. Without overrides, the window is `[min - padding, max + padding]`.
//! 3. An explicit bound replaces its side outright, unpadded.
//!
//! # Complexity
//! O(s * n) where s=specifications, n=rows.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

use crate::error::{Result, TimetableError};
use crate::models::{DateWindow, EventSpec, RecordSet, SpecGroup};

/// Dates a single specification refers to, across all axis values.
pub fn referenced_dates(records: &RecordSet, spec: &EventSpec) -> Result<BTreeSet<NaiveDate>> {
    match spec {
        EventSpec::ColumnReference(column) => records.distinct_dates(column, |_| true),
        EventSpec::FilterRange {
            filter_column,
            filter_value,
            ..
        } => {
            records.require_column(filter_column)?;
            let mut dates = BTreeSet::new();
            for column in spec.date_columns() {
                dates.extend(records.distinct_dates(column, |row| {
                    RecordSet::value(row, filter_column).matches_literal(filter_value)
                })?);
            }
            Ok(dates)
        }
    }
}

/// Resolves the shared date window for a set of specification groups.
///
/// # Errors
/// - `EmptyWindow` when no date is referenced and a bound is not explicit.
/// - `InvalidWindow` when the resolved start lies after the resolved end.
/// - `WindowOverflow` when padding moves a bound outside chrono's date range.
/// - `MissingColumn` / `NotADate` from scanning the record set.
pub fn resolve_window(
    records: &RecordSet,
    groups: &[&SpecGroup],
    explicit_start: Option<NaiveDate>,
    explicit_end: Option<NaiveDate>,
    padding: u32,
) -> Result<DateWindow> {
    let mut dates = BTreeSet::new();
    for group in groups {
        for spec in group.specs() {
            dates.extend(referenced_dates(records, spec)?);
        }
    }

    let pad = Duration::days(i64::from(padding));
    let first = dates.first().copied();
    let last = dates.last().copied();

    let overflow = |date: NaiveDate| TimetableError::WindowOverflow { date, padding };

    let start = match explicit_start {
        Some(d) => d,
        None => {
            let first = first.ok_or(TimetableError::EmptyWindow)?;
            first.checked_sub_signed(pad).ok_or_else(|| overflow(first))?
        }
    };
    let end = match explicit_end {
        Some(d) => d,
        None => {
            let last = last.ok_or(TimetableError::EmptyWindow)?;
            last.checked_add_signed(pad).ok_or_else(|| overflow(last))?
        }
    };

    let window = DateWindow::new(start, end)?;
    log::debug!(
        "resolved window {}..={} ({} days) from {} referenced dates",
        window.start,
        window.end,
        window.len_days(),
        dates.len()
    );
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn records() -> RecordSet {
        RecordSet::new(["id", "kind", "start_date", "end_date", "scan_date"])
            .with_row([
                ("id", Value::from("A")),
                ("kind", Value::from("dose")),
                ("start_date", Value::from(date(2020, 1, 10))),
                ("end_date", Value::from(date(2020, 1, 12))),
                ("scan_date", Value::Null),
            ])
            .with_row([
                ("id", Value::from("B")),
                ("kind", Value::from("sham")),
                ("start_date", Value::from(date(2019, 6, 1))),
                ("end_date", Value::from(date(2019, 6, 2))),
                ("scan_date", Value::from(date(2020, 1, 15).and_hms_opt(16, 45, 0).unwrap())),
            ])
    }

    #[test]
    fn test_padding_applied_to_both_sides() {
        let rs = records();
        let shade = SpecGroup::new().with_spec(EventSpec::filtered_range(
            "kind",
            "dose",
            "start_date",
            "end_date",
        ));
        let saturate = SpecGroup::new().with_spec(EventSpec::column("scan_date"));

        let w = resolve_window(&rs, &[&shade, &saturate], None, None, 3).unwrap();
        assert_eq!(w.start, date(2020, 1, 7));
        assert_eq!(w.end, date(2020, 1, 18));
    }

    #[test]
    fn test_filter_excludes_other_rows() {
        let rs = records();
        let spec = EventSpec::filtered("kind", "dose", "start_date");
        let dates = referenced_dates(&rs, &spec).unwrap();
        assert_eq!(dates.into_iter().collect::<Vec<_>>(), vec![date(2020, 1, 10)]);
    }

    #[test]
    fn test_explicit_bounds_are_not_padded() {
        let rs = records();
        let group = SpecGroup::new().with_spec(EventSpec::column("scan_date"));
        let w = resolve_window(&rs, &[&group], Some(date(2020, 1, 1)), None, 2).unwrap();
        assert_eq!(w.start, date(2020, 1, 1));
        assert_eq!(w.end, date(2020, 1, 17));

        let w = resolve_window(
            &rs,
            &[&group],
            Some(date(2020, 1, 1)),
            Some(date(2020, 1, 31)),
            2,
        )
        .unwrap();
        assert_eq!(w.len_days(), 31);
    }

    #[test]
    fn test_empty_window_error() {
        let rs = records();
        let group = SpecGroup::new().with_spec(EventSpec::filtered("kind", "nothing", "start_date"));
        assert!(matches!(
            resolve_window(&rs, &[&group], None, None, 3),
            Err(TimetableError::EmptyWindow)
        ));
        // One explicit side is not enough
        assert!(matches!(
            resolve_window(&rs, &[&group], Some(date(2020, 1, 1)), None, 3),
            Err(TimetableError::EmptyWindow)
        ));
        // Both sides explicit: no data needed
        assert!(resolve_window(
            &rs,
            &[&group],
            Some(date(2020, 1, 1)),
            Some(date(2020, 1, 2)),
            3
        )
        .is_ok());
    }

    #[test]
    fn test_missing_column_fails_fast() {
        let rs = records();
        let group = SpecGroup::new().with_spec(EventSpec::column("missing_date"));
        assert!(matches!(
            resolve_window(&rs, &[&group], None, None, 3),
            Err(TimetableError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_inverted_explicit_window() {
        let rs = records();
        let group = SpecGroup::new().with_spec(EventSpec::column("scan_date"));
        assert!(matches!(
            resolve_window(&rs, &[&group], Some(date(2021, 1, 1)), None, 0),
            Err(TimetableError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_huge_padding_is_an_error() {
        let rs = records();
        let group = SpecGroup::new().with_spec(EventSpec::filtered("kind", "dose", "start_date"));
        assert!(matches!(
            resolve_window(&rs, &[&group], None, None, 200_000_000),
            Err(TimetableError::WindowOverflow { padding: 200_000_000, .. })
        ));
        // Only the padded side can overflow
        assert!(matches!(
            resolve_window(&rs, &[&group], Some(date(2020, 1, 1)), None, 200_000_000),
            Err(TimetableError::WindowOverflow { date: d, .. }) if d == date(2020, 1, 10)
        ));
    }
}
