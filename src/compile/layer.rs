//! Layer compilation.
//!
//! # Algorithm
//!
//! 1. Group the record set's rows by axis value once.
//! 2. For each specification `i` of the group (weight `i + 1`), for each axis
//!    value, resolve an [`Activation`] from that axis value's rows. Each
//!    matching row contributes its own `[start, end]`; several rows yield the
//!    union of their days, so no day between two episodes is marked.
//! 3. Add the weight to every activated `(date, axis value)` cell.
//!
//! Weights are added, never assigned: a cell covered by specifications 1 and
//! 2 holds 3, distinct from either alone. Activations outside the grid's
//! window are skipped without error.
//!
//! # Complexity
//! O(s * n) where s=specifications, n=rows, plus one write per active day.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::{day_stride, EventSpec, LayerCode, LayerGrid, Record, RecordSet, SpecGroup};

/// Dates a specification activates for one axis value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// No matching rows, or no usable start/end date.
    None,
    /// Exactly one day.
    Single(NaiveDate),
    /// Every day of the closed interval `[start, end]`.
    Range { start: NaiveDate, end: NaiveDate },
    /// A set of individual days (column references).
    Dates(BTreeSet<NaiveDate>),
}

impl Activation {
    /// Whether nothing is activated.
    pub fn is_none(&self) -> bool {
        match self {
            Activation::None => true,
            Activation::Dates(d) => d.is_empty(),
            Activation::Range { start, end } => end < start,
            Activation::Single(_) => false,
        }
    }

    /// Activated days in ascending order.
    pub fn days(&self) -> Vec<NaiveDate> {
        match self {
            Activation::None => Vec::new(),
            Activation::Single(d) => vec![*d],
            Activation::Range { start, end } => day_stride(*start, *end).collect(),
            Activation::Dates(d) => d.iter().copied().collect(),
        }
    }
}

/// Resolves what a specification activates, given the rows of one axis value.
///
/// Rows with a null start, a null end (when an end column is configured), or
/// an end before the start activate nothing.
pub fn resolve_activation(rows: &[&Record], spec: &EventSpec) -> Result<Activation> {
    match spec {
        EventSpec::ColumnReference(column) => {
            let dates = RecordSet::dates_in(rows.iter().copied(), column)?;
            Ok(Activation::Dates(dates))
        }
        EventSpec::FilterRange {
            filter_column,
            filter_value,
            start_column,
            end_column,
        } => {
            let mut episodes = Vec::new();
            for row in rows
                .iter()
                .copied()
                .filter(|row| RecordSet::value(row, filter_column).matches_literal(filter_value))
            {
                let Some(start) = RecordSet::date_at(row, start_column)? else {
                    continue;
                };
                let end = match end_column {
                    None => start,
                    Some(end_column) => match RecordSet::date_at(row, end_column)? {
                        Some(end) if end >= start => end,
                        Some(end) => {
                            log::warn!(
                                "'{end_column}' {end} precedes '{start_column}' {start} for \
                                 {filter_column}={filter_value}; row skipped"
                            );
                            continue;
                        }
                        None => continue,
                    },
                };
                episodes.push((start, end));
            }

            Ok(match (episodes.as_slice(), end_column) {
                ([], _) => Activation::None,
                ([(start, _)], None) => Activation::Single(*start),
                ([(start, end)], Some(_)) => Activation::Range {
                    start: *start,
                    end: *end,
                },
                _ => {
                    log::debug!(
                        "{} rows match {filter_column}={filter_value}; marking the union of their days",
                        episodes.len()
                    );
                    Activation::Dates(
                        episodes
                            .iter()
                            .flat_map(|&(start, end)| day_stride(start, end))
                            .collect(),
                    )
                }
            })
        }
    }
}

/// Compiles a specification group into a zero-filled skeleton grid.
///
/// The skeleton fixes the window and the axis values; the returned grid
/// holds, per cell, the sum of the weights of every active specification.
///
/// # Errors
/// `MissingColumn` when the axis key or a referenced column is absent,
/// `NotADate` when a date column holds a non-date value.
pub fn compile_layer(
    records: &RecordSet,
    axis_key: &str,
    group: &SpecGroup,
    mut grid: LayerGrid,
) -> Result<LayerGrid> {
    for spec in group.specs() {
        for column in spec.referenced_columns() {
            records.require_column(column)?;
        }
    }
    let by_axis = records.rows_by_label(axis_key)?;
    let no_rows: Vec<&Record> = Vec::new();

    for (weight, spec) in group.weighted() {
        let mut written = 0usize;
        for axis_value in grid.axis_labels().to_vec() {
            let rows = by_axis.get(&axis_value).unwrap_or(&no_rows);
            let activation = resolve_activation(rows, spec)?;
            if activation.is_none() {
                log::trace!("spec #{weight}: no activation for {axis_key}={axis_value}");
                continue;
            }
            written += apply(&mut grid, &axis_value, &activation, weight);
        }
        log::debug!("spec #{weight} ({spec:?}) wrote {written} cells");
    }
    Ok(grid)
}

/// Adds `weight` to every activated day; returns how many cells were written.
fn apply(grid: &mut LayerGrid, axis_value: &str, activation: &Activation, weight: LayerCode) -> usize {
    let mut written = 0;
    for day in activation.days() {
        if grid.add_weight(day, axis_value, weight) {
            written += 1;
        } else {
            log::trace!("{day} for {axis_value} is outside the window; skipped");
        }
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateWindow, Value};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn records() -> RecordSet {
        RecordSet::new(["id", "kind", "start_date", "end_date", "flagged_date"])
            .with_row([
                ("id", Value::from("A")),
                ("kind", Value::from("dose")),
                ("start_date", Value::from(date(2020, 1, 1))),
                ("end_date", Value::from(date(2020, 1, 3))),
                ("flagged_date", Value::from(date(2020, 1, 2))),
            ])
            .with_row([
                ("id", Value::from("A")),
                ("kind", Value::from("scan")),
                ("start_date", Value::from(date(2020, 1, 2))),
                ("end_date", Value::Null),
                ("flagged_date", Value::Null),
            ])
            .with_row([
                ("id", Value::from("B")),
                ("kind", Value::from("scan")),
                ("start_date", Value::from(date(2020, 1, 4).and_hms_opt(10, 0, 0).unwrap())),
                ("end_date", Value::Null),
                ("flagged_date", Value::Null),
            ])
    }

    fn skeleton() -> LayerGrid {
        let w = DateWindow::new(date(2019, 12, 30), date(2020, 1, 6)).unwrap();
        LayerGrid::zeros(w, vec!["A".into(), "B".into()])
    }

    #[test]
    fn test_column_reference() {
        let group = SpecGroup::new().with_spec(EventSpec::column("flagged_date"));
        let g = compile_layer(&records(), "id", &group, skeleton()).unwrap();
        assert_eq!(g.get(date(2020, 1, 2), "A"), Some(1));
        assert_eq!(g.active_cells(), 1);
    }

    #[test]
    fn test_interval_is_inclusive() {
        let group =
            SpecGroup::new().with_spec(EventSpec::filtered_range("kind", "dose", "start_date", "end_date"));
        let g = compile_layer(&records(), "id", &group, skeleton()).unwrap();
        for d in 1..=3 {
            assert_eq!(g.get(date(2020, 1, d), "A"), Some(1));
        }
        assert_eq!(g.get(date(2020, 1, 4), "A"), Some(0));
        assert_eq!(g.active_cells(), 3); // (D2 - D1).days + 1
    }

    #[test]
    fn test_single_date_and_time_truncation() {
        let group = SpecGroup::new().with_spec(EventSpec::filtered("kind", "scan", "start_date"));
        let g = compile_layer(&records(), "id", &group, skeleton()).unwrap();
        assert_eq!(g.get(date(2020, 1, 2), "A"), Some(1));
        assert_eq!(g.get(date(2020, 1, 4), "B"), Some(1));
        assert_eq!(g.active_cells(), 2);
    }

    #[test]
    fn test_weights_accumulate() {
        let group = SpecGroup::new()
            .with_spec(EventSpec::filtered_range("kind", "dose", "start_date", "end_date"))
            .with_spec(EventSpec::filtered("kind", "scan", "start_date"));
        let g = compile_layer(&records(), "id", &group, skeleton()).unwrap();
        assert_eq!(g.get(date(2020, 1, 1), "A"), Some(1)); // dose only
        assert_eq!(g.get(date(2020, 1, 2), "A"), Some(3)); // dose + scan
        assert_eq!(g.get(date(2020, 1, 4), "B"), Some(2)); // scan only
    }

    #[test]
    fn test_additivity_law() {
        let rs = records();
        let first = EventSpec::filtered_range("kind", "dose", "start_date", "end_date");
        let second = EventSpec::column("flagged_date");

        let both = SpecGroup::from(vec![first.clone(), second.clone()]);
        let combined = compile_layer(&rs, "id", &both, skeleton()).unwrap();

        let alone_first = compile_layer(&rs, "id", &SpecGroup::from(vec![first]), skeleton()).unwrap();
        // Second spec alone, but keeping its weight of 2 via a placeholder first entry
        let placeholder = EventSpec::filtered("kind", "never", "start_date");
        let alone_second = compile_layer(
            &rs,
            "id",
            &SpecGroup::from(vec![placeholder, second]),
            skeleton(),
        )
        .unwrap();

        assert_eq!(Some(combined), alone_first.sum(&alone_second));
    }

    #[test]
    fn test_idempotent() {
        let rs = records();
        let group = SpecGroup::new()
            .with_spec(EventSpec::column("flagged_date"))
            .with_spec(EventSpec::filtered("kind", "scan", "start_date"));
        let a = compile_layer(&rs, "id", &group, skeleton()).unwrap();
        let b = compile_layer(&rs, "id", &group, skeleton()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sparse_axis_value_is_zero() {
        let group =
            SpecGroup::new().with_spec(EventSpec::filtered_range("kind", "dose", "start_date", "end_date"));
        let g = compile_layer(&records(), "id", &group, skeleton()).unwrap();
        let b = g.axis_position("B").unwrap();
        assert!(g.axis_series(b).iter().all(|c| *c == 0));
    }

    #[test]
    fn test_missing_end_is_no_activation() {
        let group =
            SpecGroup::new().with_spec(EventSpec::filtered_range("kind", "scan", "start_date", "end_date"));
        let g = compile_layer(&records(), "id", &group, skeleton()).unwrap();
        assert!(g.is_blank());
    }

    #[test]
    fn test_dates_outside_window_skipped() {
        let w = DateWindow::new(date(2020, 1, 2), date(2020, 1, 2)).unwrap();
        let narrow = LayerGrid::zeros(w, vec!["A".into(), "B".into()]);
        let group =
            SpecGroup::new().with_spec(EventSpec::filtered_range("kind", "dose", "start_date", "end_date"));
        let g = compile_layer(&records(), "id", &group, narrow).unwrap();
        assert_eq!(g.active_cells(), 1);
        assert_eq!(g.get(date(2020, 1, 2), "A"), Some(1));
    }

    #[test]
    fn test_missing_column_fails() {
        let group = SpecGroup::new().with_spec(EventSpec::column("nope_date"));
        assert!(compile_layer(&records(), "id", &group, skeleton()).is_err());
        let group = SpecGroup::new().with_spec(EventSpec::column("flagged_date"));
        assert!(compile_layer(&records(), "cage", &group, skeleton()).is_err());
    }

    #[test]
    fn test_activation_days() {
        let a = Activation::Range {
            start: date(2020, 1, 30),
            end: date(2020, 2, 2),
        };
        assert_eq!(a.days().len(), 4);
        assert!(Activation::None.is_none());
        assert!(Activation::Dates(BTreeSet::new()).is_none());
        assert!(!Activation::Single(date(2020, 1, 1)).is_none());
    }

    fn episodes() -> RecordSet {
        RecordSet::new(["id", "kind", "start_date", "end_date"])
            .with_row([
                ("id", Value::from("A")),
                ("kind", Value::from("dose")),
                ("start_date", Value::from(date(2020, 1, 1))),
                ("end_date", Value::from(date(2020, 1, 2))),
            ])
            .with_row([
                ("id", Value::from("A")),
                ("kind", Value::from("dose")),
                ("start_date", Value::from(date(2020, 1, 10))),
                ("end_date", Value::from(date(2020, 1, 11))),
            ])
            .with_row([
                ("id", Value::from("A")),
                ("kind", Value::from("dose")),
                ("start_date", Value::from(date(2020, 1, 11))),
                ("end_date", Value::from(date(2020, 1, 11))),
            ])
    }

    #[test]
    fn test_separate_episodes_leave_gap_unmarked() {
        let w = DateWindow::new(date(2020, 1, 1), date(2020, 1, 11)).unwrap();
        let group =
            SpecGroup::new().with_spec(EventSpec::filtered_range("kind", "dose", "start_date", "end_date"));
        let g = compile_layer(&episodes(), "id", &group, LayerGrid::zeros(w, vec!["A".into()])).unwrap();

        assert_eq!(g.active_cells(), 4);
        assert_eq!(g.get(date(2020, 1, 5), "A"), Some(0));
        // Overlapping episodes still add the weight once
        assert_eq!(g.get(date(2020, 1, 11), "A"), Some(1));
        assert_eq!(g.max_code(), 1);
    }

    #[test]
    fn test_several_single_dates() {
        let rs = episodes();
        let rows: Vec<&Record> = rs.rows().iter().collect();
        let activation = resolve_activation(&rows, &EventSpec::filtered("kind", "dose", "start_date")).unwrap();
        assert_eq!(
            activation.days(),
            vec![date(2020, 1, 1), date(2020, 1, 10), date(2020, 1, 11)]
        );
    }

    #[test]
    fn test_inverted_interval_is_no_activation() {
        let rs = RecordSet::new(["id", "kind", "start_date", "end_date"]).with_row([
            ("id", Value::from("A")),
            ("kind", Value::from("dose")),
            ("start_date", Value::from(date(2020, 1, 5))),
            ("end_date", Value::from(date(2020, 1, 3))),
        ]);
        let rows: Vec<&Record> = rs.rows().iter().collect();
        let spec = EventSpec::filtered_range("kind", "dose", "start_date", "end_date");
        assert_eq!(resolve_activation(&rows, &spec).unwrap(), Activation::None);

        let group = SpecGroup::new().with_spec(spec);
        let g = compile_layer(&rs, "id", &group, skeleton()).unwrap();
        assert!(g.is_blank());
    }
}
