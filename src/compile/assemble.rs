//! Timetable assembly.
//!
//! # Algorithm
//!
//! 1. Validate the record set against the axis key and both groups.
//! 2. Resolve one window shared by the shade and saturate groups.
//! 3. Enumerate the window day by day and the distinct axis values.
//! 4. Compile each group into its own zero-filled grid.
//! 5. Optionally relabel the date axis as day offsets from the unpadded start.

use chrono::NaiveDate;
use serde::Serialize;

use super::layer::compile_layer;
use super::window::resolve_window;
use crate::error::{Result, TimetableError};
use crate::models::{DateWindow, LayerGrid, RecordSet, SpecGroup};
use crate::validation::validate_input;

/// Default number of padding days on each auto-derived window side.
pub const DEFAULT_PADDING: u32 = 3;

/// Input container for one timetable render.
#[derive(Debug, Clone)]
pub struct TimetableRequest {
    /// Column whose distinct values form the entity axis.
    pub axis_key: String,
    /// Specifications rendered as the shade overlay.
    pub shade: SpecGroup,
    /// Specifications rendered as the saturate overlay.
    pub saturate: SpecGroup,
    /// Days added before the first and after the last referenced date.
    pub padding: u32,
    /// Explicit window start, replacing the auto-derived one.
    pub window_start: Option<NaiveDate>,
    /// Explicit window end, replacing the auto-derived one.
    pub window_end: Option<NaiveDate>,
    /// Label the date axis with day offsets instead of calendar dates.
    pub relative_dates: bool,
}

impl TimetableRequest {
    /// Creates a request with default padding and calendar dates.
    pub fn new(axis_key: impl Into<String>) -> Self {
        Self {
            axis_key: axis_key.into(),
            shade: SpecGroup::new(),
            saturate: SpecGroup::new(),
            padding: DEFAULT_PADDING,
            window_start: None,
            window_end: None,
            relative_dates: false,
        }
    }

    /// Sets the shade group.
    pub fn with_shade(mut self, shade: SpecGroup) -> Self {
        self.shade = shade;
        self
    }

    /// Sets the saturate group.
    pub fn with_saturate(mut self, saturate: SpecGroup) -> Self {
        self.saturate = saturate;
        self
    }

    /// Sets the padding in days.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Sets explicit window bounds; `None` keeps the auto-derived side.
    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    /// Switches the date axis to relative day offsets.
    pub fn with_relative_dates(mut self, relative: bool) -> Self {
        self.relative_dates = relative;
        self
    }
}

/// Labels of the timetable's date axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "labels", rename_all = "snake_case")]
pub enum DateAxis {
    /// Calendar dates, ascending with a one-day stride.
    Calendar(Vec<NaiveDate>),
    /// Day offsets; 0 is the first unpadded day.
    Relative(Vec<i64>),
}

impl DateAxis {
    /// Number of labels.
    pub fn len(&self) -> usize {
        match self {
            DateAxis::Calendar(d) => d.len(),
            DateAxis::Relative(o) => o.len(),
        }
    }

    /// Whether the axis is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display label of the i-th day.
    pub fn label(&self, i: usize) -> Option<String> {
        match self {
            DateAxis::Calendar(d) => d.get(i).map(|d| d.format("%Y-%m-%d").to_string()),
            DateAxis::Relative(o) => o.get(i).map(|o| o.to_string()),
        }
    }
}

/// A compiled timetable: the payload handed to a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timetable {
    /// Column the entity axis was built from.
    pub axis_key: String,
    /// Shared date window.
    pub window: DateWindow,
    /// Padding applied to the auto-derived window.
    pub padding: u32,
    /// Entity labels, one per grid column.
    pub axis_labels: Vec<String>,
    /// Date or offset labels, one per grid row.
    pub date_axis: DateAxis,
    /// Shade group codes.
    pub shade: LayerGrid,
    /// Saturate group codes.
    pub saturate: LayerGrid,
}

impl Timetable {
    /// Number of days covered.
    pub fn num_days(&self) -> usize {
        self.date_axis.len()
    }

    /// Number of entities.
    pub fn num_axis(&self) -> usize {
        self.axis_labels.len()
    }

    /// `(days, entities)` shape shared by both grids.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_days(), self.num_axis())
    }

    /// Serializes the timetable for an external renderer.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builds a timetable from a record set.
///
/// # Errors
/// - `MissingColumn` when the axis key or a specification column is absent.
/// - `EmptyWindow` when no window can be derived.
/// - `InvalidSpec` for other structural problems (see [`validate_input`]).
///
/// # Example
///
/// ```
/// use timetable::compile::{build_timetable, TimetableRequest};
/// use timetable::models::{EventSpec, RecordSet, SpecGroup, Value};
/// use chrono::NaiveDate;
///
/// let day = |d| NaiveDate::from_ymd_opt(2020, 1, d).unwrap();
/// let records = RecordSet::new(["id", "kind", "start_date", "end_date"])
///     .with_row([
///         ("id", Value::from("A")),
///         ("kind", Value::from("dose")),
///         ("start_date", Value::from(day(1))),
///         ("end_date", Value::from(day(3))),
///     ]);
/// let request = TimetableRequest::new("id")
///     .with_saturate(SpecGroup::new().with_spec(
///         EventSpec::filtered_range("kind", "dose", "start_date", "end_date"),
///     ))
///     .with_padding(1);
///
/// let timetable = build_timetable(&records, &request).unwrap();
/// assert_eq!(timetable.shape(), (5, 1));
/// assert_eq!(timetable.saturate.get(day(2), "A"), Some(1));
/// ```
pub fn build_timetable(records: &RecordSet, request: &TimetableRequest) -> Result<Timetable> {
    let groups = [&request.shade, &request.saturate];
    if let Err(errors) = validate_input(records, &request.axis_key, &groups) {
        for e in &errors {
            log::debug!("validation: {}", e.message);
        }
        return Err(errors
            .into_iter()
            .next()
            .map(TimetableError::from)
            .unwrap_or(TimetableError::InvalidSpec("validation failed".into())));
    }

    let window = resolve_window(
        records,
        &groups,
        request.window_start,
        request.window_end,
        request.padding,
    )?;
    let axis_labels = records.distinct_labels(&request.axis_key)?;
    log::debug!(
        "building {}x{} timetable over '{}'",
        window.len_days(),
        axis_labels.len(),
        request.axis_key
    );

    let skeleton = LayerGrid::zeros(window, axis_labels.clone());
    let shade = compile_layer(records, &request.axis_key, &request.shade, skeleton.blank())?;
    let saturate = compile_layer(records, &request.axis_key, &request.saturate, skeleton)?;

    let date_axis = if request.relative_dates {
        DateAxis::Relative(relative_offsets(window.len_days(), request.padding))
    } else {
        DateAxis::Calendar(window.days().collect())
    };

    Ok(Timetable {
        axis_key: request.axis_key.clone(),
        window,
        padding: request.padding,
        axis_labels,
        date_axis,
        shade,
        saturate,
    })
}

/// Day offsets `index - padding` for a window of `len` days.
pub fn relative_offsets(len: usize, padding: u32) -> Vec<i64> {
    let pad = i64::from(padding);
    (0..len as i64).map(|i| i - pad).collect()
}
