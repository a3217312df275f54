//! Record set model.
//!
//! A record set is an already-materialized relational table: an ordered list
//! of rows, each mapping column names to [`Value`]s. The schema is generic;
//! nothing here knows about subjects, cages or treatments.
//!
//! # Date Columns
//! Date-valued columns are recognised by name: a column whose name contains
//! the date marker (default `"date"`) holds dates, e.g. `Treatment_start_date`
//! or `FMRIMeasurement_date`.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::Value;
use crate::error::{Result, TimetableError};

/// Default substring identifying date-valued columns.
pub const DEFAULT_DATE_MARKER: &str = "date";

/// One row of a record set.
pub type Record = HashMap<String, Value>;

/// An immutable-by-convention table of event records.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSet {
    /// Declared column names, in declaration order.
    columns: Vec<String>,
    /// Rows; absent keys read as `Null`.
    rows: Vec<Record>,
    /// Substring marking date-valued columns.
    date_marker: String,
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl RecordSet {
    /// Creates an empty record set with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            date_marker: DEFAULT_DATE_MARKER.to_string(),
        }
    }

    /// Sets the substring identifying date-valued columns.
    pub fn with_date_marker(mut self, marker: impl Into<String>) -> Self {
        self.date_marker = marker.into();
        self
    }

    /// Adds a row given as `(column, value)` pairs.
    ///
    /// Columns not yet declared are appended to the schema.
    pub fn with_row<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.push_row(row);
        self
    }

    /// Appends a row given as `(column, value)` pairs.
    pub fn push_row<I, K, V>(&mut self, row: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let record: Record = row
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        for key in record.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(record);
    }

    /// Loads a record set from a JSON array of objects.
    ///
    /// String values in date-marked columns are parsed as dates or
    /// date-times; every other value keeps its JSON type.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_str_with_marker(json, DEFAULT_DATE_MARKER)
    }

    /// Loads a record set from JSON using a custom date marker.
    pub fn from_json_str_with_marker(json: &str, marker: &str) -> Result<Self> {
        let raw: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(json)?;
        let mut set = RecordSet::new(Vec::<String>::new()).with_date_marker(marker);
        for object in &raw {
            let row: Vec<(String, Value)> = object
                .iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v, k.contains(marker))))
                .collect();
            set.push_row(row);
        }
        Ok(set)
    }

    /// Declared column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the record set has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Substring identifying date-valued columns.
    pub fn date_marker(&self) -> &str {
        &self.date_marker
    }

    /// Whether a column exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Fails with `MissingColumn` when a column does not exist.
    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(TimetableError::missing_column(column))
        }
    }

    /// Whether a column is date-valued by naming convention.
    pub fn is_date_column(&self, column: &str) -> bool {
        column.contains(self.date_marker.as_str())
    }

    /// Reads a cell; absent keys read as `Null`.
    pub fn value<'a>(record: &'a Record, column: &str) -> &'a Value {
        static NULL: Value = Value::Null;
        record.get(column).unwrap_or(&NULL)
    }

    /// Normalizes every date-time in date-marked columns to a calendar date.
    ///
    /// Nulls and non-date values are left as they are.
    pub fn truncate_dates(&mut self) {
        let marker = self.date_marker.clone();
        for row in &mut self.rows {
            for (column, value) in row.iter_mut() {
                if column.contains(marker.as_str()) {
                    *value = std::mem::replace(value, Value::Null).truncated();
                }
            }
        }
    }

    /// Distinct non-null values of a column, in order of first appearance.
    ///
    /// Values are compared by their display form, which is how axis labels
    /// are keyed.
    pub fn distinct_labels(&self, column: &str) -> Result<Vec<String>> {
        self.require_column(column)?;
        let mut seen = HashSet::new();
        let mut labels = Vec::new();
        for row in &self.rows {
            let value = Self::value(row, column);
            if value.is_null() {
                continue;
            }
            let label = value.to_string();
            if seen.insert(label.clone()) {
                labels.push(label);
            }
        }
        Ok(labels)
    }

    /// Distinct non-null dates of `column` over the rows accepted by `filter`.
    ///
    /// Returns them sorted ascending. Non-null values that are not dates are
    /// rejected with `NotADate`.
    pub fn distinct_dates<F>(&self, column: &str, filter: F) -> Result<BTreeSet<NaiveDate>>
    where
        F: Fn(&Record) -> bool,
    {
        self.require_column(column)?;
        Self::dates_in(self.rows.iter().filter(|&r| filter(r)), column)
    }

    /// Distinct non-null dates of `column` over an arbitrary row subset.
    pub fn dates_in<'a, I>(rows: I, column: &str) -> Result<BTreeSet<NaiveDate>>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut dates = BTreeSet::new();
        for row in rows {
            if let Some(d) = Self::date_at(row, column)? {
                dates.insert(d);
            }
        }
        Ok(dates)
    }

    /// Reads one cell as a calendar date; `None` for nulls.
    ///
    /// # Errors
    /// `NotADate` when the cell holds a non-null, non-date value.
    pub fn date_at(record: &Record, column: &str) -> Result<Option<NaiveDate>> {
        let value = Self::value(record, column);
        if value.is_null() {
            return Ok(None);
        }
        value.as_date().map(Some).ok_or_else(|| TimetableError::NotADate {
            column: column.to_string(),
            value: value.to_string(),
        })
    }

    /// Rows grouped by the display label of `column`, skipping nulls.
    pub fn rows_by_label(&self, column: &str) -> Result<HashMap<String, Vec<&Record>>> {
        self.require_column(column)?;
        let mut groups: HashMap<String, Vec<&Record>> = HashMap::new();
        for row in &self.rows {
            let value = Self::value(row, column);
            if !value.is_null() {
                groups.entry(value.to_string()).or_default().push(row);
            }
        }
        Ok(groups)
    }
}
