//! Error types for timetable compilation.
//!
//! Schema problems (missing columns, malformed specifications, unparseable
//! window bounds) are fatal. Sparse data is not an error and never reaches
//! this module: absent rows and out-of-window dates leave cells at zero.

use chrono::NaiveDate;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Errors raised while loading inputs or compiling a timetable.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// No date could be resolved from the data and the window was not given
    /// explicitly on both ends.
    #[error("cannot derive a date window: no referenced dates and no explicit bounds")]
    EmptyWindow,

    /// A specification or the axis key references a column the record set lacks.
    #[error("column '{column}' is not present in the record set")]
    MissingColumn { column: String },

    /// Resolved window start lies after its end.
    #[error("window start {start} is after window end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    /// Padding pushes the window past the representable calendar.
    #[error("padding of {padding} days around {date} leaves the supported date range")]
    WindowOverflow { date: NaiveDate, padding: u32 },

    /// Explicit window literal could not be parsed.
    #[error("invalid date literal '{input}' (expected \"YYYY,MM,DD\" or \"YYYY-MM-DD\")")]
    InvalidDate { input: String },

    /// A non-null value that is not a date was read from a date column.
    #[error("column '{column}' holds non-date value '{value}'")]
    NotADate { column: String, value: String },

    /// Malformed specification entry.
    #[error("invalid specification: {0}")]
    InvalidSpec(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration from {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON input (records, specifications or configuration) failed to parse.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TimetableError {
    pub(crate) fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}
