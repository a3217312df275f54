//! Timetable configuration.
//!
//! A configuration file describes one render: which column forms the entity
//! axis, the shade and saturate groups, padding, optional window overrides
//! and whether to use relative day labels.
//!
//! ```json
//! {
//!   "axis_key": "Animal_id",
//!   "shade": [{"TreatmentProtocol_code": ["cFluIP", "Treatment_start_date", "Treatment_end_date"]}],
//!   "saturate": ["FMRIMeasurement_date"],
//!   "padding": 3,
//!   "window_start": "2016,12,18",
//!   "relative_dates": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::compile::{TimetableRequest, DEFAULT_PADDING};
use crate::error::{Result, TimetableError};
use crate::models::{parse_window_date, RecordSet, SpecGroup, DEFAULT_DATE_MARKER};

/// Declarative description of a timetable render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    /// Column whose distinct values form the entity axis.
    pub axis_key: String,
    /// Shade group, in wire format.
    pub shade: SpecGroup,
    /// Saturate group, in wire format.
    pub saturate: SpecGroup,
    /// Padding days around the auto-derived window.
    pub padding: u32,
    /// Explicit window start literal (`"YYYY,MM,DD"`).
    pub window_start: Option<String>,
    /// Explicit window end literal (`"YYYY,MM,DD"`).
    pub window_end: Option<String>,
    /// Use day offsets instead of calendar dates.
    pub relative_dates: bool,
    /// Substring identifying date-valued columns.
    pub date_marker: String,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            axis_key: String::new(),
            shade: SpecGroup::new(),
            saturate: SpecGroup::new(),
            padding: DEFAULT_PADDING,
            window_start: None,
            window_end: None,
            relative_dates: false,
            date_marker: DEFAULT_DATE_MARKER.to_string(),
        }
    }
}

impl TimetableConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TimetableError::Config {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Loads a JSON record set using this configuration's date marker.
    pub fn load_records(&self, json: &str) -> Result<RecordSet> {
        RecordSet::from_json_str_with_marker(json, &self.date_marker)
    }

    /// Converts into a compilation request, parsing the window literals.
    ///
    /// Empty literals count as absent.
    pub fn to_request(&self) -> Result<TimetableRequest> {
        let parse = |literal: &Option<String>| -> Result<_> {
            match literal.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => parse_window_date(s).map(Some),
            }
        };
        Ok(TimetableRequest::new(self.axis_key.clone())
            .with_shade(self.shade.clone())
            .with_saturate(self.saturate.clone())
            .with_padding(self.padding)
            .with_window(parse(&self.window_start)?, parse(&self.window_end)?)
            .with_relative_dates(self.relative_dates))
    }
}
