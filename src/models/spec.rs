//! Event specifications and specification groups.
//!
//! A specification says which dates are "active" for each axis value. Two
//! shapes exist on the wire:
//!
//! ```json
//! ["FMRIMeasurement_date",
//!  {"TreatmentProtocol_code": ["cFluIP", "Treatment_start_date", "Treatment_end_date"]},
//!  {"TreatmentProtocol_code": ["aFluIV", "Treatment_start_date"]}]
//! ```
//!
//! A bare string is a column reference. A single-entry object is a filter
//! range: the key is the filter column, the list holds the filter value, the
//! start date column and an optional end date column. Entries are parsed once
//! into [`EventSpec`] and never inspected by shape again.
//!
//! # Layer Weights
//! The 1-based position of a specification in its group is its weight. Cells
//! accumulate weights, so overlapping specifications stay distinguishable.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, TimetableError};

/// One event specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSpec {
    /// Every distinct non-null date in the column is active.
    ColumnReference(String),
    /// Rows where `filter_column == filter_value` mark `start_column`, or the
    /// closed interval up to `end_column` when one is given.
    FilterRange {
        /// Column to filter on.
        filter_column: String,
        /// Literal the filter column must equal.
        filter_value: String,
        /// Date column holding the activation start.
        start_column: String,
        /// Date column holding the activation end (inclusive).
        end_column: Option<String>,
    },
}

impl EventSpec {
    /// Creates a column reference.
    pub fn column(name: impl Into<String>) -> Self {
        EventSpec::ColumnReference(name.into())
    }

    /// Creates a single-date filter specification.
    pub fn filtered(
        filter_column: impl Into<String>,
        filter_value: impl Into<String>,
        start_column: impl Into<String>,
    ) -> Self {
        EventSpec::FilterRange {
            filter_column: filter_column.into(),
            filter_value: filter_value.into(),
            start_column: start_column.into(),
            end_column: None,
        }
    }

    /// Creates a closed-interval filter specification.
    pub fn filtered_range(
        filter_column: impl Into<String>,
        filter_value: impl Into<String>,
        start_column: impl Into<String>,
        end_column: impl Into<String>,
    ) -> Self {
        EventSpec::FilterRange {
            filter_column: filter_column.into(),
            filter_value: filter_value.into(),
            start_column: start_column.into(),
            end_column: Some(end_column.into()),
        }
    }

    /// Builds a filter specification from its wire list
    /// `[filter_value, start_column, end_column?]`.
    pub fn from_filter_list(filter_column: impl Into<String>, list: &[String]) -> Result<Self> {
        let filter_column = filter_column.into();
        match list {
            [value, start] => Ok(Self::filtered(filter_column, value, start)),
            [value, start, end] => Ok(Self::filtered_range(filter_column, value, start, end)),
            _ => Err(TimetableError::InvalidSpec(format!(
                "filter on '{}' needs 2 or 3 elements, got {}",
                filter_column,
                list.len()
            ))),
        }
    }

    /// Columns holding the dates this specification reads.
    pub fn date_columns(&self) -> Vec<&str> {
        match self {
            EventSpec::ColumnReference(c) => vec![c.as_str()],
            EventSpec::FilterRange {
                start_column,
                end_column,
                ..
            } => {
                let mut cols = vec![start_column.as_str()];
                if let Some(end) = end_column {
                    cols.push(end.as_str());
                }
                cols
            }
        }
    }

    /// Every column this specification references.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut cols = Vec::new();
        if let EventSpec::FilterRange { filter_column, .. } = self {
            cols.push(filter_column.as_str());
        }
        cols.extend(self.date_columns());
        cols
    }
}

impl Serialize for EventSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            EventSpec::ColumnReference(c) => serializer.serialize_str(c),
            EventSpec::FilterRange {
                filter_column,
                filter_value,
                start_column,
                end_column,
            } => {
                let mut list = vec![filter_value.as_str(), start_column.as_str()];
                if let Some(end) = end_column {
                    list.push(end.as_str());
                }
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(filter_column, &list)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for EventSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Column(String),
            Filter(BTreeMap<String, Vec<String>>),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Column(c) => Ok(EventSpec::ColumnReference(c)),
            Wire::Filter(map) => {
                if map.len() != 1 {
                    return Err(de::Error::custom(format!(
                        "filter specification must have exactly one key, got {}",
                        map.len()
                    )));
                }
                let (column, list) = map.into_iter().next().ok_or_else(|| {
                    de::Error::custom("filter specification must have exactly one key")
                })?;
                EventSpec::from_filter_list(column, &list).map_err(de::Error::custom)
            }
        }
    }
}

/// An ordered group of specifications sharing one role (shade or saturate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecGroup {
    specs: Vec<EventSpec>,
}

impl SpecGroup {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a specification; its weight is the new group length.
    pub fn with_spec(mut self, spec: EventSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Parses a group from its JSON wire form.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Specifications in order.
    pub fn specs(&self) -> &[EventSpec] {
        &self.specs
    }

    /// Number of specifications.
    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the group is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Specifications paired with their 1-based layer weight.
    pub fn weighted(&self) -> impl Iterator<Item = (u32, &EventSpec)> {
        self.specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (i as u32 + 1, spec))
    }
}

impl From<Vec<EventSpec>> for SpecGroup {
    fn from(specs: Vec<EventSpec>) -> Self {
        Self { specs }
    }
}

impl FromIterator<EventSpec> for SpecGroup {
    fn from_iter<I: IntoIterator<Item = EventSpec>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}
