//! Input validation for timetable compilation.
//!
//! Checks the structural fit between a record set and the specification
//! groups before any grid is built. Detects:
//! - Duplicate column declarations
//! - A missing axis key column
//! - Specifications referencing columns the record set lacks
//! - Specifications reading dates from columns without the date marker
//! - Specifications with empty column names or filter values
//!
//! Data sparsity (entities without matching rows, dates outside the window)
//! is not checked here: it is valid input and simply leaves cells at zero.

use std::collections::HashSet;

use crate::error::TimetableError;
use crate::models::{EventSpec, RecordSet, SpecGroup};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending column, when one is involved.
    pub column: Option<String>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The same column name is declared twice.
    DuplicateColumn,
    /// The axis key column does not exist.
    MissingAxisKey,
    /// A specification references a column that does not exist.
    MissingColumn,
    /// A specification reads dates from a column without the date marker.
    UndatedColumn,
    /// A specification has an empty column name or filter value.
    EmptyGroupEntry,
}

impl ValidationError {
    fn new(
        kind: ValidationErrorKind,
        column: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            column: column.map(str::to_string),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for TimetableError {
    fn from(err: ValidationError) -> Self {
        match (err.kind, err.column) {
            (
                ValidationErrorKind::MissingAxisKey | ValidationErrorKind::MissingColumn,
                Some(column),
            ) => TimetableError::MissingColumn { column },
            _ => TimetableError::InvalidSpec(err.message),
        }
    }
}

/// Validates a record set against the axis key and specification groups.
///
/// Checks:
/// 1. No duplicate column declarations
/// 2. The axis key column exists
/// 3. Every specification has non-empty names and filter value
/// 4. Every referenced column exists
/// 5. Every date column carries the date marker
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(records: &RecordSet, axis_key: &str, groups: &[&SpecGroup]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for column in records.columns() {
        if !seen.insert(column.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateColumn,
                Some(column.as_str()),
                format!("Duplicate column: {column}"),
            ));
        }
    }

    if !records.has_column(axis_key) {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingAxisKey,
            Some(axis_key),
            format!("Axis key '{axis_key}' is not a column of the record set"),
        ));
    }

    for group in groups {
        for (weight, spec) in group.weighted() {
            if let EventSpec::FilterRange {
                filter_column,
                filter_value,
                ..
            } = spec
            {
                if filter_value.is_empty() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::EmptyGroupEntry,
                        Some(filter_column.as_str()),
                        format!("Specification #{weight} filters '{filter_column}' on an empty value"),
                    ));
                }
            }

            for column in spec.referenced_columns() {
                if column.is_empty() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::EmptyGroupEntry,
                        None,
                        format!("Specification #{weight} has an empty column name"),
                    ));
                } else if !records.has_column(column) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MissingColumn,
                        Some(column),
                        format!("Specification #{weight} references unknown column '{column}'"),
                    ));
                }
            }

            for column in spec.date_columns() {
                if !column.is_empty() && !records.is_date_column(column) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UndatedColumn,
                        Some(column),
                        format!(
                            "Specification #{weight} reads dates from '{column}', which lacks the '{}' marker",
                            records.date_marker()
                        ),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
