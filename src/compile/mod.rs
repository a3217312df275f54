//! Data-to-grid compilation.
//!
//! Turns a record set and two specification groups into a [`Timetable`]:
//! the shared date window, one integer grid per group and the axis labels.
//!
//! # Pipeline
//!
//! - `resolve_window`: collects every referenced date and pads the range.
//! - `compile_layer`: adds each specification's 1-based weight into a grid.
//! - `build_timetable`: runs both for the shade and saturate groups.
//!
//! Everything is pure: the same inputs always produce the same grids.

mod assemble;
mod layer;
mod window;

pub use assemble::{
    build_timetable, relative_offsets, DateAxis, Timetable, TimetableRequest, DEFAULT_PADDING,
};
pub use layer::{compile_layer, resolve_activation, Activation};
pub use window::{referenced_dates, resolve_window};
