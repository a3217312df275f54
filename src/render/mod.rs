//! Rendering surfaces.
//!
//! A surface receives a finished [`Timetable`] and draws it. It sees only
//! the two grids and the labels, never the records or specifications that
//! produced them. Color maps, tick placement and export are the surface's
//! business.
//!
//! # Usage
//!
//! ```
//! use timetable::render::{RenderSurface, TextSurface};
//! # use timetable::compile::{build_timetable, TimetableRequest};
//! # use timetable::models::{EventSpec, RecordSet, SpecGroup, Value};
//! # let records = RecordSet::new(["id", "seen_date"]).with_row([
//! #     ("id", Value::from("A")),
//! #     ("seen_date", Value::from(chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())),
//! # ]);
//! # let request = TimetableRequest::new("id")
//! #     .with_saturate(SpecGroup::new().with_spec(EventSpec::column("seen_date")))
//! #     .with_padding(1);
//! # let timetable = build_timetable(&records, &request).unwrap();
//! let text = TextSurface::new().render(&timetable).unwrap();
//! assert!(text.contains("A"));
//! ```

mod text;

pub use text::TextSurface;

use crate::compile::Timetable;
use crate::error::Result;
use std::fmt::Debug;

/// Something that can draw a compiled timetable.
pub trait RenderSurface: Debug {
    /// What the surface produces (a string, a file path, an image, ...).
    type Output;

    /// Surface name (e.g., "text").
    fn name(&self) -> &'static str;

    /// Draws the timetable.
    fn render(&mut self, timetable: &Timetable) -> Result<Self::Output>;
}

/// Human-readable caption for an axis key: underscores become spaces and
/// `id` is capitalised, so `"Animal_id"` reads `"Animal ID"`.
pub fn axis_title(axis_key: &str) -> String {
    axis_key
        .split('_')
        .map(|part| if part == "id" { "ID" } else { part })
        .collect::<Vec<_>>()
        .join(" ")
}
