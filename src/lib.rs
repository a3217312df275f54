//! Event timetables: tabular event records compiled into occupancy grids.
//!
//! A timetable has one row per entity (subject, cage, room) and one column
//! per calendar day. Cells hold small integer codes telling which event
//! categories (treatments, measurements, ...) were active for that entity
//! on that day. This crate compiles those grids; drawing them is left to a
//! [`render::RenderSurface`].
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Value`, `RecordSet`, `EventSpec`,
//!   `SpecGroup`, `DateWindow`, `LayerGrid`, `TimePlan`
//! - **`compile`**: Window resolution, layer compilation, timetable assembly
//! - **`validation`**: Input integrity checks (missing or undated columns)
//! - **`config`**: JSON configuration of one render
//! - **`render`**: The rendering seam and a plain-text surface
//!
//! # Example
//!
//! ```
//! use timetable::compile::build_timetable;
//! use timetable::config::TimetableConfig;
//!
//! let config = TimetableConfig::from_json_str(r#"{
//!     "axis_key": "Animal_id",
//!     "shade": [{"TreatmentProtocol_code": ["cFluIP", "Treatment_start_date", "Treatment_end_date"]}],
//!     "saturate": ["FMRIMeasurement_date"],
//!     "padding": 2
//! }"#).unwrap();
//! let records = config.load_records(r#"[
//!     {"Animal_id": 1, "TreatmentProtocol_code": "cFluIP",
//!      "Treatment_start_date": "2016-12-01", "Treatment_end_date": "2016-12-03",
//!      "FMRIMeasurement_date": "2016-12-05T10:30:00"},
//!     {"Animal_id": 2, "TreatmentProtocol_code": "aFluIV",
//!      "Treatment_start_date": "2016-12-02", "Treatment_end_date": null,
//!      "FMRIMeasurement_date": "2016-12-06T09:00:00"}
//! ]"#).unwrap();
//!
//! let timetable = build_timetable(&records, &config.to_request().unwrap()).unwrap();
//! assert_eq!(timetable.axis_labels, vec!["1", "2"]);
//! assert_eq!(timetable.num_days(), 10); // 2016-11-29 ..= 2016-12-08
//! assert_eq!(timetable.shade.active_cells(), 3);
//! assert_eq!(timetable.saturate.active_cells(), 2);
//! ```

pub mod compile;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod validation;

pub use error::{Result, TimetableError};
