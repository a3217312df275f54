//! Timetable domain models.
//!
//! Provides the data types flowing through compilation: the generic input
//! table, the parsed event specifications, the date window and the dense
//! output grid.
//!
//! # Domain Mappings
//!
//! | timetable | Animal study | Clinical | Facilities |
//! |-----------|--------------|----------|------------|
//! | Axis value | Animal / Cage | Patient | Room |
//! | EventSpec | Treatment / Scan | Dose / Visit | Booking |
//! | Shade group | Treatments | Medication | Maintenance |
//! | Saturate group | Measurements | Lab draws | Occupancy |

mod grid;
mod plan;
mod records;
mod spec;
mod value;
mod window;

pub use grid::{LayerCode, LayerGrid};
pub use plan::TimePlan;
pub use records::{Record, RecordSet, DEFAULT_DATE_MARKER};
pub use spec::{EventSpec, SpecGroup};
pub use value::Value;
pub use window::{day_stride, parse_window_date, DateWindow};
