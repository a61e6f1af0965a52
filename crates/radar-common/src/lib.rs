//! Common types and utilities shared across the nexrad-plot crates.

pub mod bbox;
pub mod error;
pub mod time;

pub use bbox::BoundingBox;
pub use error::{RadarError, RadarResult};
pub use time::{parse_target_time, TimeParseError};
