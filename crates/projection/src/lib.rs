//! Coordinate transformations for radar plots.
//!
//! Implements the projections from scratch without external dependencies:
//! - Mercator for the output map
//! - azimuthal equidistant centered on the radar
//! - radar beam geometry under the 4/3 effective earth radius model

pub mod azimuthal;
pub mod beam;
pub mod mercator;

pub use azimuthal::AzimuthalEquidistant;
pub use beam::BeamGeometry;
pub use mercator::{Mercator, MercatorView, MAX_DIMENSION, MAX_LATITUDE};
