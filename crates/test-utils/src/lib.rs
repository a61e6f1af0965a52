//! Test support for the nexrad-plot workspace.
//!
//! - [`generators`]: synthetic Archive II volumes (message 31 split cut,
//!   legacy message 1) encoded exactly the way the archive serves them
//! - [`fixtures`]: archive key listings, site coordinates and target times
//! - [`paths`]: scratch directories and file helpers
//!
//! Pulled in as a dev-dependency only:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Assert that two numbers differ by at most `tolerance`.
///
/// Both sides are widened to `f64`, so `f32` moment values compare directly
/// against literals. NaN never passes.
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance) = ($actual as f64, $expected as f64, $tolerance as f64);
        if !((actual - expected).abs() <= tolerance) {
            panic!(
                "assertion failed: {} = {} is not within {} of {}",
                stringify!($actual),
                actual,
                tolerance,
                expected
            );
        }
    }};
}

/// [`assert_approx_eq!`] on both halves of a `(lon, lat)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (lon, lat) = $actual;
        let (expected_lon, expected_lat) = $expected;
        $crate::assert_approx_eq!(lon, expected_lon, $tolerance);
        $crate::assert_approx_eq!(lat, expected_lat, $tolerance);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_within_tolerance() {
        assert_approx_eq!(0.95_f32, 0.95, 1e-6);
        assert_approx_eq!(-10.0, -10.0004, 1e-3);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_outside_tolerance() {
        assert_approx_eq!(26.6, 26.5, 0.01);
    }

    #[test]
    #[should_panic(expected = "is not within")]
    fn test_nan_never_matches() {
        assert_approx_eq!(f32::NAN, 0.0, 1.0);
    }

    #[test]
    fn test_lonlat_pair() {
        assert_coords_approx_eq!((-95.0792, 29.4719), (-95.07921, 29.47189), 0.001);
    }
}
