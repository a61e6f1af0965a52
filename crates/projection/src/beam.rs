//! Radar beam geometry under the effective earth radius model.
//!
//! Refraction is approximated by propagating the beam in a straight line over
//! an earth whose radius is 4/3 of the real one. Slant range `r`, elevation
//! `θ` and ground range `s` then satisfy
//!
//! ```text
//! z = sqrt(r² + R² + 2·r·R·sin θ) − R
//! s = R · asin(r · cos θ / (R + z))
//! ```
//!
//! and, from the same triangle, `r = R · sin(s/R) / cos(θ + s/R)`.

use std::f64::consts::FRAC_PI_2;

/// Mean earth radius, meters.
pub const EARTH_MEAN_RADIUS: f64 = 6_371_000.0;

/// Standard-atmosphere refraction factor.
pub const EFFECTIVE_RADIUS_FACTOR: f64 = 4.0 / 3.0;

#[derive(Debug, Clone, Copy)]
pub struct BeamGeometry {
    effective_radius: f64,
}

impl Default for BeamGeometry {
    fn default() -> Self {
        Self::standard()
    }
}

impl BeamGeometry {
    /// 4/3 earth radius model.
    pub fn standard() -> Self {
        Self::with_effective_radius(EARTH_MEAN_RADIUS * EFFECTIVE_RADIUS_FACTOR)
    }

    pub fn with_effective_radius(effective_radius: f64) -> Self {
        Self { effective_radius }
    }

    pub fn effective_radius(&self) -> f64 {
        self.effective_radius
    }

    /// Beam height above the antenna, meters.
    pub fn height(&self, slant_range: f64, elevation_deg: f64) -> f64 {
        let r = slant_range;
        let big_r = self.effective_radius;
        (r * r + big_r * big_r + 2.0 * r * big_r * elevation_deg.to_radians().sin()).sqrt() - big_r
    }

    /// Ground range of a gate at `slant_range`, meters.
    pub fn ground_range(&self, slant_range: f64, elevation_deg: f64) -> f64 {
        let big_r = self.effective_radius;
        let z = self.height(slant_range, elevation_deg);
        big_r * (slant_range * elevation_deg.to_radians().cos() / (big_r + z)).asin()
    }

    /// Slant range at which the beam is over `ground_range`, meters.
    ///
    /// `None` when the beam never reaches that ground range (it would have
    /// to travel past the local vertical).
    pub fn slant_range(&self, ground_range: f64, elevation_deg: f64) -> Option<f64> {
        let big_r = self.effective_radius;
        let phi = ground_range / big_r;
        let angle = elevation_deg.to_radians() + phi;
        if angle >= FRAC_PI_2 {
            return None;
        }
        Some(big_r * phi.sin() / angle.cos())
    }
}
