//! Spherical azimuthal equidistant projection.
//!
//! Distances and azimuths from the projection center are true, which makes it
//! the natural frame for radar data: a gate's ground range and the ray
//! azimuth are polar coordinates in this plane.

/// Sphere radius used for radar-centered projections, meters.
pub const EARTH_RADIUS: f64 = 6_370_997.0;

/// Azimuthal equidistant projection centered on a point.
#[derive(Debug, Clone, Copy)]
pub struct AzimuthalEquidistant {
    lon0: f64,
    sin_lat0: f64,
    cos_lat0: f64,
    radius: f64,
}

impl AzimuthalEquidistant {
    /// Projection centered on (`lon0`, `lat0`) in degrees.
    pub fn new(lon0: f64, lat0: f64) -> Self {
        Self::with_radius(lon0, lat0, EARTH_RADIUS)
    }

    pub fn with_radius(lon0: f64, lat0: f64, radius: f64) -> Self {
        let lat0 = lat0.to_radians();
        Self {
            lon0: lon0.to_radians(),
            sin_lat0: lat0.sin(),
            cos_lat0: lat0.cos(),
            radius,
        }
    }

    /// Geographic degrees to plane coordinates in meters (x east, y north).
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lat = lat.to_radians();
        let dlon = lon.to_radians() - self.lon0;
        let (sin_lat, cos_lat) = lat.sin_cos();

        let east = cos_lat * dlon.sin();
        let north = self.cos_lat0 * sin_lat - self.sin_lat0 * cos_lat * dlon.cos();
        let along = self.sin_lat0 * sin_lat + self.cos_lat0 * cos_lat * dlon.cos();

        let chord = east.hypot(north);
        if chord == 0.0 {
            return (0.0, 0.0);
        }

        // Angular distance, stable for both tiny and near-antipodal separations
        let c = chord.atan2(along);
        let k = self.radius * c / chord;
        (k * east, k * north)
    }

    /// Plane coordinates in meters to geographic degrees.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let rho = x.hypot(y);
        if rho == 0.0 {
            return (self.lon0.to_degrees(), self.sin_lat0.atan2(self.cos_lat0).to_degrees());
        }

        let c = rho / self.radius;
        let (sin_c, cos_c) = c.sin_cos();

        let lat = (cos_c * self.sin_lat0 + y * sin_c * self.cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lon = self.lon0
            + (x * sin_c).atan2(rho * self.cos_lat0 * cos_c - y * self.sin_lat0 * sin_c);

        (normalize_lon(lon.to_degrees()), lat.to_degrees())
    }

    /// Ground range (meters) and azimuth (degrees clockwise from north,
    /// `0..360`) of a geographic point as seen from the center.
    pub fn range_azimuth(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.forward(lon, lat);
        let azimuth = x.atan2(y).to_degrees();
        (x.hypot(y), if azimuth < 0.0 { azimuth + 360.0 } else { azimuth })
    }
}

fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    const KHGX: (f64, f64) = (-95.0792, 29.4719);

    #[test]
    fn test_center_maps_to_origin() {
        let proj = AzimuthalEquidistant::new(KHGX.0, KHGX.1);
        let (x, y) = proj.forward(KHGX.0, KHGX.1);
        assert_approx_eq!(x, 0.0, 1e-9);
        assert_approx_eq!(y, 0.0, 1e-9);

        let (lon, lat) = proj.inverse(0.0, 0.0);
        assert_coords_approx_eq!((lon, lat), KHGX, 1e-9);
    }

    #[test]
    fn test_due_north_is_true_distance() {
        let proj = AzimuthalEquidistant::new(KHGX.0, KHGX.1);
        let (x, y) = proj.forward(KHGX.0, KHGX.1 + 1.0);
        assert_approx_eq!(x, 0.0, 1e-6);
        assert_approx_eq!(y, EARTH_RADIUS * 1f64.to_radians(), 1e-3);
    }

    #[test]
    fn test_range_azimuth_quadrants() {
        let proj = AzimuthalEquidistant::new(KHGX.0, KHGX.1);

        let (_, az) = proj.range_azimuth(KHGX.0, KHGX.1 + 0.5);
        assert_approx_eq!(az, 0.0, 1e-6);

        let (_, az) = proj.range_azimuth(KHGX.0 + 0.5, KHGX.1);
        assert!(az > 89.0 && az < 91.0, "east azimuth {}", az);

        let (_, az) = proj.range_azimuth(KHGX.0, KHGX.1 - 0.5);
        assert_approx_eq!(az, 180.0, 1e-6);

        let (_, az) = proj.range_azimuth(KHGX.0 - 0.5, KHGX.1);
        assert!(az > 269.0 && az < 271.0, "west azimuth {}", az);
    }

    #[test]
    fn test_roundtrip() {
        let proj = AzimuthalEquidistant::new(KHGX.0, KHGX.1);
        for &(lon, lat) in &[(-95.3633, 29.4719), (-97.4, 31.0), (-93.0, 28.0), (-95.0792, 27.0)] {
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert_coords_approx_eq!((lon2, lat2), (lon, lat), 1e-9);
        }
    }

    #[test]
    fn test_normalize_lon() {
        assert_approx_eq!(normalize_lon(190.0), -170.0, 1e-12);
        assert_approx_eq!(normalize_lon(-190.0), 170.0, 1e-12);
        assert_approx_eq!(normalize_lon(180.0), 180.0, 1e-12);
    }
}
