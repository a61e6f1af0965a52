//! Spherical Mercator projection and the map view built on it.
//!
//! Projected coordinates are on the unit sphere: `x` is longitude in radians
//! and `y = ln(tan(π/4 + φ/2))`. The view maps them linearly onto pixels, so
//! the rendered map has the same scale in both directions.

use std::f64::consts::FRAC_PI_4;

use radar_common::{BoundingBox, RadarError, RadarResult};

/// Latitude limit accepted by the view, degrees.
pub const MAX_LATITUDE: f64 = 85.0;

/// Largest image side, pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// Unit-sphere Mercator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mercator;

impl Mercator {
    /// Geographic degrees to projected coordinates.
    pub fn forward(lon: f64, lat: f64) -> (f64, f64) {
        let x = lon.to_radians();
        let y = (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    /// Projected coordinates to geographic degrees.
    pub fn inverse(x: f64, y: f64) -> (f64, f64) {
        let lon = x.to_degrees();
        let lat = (2.0 * y.exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
        (lon, lat)
    }
}

/// Pixel grid over a geographic bounding box in Mercator.
#[derive(Debug, Clone)]
pub struct MercatorView {
    bbox: BoundingBox,
    width: u32,
    height: u32,
    min_x: f64,
    max_y: f64,
    /// Projected units per pixel, same on both axes
    scale: f64,
}

impl MercatorView {
    /// Create a view `width` pixels wide; the height follows from the
    /// projected aspect ratio of `bbox`.
    pub fn new(bbox: BoundingBox, width: u32) -> RadarResult<Self> {
        if bbox.min_y < -MAX_LATITUDE || bbox.max_y > MAX_LATITUDE {
            return Err(RadarError::Projection(format!(
                "latitude range {}..{} exceeds the Mercator limit of ±{}",
                bbox.min_y, bbox.max_y, MAX_LATITUDE
            )));
        }
        if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
            return Err(RadarError::Projection(format!(
                "degenerate bounding box {:?}",
                bbox
            )));
        }
        if width == 0 || width > MAX_DIMENSION {
            return Err(RadarError::Projection(format!(
                "image width {} outside 1..={}",
                width, MAX_DIMENSION
            )));
        }

        let (min_x, min_y) = Mercator::forward(bbox.min_x, bbox.min_y);
        let (max_x, max_y) = Mercator::forward(bbox.max_x, bbox.max_y);

        let scale = (max_x - min_x) / width as f64;
        let height = ((max_y - min_y) / scale).round().max(1.0);
        if height.is_nan() || height > MAX_DIMENSION as f64 {
            return Err(RadarError::Projection(format!(
                "{}px wide view of {:?} would be {} pixels high, limit is {}",
                width, bbox, height, MAX_DIMENSION
            )));
        }
        let height = height as u32;

        Ok(Self {
            bbox,
            width,
            height,
            min_x,
            max_y,
            scale,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Geographic coordinates of a pixel center.
    pub fn pixel_to_lonlat(&self, col: u32, row: u32) -> (f64, f64) {
        let x = self.min_x + (col as f64 + 0.5) * self.scale;
        let y = self.max_y - (row as f64 + 0.5) * self.scale;
        Mercator::inverse(x, y)
    }

    /// Fractional pixel position of a geographic point (0,0 = top-left corner).
    pub fn lonlat_to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = Mercator::forward(lon, lat);
        ((x - self.min_x) / self.scale, (self.max_y - y) / self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_and_greenwich() {
        let (x, y) = Mercator::forward(0.0, 0.0);
        assert!(x.abs() < 1e-12);
        assert!(y.abs() < 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        for &(lon, lat) in &[(-95.36, 29.47), (120.0, -45.0), (0.5, 84.9)] {
            let (x, y) = Mercator::forward(lon, lat);
            let (lon2, lat2) = Mercator::inverse(x, y);
            assert!((lon - lon2).abs() < 1e-9, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_view_height_follows_aspect() {
        let view = MercatorView::new(BoundingBox::new(-1.0, -1.0, 1.0, 1.0), 400).unwrap();
        // Near the equator the projected box is almost square
        assert!((view.height() as i64 - 400).abs() <= 1);

        let north = MercatorView::new(BoundingBox::new(-1.0, 59.0, 1.0, 61.0), 400).unwrap();
        assert!(north.height() > 780, "height {}", north.height());
    }

    #[test]
    fn test_pixel_corners() {
        let bbox = BoundingBox::new(-97.0, 28.0, -93.0, 31.0);
        let view = MercatorView::new(bbox, 800).unwrap();

        let (col, row) = view.lonlat_to_pixel(-97.0, 31.0);
        assert!(col.abs() < 1e-9 && row.abs() < 1e-9);

        let (col, row) = view.lonlat_to_pixel(-93.0, 28.0);
        assert!((col - 800.0).abs() < 1e-6);
        assert!((row - view.height() as f64).abs() < 1.0);
    }

    #[test]
    fn test_pixel_center_roundtrip() {
        let view = MercatorView::new(BoundingBox::new(-97.0, 28.0, -93.0, 31.0), 640).unwrap();
        let (lon, lat) = view.pixel_to_lonlat(100, 200);
        let (col, row) = view.lonlat_to_pixel(lon, lat);
        assert!((col - 100.5).abs() < 1e-6);
        assert!((row - 200.5).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_extreme_height() {
        // Tall narrow box on the equator: 8192 px wide would need billions of rows
        let bbox = BoundingBox::around_center(0.0, 0.0, 40.0, 0.000001);
        let err = MercatorView::new(bbox, 8192).unwrap_err();
        assert!(matches!(err, RadarError::Projection(_)));
    }

    #[test]
    fn test_tall_view_within_limit() {
        let view = MercatorView::new(BoundingBox::new(0.0, -1.0, 1.0, 1.0), 4000).unwrap();
        assert_eq!(view.height(), 8000);
    }

    #[test]
    fn test_rejects_polar_box() {
        let err = MercatorView::new(BoundingBox::new(0.0, 80.0, 10.0, 89.0), 100).unwrap_err();
        assert!(matches!(err, RadarError::Projection(_)));
    }
}
