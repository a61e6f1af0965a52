//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees (x = longitude, y = latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build the plot extent around a map center.
    ///
    /// Latitude spans `center_lat ± zoom`; longitude spans
    /// `center_lon ± zoom * aspect` so the x:y ratio widens the view.
    pub fn around_center(center_lon: f64, center_lat: f64, zoom: f64, aspect: f64) -> Self {
        Self {
            min_x: center_lon - zoom * aspect,
            min_y: center_lat - zoom,
            max_x: center_lon + zoom * aspect,
            max_y: center_lat + zoom,
        }
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Meridians for a graticule, starting at `min_x` and stepping by `spacing`
    /// while strictly below `max_x`.
    pub fn lon_lines(&self, spacing: f64) -> Vec<f64> {
        arange(self.min_x, self.max_x, spacing)
    }

    /// Parallels for a graticule, starting at `min_y` and stepping by `spacing`
    /// while strictly below `max_y`.
    pub fn lat_lines(&self, spacing: f64) -> Vec<f64> {
        arange(self.min_y, self.max_y, spacing)
    }
}

fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !step.is_finite() || stop <= start {
        return Vec::new();
    }
    let count = ((stop - start) / step).ceil() as usize;
    (0..count).map(|i| start + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_around_center() {
        let bbox = BoundingBox::around_center(-95.0, 29.5, 1.5, 2.0);
        assert_eq!(bbox.min_x, -98.0);
        assert_eq!(bbox.max_x, -92.0);
        assert_eq!(bbox.min_y, 28.0);
        assert_eq!(bbox.max_y, 31.0);
    }

    #[test]
    fn test_lines_exclude_stop() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(bbox.lat_lines(0.5), vec![0.0, 0.5]);
        assert!(bbox.lon_lines(0.0).is_empty());
    }
}
