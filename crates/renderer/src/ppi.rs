//! Plan position indicator (PPI) rasterization onto a Mercator map.
//!
//! Works backwards from the output: every pixel center is inverse-projected
//! to longitude/latitude, placed in the radar's azimuthal equidistant plane
//! to get ground range and azimuth, converted to slant range along the beam,
//! and looked up in the nearest ray.

use image::RgbaImage;
use rayon::prelude::*;

use projection::{AzimuthalEquidistant, BeamGeometry, MercatorView};
use radar_common::{RadarError, RadarResult};

use crate::colormap::{Color, Colormap};

/// Gate data along one ray.
#[derive(Debug, Clone, Copy)]
pub struct PolarRay<'a> {
    /// Degrees clockwise from north
    pub azimuth: f32,
    /// Range to the center of the first gate, meters
    pub first_gate: f32,
    /// Gate spacing, meters
    pub gate_spacing: f32,
    /// NaN where there is no data
    pub values: &'a [f32],
}

impl<'a> PolarRay<'a> {
    /// Value of the gate containing `range_m`.
    pub fn value_at(&self, range_m: f64) -> Option<f32> {
        if self.gate_spacing <= 0.0 {
            return None;
        }
        let offset = (range_m - self.first_gate as f64) / self.gate_spacing as f64 + 0.5;
        if offset < 0.0 {
            return None;
        }
        self.values
            .get(offset as usize)
            .copied()
            .filter(|v| !v.is_nan())
    }
}

/// One sweep of a single field, rays sorted by azimuth.
#[derive(Debug, Clone)]
pub struct PolarSweep<'a> {
    elevation: f64,
    rays: Vec<PolarRay<'a>>,
    /// Farthest a pixel may be from its nearest ray, degrees
    max_offset: f32,
}

impl<'a> PolarSweep<'a> {
    pub fn new(elevation: f64, mut rays: Vec<PolarRay<'a>>) -> RadarResult<Self> {
        if rays.is_empty() {
            return Err(RadarError::Render("sweep has no rays".into()));
        }

        for ray in &mut rays {
            ray.azimuth = ray.azimuth.rem_euclid(360.0);
        }
        rays.sort_by(|a, b| a.azimuth.total_cmp(&b.azimuth));

        let max_offset = 1.5 * median_spacing(&rays);

        Ok(Self {
            elevation,
            rays,
            max_offset,
        })
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn rays(&self) -> &[PolarRay<'a>] {
        &self.rays
    }

    /// Ray closest in azimuth, if it is close enough to represent `azimuth`.
    pub fn nearest_ray(&self, azimuth: f32) -> Option<&PolarRay<'a>> {
        let azimuth = azimuth.rem_euclid(360.0);
        let n = self.rays.len();
        let upper = self.rays.partition_point(|r| r.azimuth < azimuth);

        let after = &self.rays[upper % n];
        let before = &self.rays[(upper + n - 1) % n];

        let (ray, offset) = [after, before]
            .into_iter()
            .map(|r| (r, angular_distance(r.azimuth, azimuth)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        (offset <= self.max_offset).then_some(ray)
    }

    /// Value at a slant range along the direction `azimuth`.
    pub fn value_at(&self, azimuth: f32, slant_range: f64) -> Option<f32> {
        self.nearest_ray(azimuth)?.value_at(slant_range)
    }
}

fn angular_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

fn median_spacing(sorted: &[PolarRay<'_>]) -> f32 {
    if sorted.len() < 2 {
        return 360.0;
    }

    let mut gaps: Vec<f32> = sorted
        .windows(2)
        .map(|w| w[1].azimuth - w[0].azimuth)
        .collect();
    gaps.push(sorted[0].azimuth + 360.0 - sorted[sorted.len() - 1].azimuth);
    gaps.sort_by(|a, b| a.total_cmp(b));

    let mid = gaps.len() / 2;
    if gaps.len() % 2 == 0 {
        (gaps[mid - 1] + gaps[mid]) / 2.0
    } else {
        gaps[mid]
    }
}

/// Radar origin, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarOrigin {
    pub longitude: f64,
    pub latitude: f64,
}

/// Colors a sweep over a map view.
pub struct PpiRenderer<'a> {
    view: &'a MercatorView,
    aeqd: AzimuthalEquidistant,
    beam: BeamGeometry,
    background: Color,
}

impl<'a> PpiRenderer<'a> {
    pub fn new(view: &'a MercatorView, origin: RadarOrigin) -> Self {
        Self {
            view,
            aeqd: AzimuthalEquidistant::new(origin.longitude, origin.latitude),
            beam: BeamGeometry::standard(),
            background: Color::WHITE,
        }
    }

    /// Value under a pixel center.
    pub fn sample(&self, sweep: &PolarSweep<'_>, col: u32, row: u32) -> Option<f32> {
        let (lon, lat) = self.view.pixel_to_lonlat(col, row);
        let (ground, azimuth) = self.aeqd.range_azimuth(lon, lat);
        let slant = self.beam.slant_range(ground, sweep.elevation())?;
        sweep.value_at(azimuth as f32, slant)
    }

    /// Rasterize `sweep` with values clipped to `vmin..vmax`.
    pub fn render(
        &self,
        sweep: &PolarSweep<'_>,
        colormap: &Colormap,
        vmin: f32,
        vmax: f32,
    ) -> RadarResult<RgbaImage> {
        let width = self.view.width();
        let height = self.view.height();
        let background = self.background.to_array();

        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        pixels
            .par_chunks_mut(width as usize * 4)
            .enumerate()
            .for_each(|(row, line)| {
                for (col, pixel) in line.chunks_exact_mut(4).enumerate() {
                    let color = self
                        .sample(sweep, col as u32, row as u32)
                        .and_then(|v| colormap.color_for(v, vmin, vmax))
                        .map(Color::to_array)
                        .unwrap_or(background);
                    pixel.copy_from_slice(&color);
                }
            });

        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| RadarError::Render("pixel buffer does not match view size".into()))
    }
}
