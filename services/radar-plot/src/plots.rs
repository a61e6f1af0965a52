//! The fixed set of plots produced for every volume.

use level2::{fields, RadarVolume};
use radar_common::{RadarError, RadarResult};
use renderer::Colormap;

/// Color scale limits for a plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRange {
    Fixed { vmin: f32, vmax: f32 },
    /// `±factor × max Nyquist velocity`
    Nyquist { factor: f32 },
}

#[derive(Debug, Clone, Copy)]
pub struct PlotDefinition {
    /// Volume field name
    pub field: &'static str,
    /// File name suffix
    pub slug: &'static str,
    pub title: &'static str,
    pub sweep: usize,
    pub range: ValueRange,
    pub colormap: &'static str,
}

/// Plots in output order.
pub const PLOTS: [PlotDefinition; 4] = [
    PlotDefinition {
        field: fields::REFLECTIVITY,
        slug: "reflectivity",
        title: "Reflectivity",
        sweep: 0,
        range: ValueRange::Fixed { vmin: -8.0, vmax: 64.0 },
        colormap: "NWSRef",
    },
    // "coefficent" is the established output name; downstream consumers match on it.
    PlotDefinition {
        field: fields::CROSS_CORRELATION_RATIO,
        slug: "correlation_coefficent",
        title: "Correlation Coefficent",
        sweep: 0,
        range: ValueRange::Fixed { vmin: 0.8, vmax: 1.0 },
        colormap: "RefDiff",
    },
    PlotDefinition {
        field: fields::DIFFERENTIAL_REFLECTIVITY,
        slug: "differential_reflectivity",
        title: "Differential Reflectivity",
        sweep: 0,
        range: ValueRange::Fixed { vmin: -1.0, vmax: 4.0 },
        colormap: "RefDiff",
    },
    PlotDefinition {
        field: fields::VELOCITY,
        slug: "velocity",
        title: "Velocity",
        sweep: 1,
        range: ValueRange::Nyquist { factor: 1.5 },
        colormap: "NWSVel",
    },
];

impl PlotDefinition {
    /// Color limits for this plot on `volume`.
    pub fn value_range(&self, volume: &RadarVolume) -> RadarResult<(f32, f32)> {
        match self.range {
            ValueRange::Fixed { vmin, vmax } => Ok((vmin, vmax)),
            ValueRange::Nyquist { factor } => {
                let nyquist = volume.max_nyquist_velocity().ok_or_else(|| {
                    RadarError::FieldNotFound("instrument_parameters.nyquist_velocity".into())
                })?;
                Ok((-factor * nyquist, factor * nyquist))
            }
        }
    }

    pub fn colormap(&self) -> RadarResult<Colormap> {
        Colormap::by_name(self.colormap)
            .ok_or_else(|| RadarError::Render(format!("unknown colormap {}", self.colormap)))
    }

    /// `<acquisition>-<slug>.png`
    pub fn file_name(&self, acquisition: &str) -> String {
        format!("{}-{}.png", acquisition, self.slug)
    }

    /// `<Title>: <acquisition>`
    pub fn title_text(&self, acquisition: &str) -> String {
        format!("{}: {}", self.title, acquisition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_and_slugs() {
        let slugs: Vec<&str> = PLOTS.iter().map(|p| p.slug).collect();
        assert_eq!(
            slugs,
            vec![
                "reflectivity",
                "correlation_coefficent",
                "differential_reflectivity",
                "velocity"
            ]
        );
    }

    #[test]
    fn test_colormaps_resolve() {
        for plot in &PLOTS {
            assert!(plot.colormap().is_ok(), "{}", plot.colormap);
        }
    }

    #[test]
    fn test_file_name_and_title() {
        let plot = &PLOTS[1];
        assert_eq!(
            plot.file_name("2015-05-20T19:00:03Z"),
            "2015-05-20T19:00:03Z-correlation_coefficent.png"
        );
        assert_eq!(
            plot.title_text("2015-05-20T19:00:03Z"),
            "Correlation Coefficent: 2015-05-20T19:00:03Z"
        );
    }

    #[test]
    fn test_only_velocity_uses_doppler_sweep() {
        for plot in &PLOTS {
            let expected = if plot.field == fields::VELOCITY { 1 } else { 0 };
            assert_eq!(plot.sweep, expected);
        }
    }
}
