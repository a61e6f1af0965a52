//! Locate, fetch, decode and render.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use archive::{locate_nearest, RadarArchive};
use level2::{RadarVolume, Sweep};
use projection::MercatorView;
use radar_common::{RadarError, RadarResult};
use renderer::{
    encode_png, render_plot, GraticuleStyle, PlotLayout, PlotRequest, PolarRay, PolarSweep,
    RadarOrigin, TextFont,
};

use crate::config::PlotConfig;
use crate::plots::{PlotDefinition, PLOTS};

/// Run the whole pipeline and return the written image paths in plot order.
#[instrument(skip_all, fields(site = %config.site, target = %config.target))]
pub async fn run(config: &PlotConfig, archive: &RadarArchive) -> RadarResult<Vec<PathBuf>> {
    let candidate = locate_nearest(archive, &config.site, config.target).await?;
    let volume = fetch_volume(archive, &candidate.key, config.scratch_dir.as_deref()).await?;
    render_volume(config, &volume)
}

/// Download `key` to a scratch file and decode it.
///
/// The scratch file is removed once decoding finishes, whether or not it
/// succeeded.
#[instrument(skip(archive, scratch_dir))]
pub async fn fetch_volume(
    archive: &RadarArchive,
    key: &str,
    scratch_dir: Option<&Path>,
) -> RadarResult<RadarVolume> {
    let scratch = archive.fetch_to_scratch(key, scratch_dir).await?;

    let volume = tokio::task::spawn_blocking(move || {
        let result = level2::read_volume(scratch.path());
        drop(scratch);
        result
    })
    .await
    .map_err(|e| RadarError::Decode(format!("decoder task failed: {}", e)))??;

    info!(
        site = %volume.site,
        sweeps = volume.sweeps.len(),
        rays = volume.ray_count(),
        acquisition = volume.acquisition_label(),
        "Decoded volume"
    );
    Ok(volume)
}

/// Render every plot in [`PLOTS`] for a decoded volume.
///
/// Plots are written as they are produced; a failure leaves the earlier
/// images in place.
pub fn render_volume(config: &PlotConfig, volume: &RadarVolume) -> RadarResult<Vec<PathBuf>> {
    let origin = radar_origin(config, volume)?;
    let view = MercatorView::new(config.bbox, config.render.width)?;
    let font = config
        .render
        .font_path
        .as_deref()
        .map(TextFont::load)
        .transpose()?;
    let layout = PlotLayout {
        graticule: config.render.graticule.then(|| GraticuleStyle {
            spacing: config.render.graticule_spacing,
            ..GraticuleStyle::default()
        }),
        colorbar: config.render.colorbar,
        ..PlotLayout::default()
    };

    std::fs::create_dir_all(&config.output_dir)?;

    let acquisition = volume.acquisition_label();
    let mut written = Vec::with_capacity(PLOTS.len());

    for plot in &PLOTS {
        let path = config.output_dir.join(plot.file_name(acquisition));
        render_one(plot, volume, &view, origin, &layout, font.as_ref(), &path)?;
        written.push(path);
    }

    Ok(written)
}

#[instrument(skip_all, fields(field = plot.field, path = %path.display()))]
fn render_one(
    plot: &PlotDefinition,
    volume: &RadarVolume,
    view: &MercatorView,
    origin: RadarOrigin,
    layout: &PlotLayout,
    font: Option<&TextFont>,
    path: &Path,
) -> RadarResult<()> {
    let sweep = volume.sweep(plot.sweep)?;
    let polar = polar_sweep(sweep, plot.field)?;
    let (vmin, vmax) = plot.value_range(volume)?;
    let colormap = plot.colormap()?;

    let request = PlotRequest {
        view,
        origin,
        sweep: &polar,
        colormap: &colormap,
        vmin,
        vmax,
        title: Some(plot.title_text(volume.acquisition_label())),
    };
    let image = render_plot(&request, layout, font)?;
    let png = encode_png(&image)?;
    std::fs::write(path, &png)?;

    info!(bytes = png.len(), vmin, vmax, "Saved plot");
    Ok(())
}

/// Rays of `sweep` that carry `field`.
fn polar_sweep<'a>(sweep: &'a Sweep, field: &str) -> RadarResult<PolarSweep<'a>> {
    let rays: Vec<PolarRay<'a>> = sweep
        .rays
        .iter()
        .filter_map(|ray| {
            ray.moment(field).map(|moment| PolarRay {
                azimuth: ray.azimuth,
                first_gate: moment.first_gate,
                gate_spacing: moment.gate_spacing,
                values: &moment.values,
            })
        })
        .collect();

    if rays.is_empty() {
        return Err(RadarError::FieldNotFound(format!(
            "{} (sweep {})",
            field, sweep.elevation_number
        )));
    }

    PolarSweep::new(sweep.fixed_angle() as f64, rays)
}

/// Radar position: the configured override, else the volume's own.
fn radar_origin(config: &PlotConfig, volume: &RadarVolume) -> RadarResult<RadarOrigin> {
    if let Some(location) = config.radar_location {
        return Ok(RadarOrigin {
            longitude: location.longitude,
            latitude: location.latitude,
        });
    }

    volume
        .location
        .map(|location| RadarOrigin {
            longitude: location.longitude,
            latitude: location.latitude,
        })
        .ok_or_else(|| {
            RadarError::Decode(format!(
                "volume for {} carries no radar location; set radar_location in the configuration",
                volume.site
            ))
        })
}
