//! Full plot composition: title, map with graticule, colorbar.

use image::{imageops, Rgba, RgbaImage};
use imageproc::rect::Rect;
use tracing::debug;

use projection::MercatorView;
use radar_common::RadarResult;

use crate::colormap::{Color, Colormap};
use crate::overlay::{draw_colorbar, draw_graticule, GraticuleStyle};
use crate::png::encode_auto;
use crate::ppi::{PolarSweep, PpiRenderer, RadarOrigin};
use crate::text::TextFont;

/// Layout of the decorations around the map.
#[derive(Debug, Clone)]
pub struct PlotLayout {
    pub margin: u32,
    pub title_size: f32,
    pub colorbar_height: u32,
    pub label_size: f32,
    pub graticule: Option<GraticuleStyle>,
    pub colorbar: bool,
}

impl Default for PlotLayout {
    fn default() -> Self {
        Self {
            margin: 10,
            title_size: 22.0,
            colorbar_height: 18,
            label_size: 14.0,
            graticule: Some(GraticuleStyle::default()),
            colorbar: true,
        }
    }
}

/// Everything needed to draw one field.
pub struct PlotRequest<'a> {
    pub view: &'a MercatorView,
    pub origin: RadarOrigin,
    pub sweep: &'a PolarSweep<'a>,
    pub colormap: &'a Colormap,
    pub vmin: f32,
    pub vmax: f32,
    pub title: Option<String>,
}

/// Render a complete plot.
///
/// Title and colorbar labels need a font; without one only the map,
/// graticule and colorbar strip are drawn.
pub fn render_plot(
    request: &PlotRequest<'_>,
    layout: &PlotLayout,
    font: Option<&TextFont>,
) -> RadarResult<RgbaImage> {
    let mut map = PpiRenderer::new(request.view, request.origin).render(
        request.sweep,
        request.colormap,
        request.vmin,
        request.vmax,
    )?;

    if let Some(style) = &layout.graticule {
        draw_graticule(&mut map, request.view, style);
    }

    let title = font.zip(request.title.as_deref());
    let margin = layout.margin;
    let title_height = match title {
        Some((font, text)) => font.measure(text, layout.title_size).1.max(0) as u32 + margin,
        None => 0,
    };
    let labels_height = if font.is_some() {
        layout.label_size.ceil() as u32 + margin / 2
    } else {
        0
    };
    let colorbar_height = if layout.colorbar {
        margin + layout.colorbar_height + labels_height
    } else {
        0
    };

    let width = map.width() + 2 * margin;
    let height = margin + title_height + map.height() + colorbar_height + margin;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(Color::WHITE.to_array()));

    if let Some((font, text)) = title {
        font.draw_centered(
            &mut canvas,
            text,
            width as i32 / 2,
            margin as i32,
            layout.title_size,
            Color::BLACK,
        );
    }

    let map_top = margin + title_height;
    imageops::replace(&mut canvas, &map, margin as i64, map_top as i64);

    if layout.colorbar {
        let bar_top = map_top + map.height() + margin;
        let rect = Rect::at(margin as i32, bar_top as i32).of_size(map.width(), layout.colorbar_height);
        draw_colorbar(&mut canvas, rect, request.colormap);

        if let Some(font) = font {
            let label_y = (bar_top + layout.colorbar_height + margin / 2) as i32;
            let left = margin as i32;
            let right = (margin + map.width()) as i32;
            for (x, value) in [
                (left, request.vmin),
                ((left + right) / 2, (request.vmin + request.vmax) / 2.0),
                (right, request.vmax),
            ] {
                font.draw_centered(
                    &mut canvas,
                    &format_tick(value),
                    x,
                    label_y,
                    layout.label_size,
                    Color::BLACK,
                );
            }
        }
    }

    debug!(width, height, colormap = request.colormap.name(), "Composed plot");
    Ok(canvas)
}

/// Encode a finished plot as PNG (indexed when it fits in 256 colors).
pub fn encode_png(img: &RgbaImage) -> RadarResult<Vec<u8>> {
    encode_auto(img.as_raw(), img.width() as usize, img.height() as usize)
}

fn format_tick(value: f32) -> String {
    let whole = |v: f32| (v - v.round()).abs() < 1e-3;
    if whole(value) {
        format!("{:.0}", value)
    } else if whole(value * 10.0) {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}
