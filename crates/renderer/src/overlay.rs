//! Map decorations drawn over a rendered PPI: graticule and colorbar.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use projection::MercatorView;

use crate::colormap::{Color, Colormap};

/// Dash pattern, pixels on then pixels off.
const DASH: (f32, f32) = (6.0, 4.0);

/// Graticule line appearance.
#[derive(Debug, Clone, Copy)]
pub struct GraticuleStyle {
    /// Degrees between lines
    pub spacing: f64,
    pub color: Color,
}

impl Default for GraticuleStyle {
    fn default() -> Self {
        Self {
            spacing: 0.5,
            color: Color::GRAY,
        }
    }
}

/// Draw dashed meridians and parallels starting at the box minimum.
pub fn draw_graticule(img: &mut RgbaImage, view: &MercatorView, style: &GraticuleStyle) {
    let bbox = view.bbox();
    let color = Rgba(style.color.to_array());
    let w = img.width() as f32;
    let h = img.height() as f32;

    for lon in bbox.lon_lines(style.spacing) {
        let x = view.lonlat_to_pixel(lon, bbox.min_y).0.round() as f32;
        draw_dashed_line(img, (x, 0.0), (x, h), color);
    }

    for lat in bbox.lat_lines(style.spacing) {
        let y = view.lonlat_to_pixel(bbox.min_x, lat).1.round() as f32;
        draw_dashed_line(img, (0.0, y), (w, y), color);
    }
}

fn draw_dashed_line(img: &mut RgbaImage, start: (f32, f32), end: (f32, f32), color: Rgba<u8>) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let length = dx.hypot(dy);
    if length == 0.0 {
        return;
    }
    let (ux, uy) = (dx / length, dy / length);

    let mut pos = 0.0;
    while pos < length {
        let stop = (pos + DASH.0).min(length);
        draw_line_segment_mut(
            img,
            (start.0 + ux * pos, start.1 + uy * pos),
            (start.0 + ux * stop, start.1 + uy * stop),
            color,
        );
        pos += DASH.0 + DASH.1;
    }
}

/// Fill `rect` left to right with the full colormap and outline it.
pub fn draw_colorbar(img: &mut RgbaImage, rect: Rect, colormap: &Colormap) {
    let width = rect.width();
    for i in 0..width {
        let t = (i as f32 + 0.5) / width as f32;
        let color = Rgba(colormap.color_at(t).to_array());
        let x = rect.left() + i as i32;
        if x < 0 || x >= img.width() as i32 {
            continue;
        }
        for y in rect.top()..rect.bottom() + 1 {
            if y >= 0 && y < img.height() as i32 {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
    draw_hollow_rect_mut(img, rect, Rgba(Color::BLACK.to_array()));
}
