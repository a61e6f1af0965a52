//! Title and label text using a TrueType font supplied at runtime.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

use radar_common::{RadarError, RadarResult};

use crate::colormap::Color;

/// A loaded TrueType font.
pub struct TextFont {
    font: Font<'static>,
}

impl TextFont {
    /// Load a `.ttf` file.
    pub fn load(path: &Path) -> RadarResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
            .map_err(|_| RadarError::Render(format!("{} is not a TrueType font", path.display())))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> RadarResult<Self> {
        Font::try_from_vec(bytes)
            .map(|font| Self { font })
            .ok_or_else(|| RadarError::Render("invalid font data".into()))
    }

    /// Rendered size of `text` in pixels.
    pub fn measure(&self, text: &str, size: f32) -> (i32, i32) {
        text_size(Scale::uniform(size), &self.font, text)
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    pub fn draw(&self, img: &mut RgbaImage, text: &str, x: i32, y: i32, size: f32, color: Color) {
        draw_text_mut(
            img,
            Rgba(color.to_array()),
            x,
            y,
            Scale::uniform(size),
            &self.font,
            text,
        );
    }

    /// Draw `text` horizontally centered on `center_x`.
    pub fn draw_centered(
        &self,
        img: &mut RgbaImage,
        text: &str,
        center_x: i32,
        y: i32,
        size: f32,
        color: Color,
    ) {
        let (w, _) = self.measure(text, size);
        self.draw(img, text, center_x - w / 2, y, size, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        assert!(TextFont::from_bytes(b"not a font".to_vec()).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TextFont::load(Path::new("/nonexistent/font.ttf")).err().unwrap();
        assert!(matches!(err, RadarError::Io(_)));
    }
}
