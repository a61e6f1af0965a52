//! Colormaps for radar moments.
//!
//! Values are normalized against a `(vmin, vmax)` range and clipped, so data
//! outside the range takes the end colors rather than being dropped.

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

/// How colors between the stops are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Equal-width bands, one per color
    Discrete,
    /// Evenly spaced stops with linear blending
    Linear,
}

#[derive(Debug, Clone)]
pub struct Colormap {
    name: &'static str,
    colors: Vec<Color>,
    interpolation: Interpolation,
}

impl Colormap {
    pub fn new(name: &'static str, colors: Vec<Color>, interpolation: Interpolation) -> Self {
        Self {
            name,
            colors,
            interpolation,
        }
    }

    /// NWS reflectivity table.
    pub fn nws_ref() -> Self {
        Self::new(
            "NWSRef",
            vec![
                Color::rgb(0, 236, 236),
                Color::rgb(1, 160, 246),
                Color::rgb(0, 0, 246),
                Color::rgb(0, 255, 0),
                Color::rgb(0, 200, 0),
                Color::rgb(0, 144, 0),
                Color::rgb(255, 255, 0),
                Color::rgb(231, 192, 0),
                Color::rgb(255, 144, 0),
                Color::rgb(255, 0, 0),
                Color::rgb(214, 0, 0),
                Color::rgb(192, 0, 0),
                Color::rgb(255, 0, 255),
                Color::rgb(153, 85, 201),
                Color::rgb(235, 235, 235),
            ],
            Interpolation::Discrete,
        )
    }

    /// NWS velocity table: greens toward the radar, reds away.
    pub fn nws_vel() -> Self {
        Self::new(
            "NWSVel",
            vec![
                Color::rgb(2, 252, 2),
                Color::rgb(1, 228, 1),
                Color::rgb(1, 197, 1),
                Color::rgb(7, 172, 4),
                Color::rgb(6, 143, 3),
                Color::rgb(4, 114, 2),
                Color::rgb(124, 151, 123),
                Color::rgb(152, 119, 119),
                Color::rgb(137, 0, 0),
                Color::rgb(162, 0, 0),
                Color::rgb(185, 0, 0),
                Color::rgb(216, 0, 0),
                Color::rgb(239, 0, 0),
                Color::rgb(254, 0, 0),
            ],
            Interpolation::Discrete,
        )
    }

    /// Continuous scale for differential moments.
    pub fn ref_diff() -> Self {
        Self::new(
            "RefDiff",
            vec![
                Color::rgb(128, 128, 128),
                Color::rgb(0, 0, 255),
                Color::rgb(0, 255, 255),
                Color::rgb(0, 200, 0),
                Color::rgb(255, 255, 0),
                Color::rgb(255, 140, 0),
                Color::rgb(255, 0, 0),
                Color::rgb(139, 0, 0),
                Color::rgb(255, 0, 255),
                Color::rgb(255, 255, 255),
            ],
            Interpolation::Linear,
        )
    }

    /// Look up a built-in colormap by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "NWSRef" => Some(Self::nws_ref()),
            "NWSVel" => Some(Self::nws_vel()),
            "RefDiff" => Some(Self::ref_diff()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Color at a normalized position, clipped to `0..=1`.
    pub fn color_at(&self, t: f32) -> Color {
        let n = self.colors.len();
        match n {
            0 => return Color::transparent(),
            1 => return self.colors[0],
            _ => {}
        }

        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self.interpolation {
            Interpolation::Discrete => {
                let idx = ((t * n as f32) as usize).min(n - 1);
                self.colors[idx]
            }
            Interpolation::Linear => {
                let pos = t * (n - 1) as f32;
                let idx = (pos.floor() as usize).min(n - 2);
                interpolate_color(self.colors[idx], self.colors[idx + 1], pos - idx as f32)
            }
        }
    }

    /// Color for a data value, `None` for NaN.
    pub fn color_for(&self, value: f32, vmin: f32, vmax: f32) -> Option<Color> {
        if value.is_nan() {
            return None;
        }
        let range = vmax - vmin;
        let t = if range.abs() < f32::EPSILON {
            0.0
        } else {
            (value - vmin) / range
        };
        Some(self.color_at(t))
    }
}
