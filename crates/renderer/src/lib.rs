//! Image rendering for radar sweeps.
//!
//! - Colormaps for radar moments (NWS reflectivity/velocity, differential)
//! - PPI rasterization onto a Mercator map
//! - Graticule, colorbar and title overlays
//! - PNG encoding (indexed or RGBA)

pub mod colormap;
pub mod overlay;
pub mod plot;
pub mod png;
pub mod ppi;
pub mod text;

pub use colormap::{Color, Colormap, Interpolation};
pub use overlay::GraticuleStyle;
pub use plot::{encode_png, render_plot, PlotLayout, PlotRequest};
pub use ppi::{PolarRay, PolarSweep, PpiRenderer, RadarOrigin};
pub use text::TextFont;
