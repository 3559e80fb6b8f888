//! Render adapter: `PanelLayout` -> SVG markup -> grayscale PNG.

pub mod raster;
pub mod svg;

pub use raster::Rasterizer;
pub use svg::to_svg;
