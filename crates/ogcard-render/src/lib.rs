//! Open Graph card renderer.
//!
//! Builds the fixed preview-card node tree for a page, lays it out on a canvas
//! and turns it into SVG or PNG bytes.

pub mod card;
pub mod layout;
pub mod node;
pub mod raster;
pub mod svg;

pub use card::{display_title, CardRenderer, PreviewRequest, RenderError, TITLE_DELIMITER};
pub use layout::{layout, Canvas, Drawable, Paint};
pub use node::{ContainerTag, Node, TextTag, VectorGraphic, VectorPath};
pub use raster::{FontSource, ImageFormat, PngRasterizer, Rasterizer, SvgRasterizer};
pub use svg::SvgWriter;
