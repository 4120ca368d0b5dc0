//! Turning node trees into image bytes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use resvg::{tiny_skia, usvg};
use serde::Deserialize;

use crate::card::RenderError;
use crate::layout::{layout, Canvas};
use crate::node::Node;
use crate::svg::SvgWriter;

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            other => Err(format!("unsupported image format: {}", other)),
        }
    }
}

/// A font face handed to the rasterizer.
#[derive(Debug, Clone)]
pub struct FontSource {
    /// Family name, used as the default family when listed first
    pub name: String,
    pub weight: u16,
    pub style: String,
    /// Raw TrueType/OpenType data
    pub data: Vec<u8>,
}

/// Turns a node tree into encoded image bytes.
pub trait Rasterizer: Send + Sync {
    /// Format of the produced bytes.
    fn format(&self) -> ImageFormat;

    /// Canvas the tree is laid out on.
    fn canvas(&self) -> &Canvas;

    /// Lay out and encode a node tree.
    fn rasterize(&self, tree: &Node) -> Result<Vec<u8>, RenderError>;
}

/// Writes the laid-out tree as an SVG document.
#[derive(Default)]
pub struct SvgRasterizer {
    canvas: Canvas,
    writer: SvgWriter,
}

impl SvgRasterizer {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            writer: SvgWriter::new(),
        }
    }

    /// Lay out a tree and serialize it to SVG markup.
    pub fn to_svg(&self, tree: &Node) -> Result<String, RenderError> {
        let drawables = layout(tree, &self.canvas);
        self.writer.write(&drawables, &self.canvas)
    }
}

impl Rasterizer for SvgRasterizer {
    fn format(&self) -> ImageFormat {
        ImageFormat::Svg
    }

    fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn rasterize(&self, tree: &Node) -> Result<Vec<u8>, RenderError> {
        Ok(self.to_svg(tree)?.into_bytes())
    }
}

/// Renders the SVG form with resvg and encodes it as PNG.
pub struct PngRasterizer {
    svg: SvgRasterizer,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl PngRasterizer {
    /// Create a rasterizer with the given fonts.
    ///
    /// System fonts are loaded only when no fonts are given.
    pub fn new(canvas: Canvas, fonts: Vec<FontSource>) -> Self {
        let mut db = usvg::fontdb::Database::new();

        if fonts.is_empty() {
            db.load_system_fonts();
            tracing::debug!("No card fonts configured, using {} system faces", db.len());
        }

        if let Some(first) = fonts.first() {
            db.set_sans_serif_family(first.name.clone());
        }

        for font in fonts {
            tracing::debug!(
                "Loading font {} ({} {})",
                font.name,
                font.weight,
                font.style
            );
            db.load_font_data(font.data);
        }

        Self {
            svg: SvgRasterizer::new(canvas),
            fontdb: Arc::new(db),
        }
    }
}

impl Rasterizer for PngRasterizer {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn canvas(&self) -> &Canvas {
        self.svg.canvas()
    }

    fn rasterize(&self, tree: &Node) -> Result<Vec<u8>, RenderError> {
        let canvas = self.svg.canvas();
        let mut pixmap = tiny_skia::Pixmap::new(canvas.width, canvas.height).ok_or_else(|| {
            RenderError::Raster(format!(
                "invalid canvas size {}x{}",
                canvas.width, canvas.height
            ))
        })?;

        let svg = self.svg.to_svg(tree)?;

        let mut options = usvg::Options::default();
        options.font_family = canvas.font_family.clone();
        options.fontdb = Arc::clone(&self.fontdb);

        let svg_tree =
            usvg::Tree::from_str(&svg, &options).map_err(|e| RenderError::Svg(e.to_string()))?;

        resvg::render(&svg_tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Raster(e.to_string()))
    }
}
