//! Renderer + rasterizer wiring shared by the builder and the server.

use std::path::Path;
use std::sync::Arc;

use ogcard_render::{
    Canvas, CardRenderer, ImageFormat, Node, PngRasterizer, PreviewRequest, Rasterizer,
    RenderError, SvgRasterizer,
};
use ogcard_style::Tailwind;

use crate::builder::BuildError;
use crate::config::{OpenGraphOptions, SiteConfig};
use crate::fonts::load_card_fonts;

/// Turns preview requests into encoded images.
///
/// Both halves are immutable, so a pipeline can be shared across threads.
#[derive(Clone)]
pub struct CardPipeline {
    renderer: Arc<CardRenderer>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl CardPipeline {
    pub fn new(renderer: CardRenderer, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            rasterizer,
        }
    }

    /// Build a pipeline from site configuration.
    ///
    /// `format` overrides the configured output format. Font paths resolve
    /// against `base_dir`.
    pub fn from_site(
        config: &SiteConfig,
        base_dir: &Path,
        format: Option<ImageFormat>,
    ) -> Result<Self, BuildError> {
        let defaults = OpenGraphOptions::default();
        let options = config.og_options().unwrap_or_else(|| {
            tracing::warn!("No opengraph-images integration configured, using defaults");
            &defaults
        });

        let styles = Tailwind::load(&options.theme)?;
        let rem_px = styles.theme().rem_px();

        let mut renderer = CardRenderer::new(Arc::new(styles));
        if let Some(label) = options.site_label.clone().or_else(|| config.site_host()) {
            renderer = renderer.with_site_label(label);
        }

        let mut canvas = Canvas::new(options.width, options.height).with_rem_px(rem_px);
        if let Some(font) = options.fonts.first() {
            canvas = canvas.with_font_family(font.name.clone());
        }

        let rasterizer: Arc<dyn Rasterizer> = match format.unwrap_or(options.format) {
            ImageFormat::Png => Arc::new(PngRasterizer::new(
                canvas,
                load_card_fonts(options, base_dir)?,
            )),
            ImageFormat::Svg => Arc::new(SvgRasterizer::new(canvas)),
        };

        Ok(Self::new(renderer, rasterizer))
    }

    pub fn format(&self) -> ImageFormat {
        self.rasterizer.format()
    }

    pub fn canvas(&self) -> &Canvas {
        self.rasterizer.canvas()
    }

    pub fn renderer(&self) -> &CardRenderer {
        &self.renderer
    }

    /// Build the node tree for a request without encoding it.
    pub fn tree(&self, request: &PreviewRequest) -> Result<Node, RenderError> {
        self.renderer.render(request)
    }

    /// Render and encode one card.
    pub fn render(&self, request: &PreviewRequest) -> Result<Vec<u8>, RenderError> {
        let tree = self.renderer.render(request)?;
        self.rasterizer.rasterize(&tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SITE_TOML;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = "site = \"https://example.org\"\n";

    #[test]
    fn defaults_label_to_site_host() {
        let config = SiteConfig::from_toml(MINIMAL).unwrap();

        let pipeline =
            CardPipeline::from_site(&config, Path::new("."), Some(ImageFormat::Svg)).unwrap();

        assert_eq!(pipeline.renderer().site_label(), "example.org");
        assert_eq!(pipeline.format(), ImageFormat::Svg);
    }

    #[test]
    fn configured_label_wins() {
        let config = SiteConfig::from_toml(DEFAULT_SITE_TOML).unwrap();

        let pipeline =
            CardPipeline::from_site(&config, Path::new("."), Some(ImageFormat::Svg)).unwrap();

        assert_eq!(pipeline.renderer().site_label(), "moyis.dev");
    }

    #[test]
    fn renders_svg_cards() {
        let config = SiteConfig::from_toml(MINIMAL).unwrap();
        let pipeline =
            CardPipeline::from_site(&config, Path::new("."), Some(ImageFormat::Svg)).unwrap();

        let bytes = pipeline
            .render(&PreviewRequest::new("Hello | example.org", "World"))
            .unwrap();
        let svg = String::from_utf8(bytes).unwrap();

        assert!(svg.contains(">Hello</tspan>"));
        assert!(svg.contains(">World</tspan>"));
    }

    #[test]
    fn png_pipeline_needs_font_files() {
        let config = SiteConfig::from_toml(DEFAULT_SITE_TOML).unwrap();

        let result = CardPipeline::from_site(&config, Path::new("/nonexistent"), None);

        assert!(matches!(result, Err(BuildError::Font { .. })));
    }

    #[test]
    fn canvas_uses_theme_root_size() {
        let source = format!(
            "{}\n[[integrations]]\nname = \"opengraph-images\"\n\n[integrations.theme]\nrem_px = 20.0\n",
            MINIMAL
        );
        let config = SiteConfig::from_toml(&source).unwrap();

        let pipeline =
            CardPipeline::from_site(&config, Path::new("."), Some(ImageFormat::Svg)).unwrap();

        assert_eq!(pipeline.canvas().rem_px, 20.0);
        assert_eq!(pipeline.canvas().width, 1200);
    }

    #[test]
    fn default_canvas_uses_sixteen_px_rem() {
        let config = SiteConfig::from_toml(MINIMAL).unwrap();

        let pipeline =
            CardPipeline::from_site(&config, Path::new("."), Some(ImageFormat::Svg)).unwrap();

        assert_eq!(pipeline.canvas().rem_px, 16.0);
    }

    #[test]
    fn invalid_theme_is_rejected() {
        let source = format!(
            "{}\n[[integrations]]\nname = \"opengraph-images\"\n\n[integrations.theme.colors]\nbolt = \"yellow\"\n",
            MINIMAL
        );
        let config = SiteConfig::from_toml(&source).unwrap();

        let result = CardPipeline::from_site(&config, Path::new("."), Some(ImageFormat::Svg));

        assert!(matches!(result, Err(BuildError::Style(_))));
    }
}
