//! Site configuration (`site.toml`).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use ogcard_render::ImageFormat;
use ogcard_style::ThemeOverrides;
use serde::Deserialize;
use url::Url;

/// Top-level site configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SiteConfig {
    /// Deployed origin, e.g. `https://moyis.dev`
    pub site: String,

    #[serde(default = "default_true")]
    pub compress_html: bool,

    #[serde(default)]
    pub build: BuildOptions,

    /// Content and output locations for card generation
    #[serde(default)]
    pub content: ContentOptions,

    /// Ordered integration list
    #[serde(default)]
    pub integrations: Vec<Integration>,

    #[serde(default)]
    pub markdown: MarkdownOptions,

    #[serde(default)]
    pub image: ImageOptions,

    #[serde(default)]
    pub prefetch: PrefetchOptions,

    #[serde(default)]
    pub experimental: ExperimentalOptions,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BuildOptions {
    #[serde(default)]
    pub inline_stylesheets: InlineStylesheets,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InlineStylesheets {
    Always,
    #[default]
    Auto,
    Never,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContentOptions {
    /// Directory scanned for `.md` / `.mdx` pages
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,

    /// Directory cards are written to
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            output: default_output_dir(),
        }
    }
}

/// A site integration and its options.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Integration {
    Sitemap,
    Mdx,
    Pagefind,
    OpengraphImages(OpenGraphOptions),
    Compress(CompressOptions),
}

impl Integration {
    pub fn name(&self) -> &'static str {
        match self {
            Integration::Sitemap => "sitemap",
            Integration::Mdx => "mdx",
            Integration::Pagefind => "pagefind",
            Integration::OpengraphImages(_) => "opengraph-images",
            Integration::Compress(_) => "compress",
        }
    }
}

/// Options for Open Graph card generation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OpenGraphOptions {
    /// Label next to the logo; defaults to the site host
    #[serde(default)]
    pub site_label: Option<String>,

    #[serde(default = "default_card_width")]
    pub width: u32,

    #[serde(default = "default_card_height")]
    pub height: u32,

    #[serde(default)]
    pub format: ImageFormat,

    /// Fonts available to the rasterizer, first one is the default family
    #[serde(default)]
    pub fonts: Vec<CardFont>,

    #[serde(default)]
    pub theme: ThemeOverrides,
}

impl Default for OpenGraphOptions {
    fn default() -> Self {
        Self {
            site_label: None,
            width: default_card_width(),
            height: default_card_height(),
            format: ImageFormat::default(),
            fonts: Vec::new(),
            theme: ThemeOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CardFont {
    pub name: String,

    #[serde(default = "default_font_weight")]
    pub weight: u16,

    #[serde(default)]
    pub style: FontStyle,

    /// TrueType/OpenType file, relative to the config file
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

/// Per-asset-class compression toggles.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CompressOptions {
    #[serde(default = "default_true")]
    pub css: bool,
    #[serde(default = "default_true")]
    pub html: bool,
    #[serde(default = "default_true")]
    pub image: bool,
    #[serde(default = "default_true")]
    pub javascript: bool,
    #[serde(default = "default_true")]
    pub svg: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            css: true,
            html: true,
            image: true,
            javascript: true,
            svg: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MarkdownOptions {
    #[serde(default)]
    pub shiki: ShikiOptions,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ShikiOptions {
    #[serde(default = "default_shiki_theme")]
    pub theme: String,
}

impl Default for ShikiOptions {
    fn default() -> Self {
        Self {
            theme: default_shiki_theme(),
        }
    }
}

/// Image pipeline defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageOptions {
    #[serde(default)]
    pub responsive_styles: bool,

    #[serde(default)]
    pub layout: Option<ImageLayout>,

    #[serde(default = "default_image_formats")]
    pub formats: Vec<RasterFormat>,

    #[serde(default = "default_quality")]
    pub quality: u8,

    #[serde(default)]
    pub svg: SvgOptions,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            responsive_styles: false,
            layout: None,
            formats: default_image_formats(),
            quality: default_quality(),
            svg: SvgOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ImageLayout {
    Constrained,
    FullWidth,
    Fixed,
    None,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Avif,
    Webp,
    Png,
    Jpeg,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SvgOptions {
    #[serde(default)]
    pub size: Option<SvgSize>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SvgSize {
    Optimize,
    Original,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PrefetchOptions {
    #[serde(default)]
    pub prefetch_all: bool,

    #[serde(default)]
    pub default_strategy: PrefetchStrategy,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrefetchStrategy {
    #[default]
    Hover,
    Tap,
    Viewport,
    Load,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExperimentalOptions {
    /// Web fonts exposed through CSS variables
    #[serde(default)]
    pub fonts: Vec<WebFont>,

    /// Content-security-policy generation
    #[serde(default)]
    pub csp: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WebFont {
    pub provider: FontProvider,
    pub name: String,
    pub css_variable: String,
    #[serde(default)]
    pub weights: Vec<String>,
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontProvider {
    Google,
    Fontsource,
    Bunny,
    Adobe,
    Local,
}

fn default_true() -> bool {
    true
}
fn default_content_dir() -> PathBuf {
    PathBuf::from("src/content")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("dist/og")
}
fn default_card_width() -> u32 {
    1200
}
fn default_card_height() -> u32 {
    630
}
fn default_font_weight() -> u16 {
    400
}
fn default_shiki_theme() -> String {
    "github-dark".to_string()
}
fn default_image_formats() -> Vec<RasterFormat> {
    vec![RasterFormat::Webp]
}
fn default_quality() -> u8 {
    80
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse site configuration: {0}")]
    Parse(String),

    #[error("Invalid site configuration: {0}")]
    Invalid(String),
}

impl SiteConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate config text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.site)
            .map_err(|e| ConfigError::Invalid(format!("site '{}': {}", self.site, e)))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigError::Invalid(format!(
                "site '{}' must be an absolute http(s) URL",
                self.site
            )));
        }

        let mut seen = HashSet::new();
        for integration in &self.integrations {
            if !seen.insert(integration.name()) {
                return Err(ConfigError::Invalid(format!(
                    "integration '{}' is listed more than once",
                    integration.name()
                )));
            }
        }

        if let Some(og) = self.og_options() {
            if og.width == 0 || og.height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "opengraph-images size must be non-zero, got {}x{}",
                    og.width, og.height
                )));
            }
            if og.fonts.iter().any(|f| f.name.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "opengraph-images fonts need a name".to_string(),
                ));
            }
        }

        if self.image.formats.is_empty() {
            return Err(ConfigError::Invalid(
                "image.formats must list at least one format".to_string(),
            ));
        }
        if !(1..=100).contains(&self.image.quality) {
            return Err(ConfigError::Invalid(format!(
                "image.quality must be between 1 and 100, got {}",
                self.image.quality
            )));
        }

        let mut variables = HashSet::new();
        for font in &self.experimental.fonts {
            if font.name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "experimental font without a name".to_string(),
                ));
            }
            if !font.css_variable.starts_with("--") || font.css_variable.len() <= 2 {
                return Err(ConfigError::Invalid(format!(
                    "css_variable '{}' of font '{}' must start with --",
                    font.css_variable, font.name
                )));
            }
            if !variables.insert(font.css_variable.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "css_variable '{}' is used by more than one font",
                    font.css_variable
                )));
            }
            for weight in &font.weights {
                let valid = weight
                    .parse::<u16>()
                    .map(|w| (1..=1000).contains(&w))
                    .unwrap_or(false);
                if !valid {
                    return Err(ConfigError::Invalid(format!(
                        "font '{}' has invalid weight '{}'",
                        font.name, weight
                    )));
                }
            }
        }

        Ok(())
    }

    /// Options of the Open Graph integration, if enabled.
    pub fn og_options(&self) -> Option<&OpenGraphOptions> {
        self.integrations.iter().find_map(|i| match i {
            Integration::OpengraphImages(options) => Some(options),
            _ => None,
        })
    }

    /// Options of the compress integration, if enabled.
    pub fn compress_options(&self) -> Option<&CompressOptions> {
        self.integrations.iter().find_map(|i| match i {
            Integration::Compress(options) => Some(options),
            _ => None,
        })
    }

    /// Host part of the site URL (`moyis.dev`).
    pub fn site_host(&self) -> Option<String> {
        Url::parse(&self.site)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// Configuration written by `ogcard init`.
pub const DEFAULT_SITE_TOML: &str = r#"# ogcard site configuration

# Deployed origin
site = "https://moyis.dev"
compress_html = true

[build]
inline_stylesheets = "auto"

[content]
# Pages to render cards for
dir = "src/content"
# Where cards are written
output = "dist/og"

[[integrations]]
name = "sitemap"

[[integrations]]
name = "mdx"

[[integrations]]
name = "pagefind"

[[integrations]]
name = "opengraph-images"
site_label = "moyis.dev"
width = 1200
height = 630
format = "png"

[[integrations.fonts]]
name = "Geist Sans"
weight = 400
style = "normal"
path = "fonts/GeistSans-Regular.ttf"

[[integrations]]
name = "compress"
css = true
html = false
# Images go through the image pipeline instead
image = false
javascript = true
svg = false

[markdown.shiki]
theme = "css-variables"

[image]
responsive_styles = true
layout = "constrained"
formats = ["avif", "webp"]
quality = 80

[image.svg]
size = "optimize"

[prefetch]
prefetch_all = true
default_strategy = "hover"

[experimental]
csp = false

[[experimental.fonts]]
provider = "google"
name = "Geist Sans"
css_variable = "--font-blog"
weights = ["400", "500", "600"]
fallbacks = [
    "ui-sans-serif",
    "system-ui",
    "sans-serif",
    "Apple Color Emoji",
    "Segoe UI Emoji",
    "Segoe UI Symbol",
    "Noto Color Emoji",
]

[[experimental.fonts]]
provider = "google"
name = "Geist Mono"
css_variable = "--font-code"
weights = ["400", "500", "600"]
fallbacks = [
    "ui-monospace",
    "SFMono-Regular",
    "Menlo",
    "Monaco",
    "Consolas",
    "Liberation Mono",
    "Courier New",
    "monospace",
]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = "site = \"https://example.org\"\n";

    #[test]
    fn parses_default_config() {
        let config = SiteConfig::from_toml(DEFAULT_SITE_TOML).unwrap();

        assert_eq!(config.site, "https://moyis.dev");
        assert_eq!(config.build.inline_stylesheets, InlineStylesheets::Auto);

        let names: Vec<_> = config.integrations.iter().map(|i| i.name()).collect();
        assert_eq!(
            names,
            vec!["sitemap", "mdx", "pagefind", "opengraph-images", "compress"]
        );

        let og = config.og_options().unwrap();
        assert_eq!((og.width, og.height), (1200, 630));
        assert_eq!(og.fonts[0].name, "Geist Sans");
        assert_eq!(og.fonts[0].style, FontStyle::Normal);

        let compress = config.compress_options().unwrap();
        assert!(compress.css);
        assert!(!compress.html);
        assert!(!compress.image);

        assert_eq!(config.markdown.shiki.theme, "css-variables");
        assert_eq!(config.image.formats, vec![RasterFormat::Avif, RasterFormat::Webp]);
        assert_eq!(config.image.layout, Some(ImageLayout::Constrained));
        assert_eq!(config.image.svg.size, Some(SvgSize::Optimize));
        assert!(config.prefetch.prefetch_all);
        assert_eq!(config.prefetch.default_strategy, PrefetchStrategy::Hover);
        assert!(!config.experimental.csp);
        assert_eq!(config.experimental.fonts.len(), 2);
        assert_eq!(config.experimental.fonts[1].css_variable, "--font-code");
        assert_eq!(config.experimental.fonts[1].provider, FontProvider::Google);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = SiteConfig::from_toml(MINIMAL).unwrap();

        assert!(config.compress_html);
        assert!(config.integrations.is_empty());
        assert!(config.og_options().is_none());
        assert_eq!(config.content, ContentOptions::default());
        assert_eq!(config.image.quality, 80);
        assert_eq!(config.site_host().as_deref(), Some("example.org"));
    }

    #[test]
    fn rejects_nameless_integration() {
        let source = format!("{}\n[[integrations]]\nname = \"mdx\"\n\n[[integrations]]\n", MINIMAL);

        let result = SiteConfig::from_toml(&source);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_unknown_integration() {
        let source = format!("{}\n[[integrations]]\nname = \"partytown\"\n", MINIMAL);

        assert!(matches!(
            SiteConfig::from_toml(&source),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_duplicate_integrations() {
        let source = format!(
            "{}\n[[integrations]]\nname = \"sitemap\"\n\n[[integrations]]\nname = \"sitemap\"\n",
            MINIMAL
        );

        assert!(matches!(
            SiteConfig::from_toml(&source),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_relative_site() {
        assert!(matches!(
            SiteConfig::from_toml("site = \"/blog\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SiteConfig::from_toml("site = \"ftp://example.org\"\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_bad_quality() {
        let source = format!("{}\n[image]\nquality = 0\n", MINIMAL);

        assert!(matches!(
            SiteConfig::from_toml(&source),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_bad_css_variable() {
        let source = format!(
            "{}\n[[experimental.fonts]]\nprovider = \"google\"\nname = \"Geist\"\ncss_variable = \"font-blog\"\n",
            MINIMAL
        );

        assert!(matches!(
            SiteConfig::from_toml(&source),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_bad_weight() {
        let source = format!(
            "{}\n[[experimental.fonts]]\nprovider = \"google\"\nname = \"Geist\"\ncss_variable = \"--font\"\nweights = [\"bold\"]\n",
            MINIMAL
        );

        assert!(matches!(
            SiteConfig::from_toml(&source),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn reads_theme_overrides() {
        let source = format!(
            "{}\n[[integrations]]\nname = \"opengraph-images\"\n\n[integrations.theme]\nrem_px = 18.0\n\n[integrations.theme.colors]\nbolt = \"#feb804\"\n",
            MINIMAL
        );

        let config = SiteConfig::from_toml(&source).unwrap();
        let theme = &config.og_options().unwrap().theme;

        assert_eq!(theme.rem_px, Some(18.0));
        assert_eq!(theme.colors.get("bolt").map(String::as_str), Some("#feb804"));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = SiteConfig::load(Path::new("/definitely/not/here/site.toml"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
