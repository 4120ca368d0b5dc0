//! Site configuration and batch card generation.
//!
//! Loads `site.toml`, validates it, and renders one Open Graph card per
//! content page.

pub mod builder;
pub mod config;
pub mod fonts;
pub mod pipeline;

pub use builder::{BuildConfig, BuildError, BuildResult, ManifestEntry, OgBuilder};
pub use config::{ConfigError, Integration, OpenGraphOptions, SiteConfig, DEFAULT_SITE_TOML};
pub use fonts::{font_variables_css, load_card_fonts, minify_css, stylesheet};
pub use pipeline::CardPipeline;
