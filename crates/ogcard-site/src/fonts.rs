//! Font CSS variables and card font loading.

use std::fs;
use std::path::Path;

use ogcard_render::FontSource;

use crate::builder::BuildError;
use crate::config::{OpenGraphOptions, SiteConfig, WebFont};

/// Generic families are emitted bare, everything else is quoted.
const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-serif",
    "ui-sans-serif",
    "ui-monospace",
    "ui-rounded",
    "emoji",
    "math",
    "fangsong",
];

/// Build a `:root` rule declaring one variable per font.
///
/// ```css
/// :root {
///   --font-blog: "Geist Sans", ui-sans-serif, sans-serif;
/// }
/// ```
pub fn font_variables_css(fonts: &[WebFont]) -> String {
    let mut css = String::from(":root {\n");

    for font in fonts {
        let families: Vec<String> = std::iter::once(quote_family(&font.name))
            .chain(font.fallbacks.iter().map(|f| quote_family(f)))
            .collect();
        css.push_str(&format!("  {}: {};\n", font.css_variable, families.join(", ")));
    }

    css.push_str("}\n");
    css
}

fn quote_family(family: &str) -> String {
    let family = family.trim();
    let plain = family
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    let leading_digit = family.starts_with(|c: char| c.is_ascii_digit());

    if GENERIC_FAMILIES.contains(&family) || (plain && !leading_digit) {
        family.to_string()
    } else {
        format!("\"{}\"", family.replace('"', "\\\""))
    }
}

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, BuildError> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| BuildError::Css(format!("parse error: {}", e)))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| BuildError::Css(format!("minify error: {}", e)))?;

    Ok(minified.code)
}

/// Font variable stylesheet for a site, minified when the compress
/// integration enables CSS.
pub fn stylesheet(config: &SiteConfig) -> Result<String, BuildError> {
    let css = font_variables_css(&config.experimental.fonts);

    match config.compress_options() {
        Some(compress) if compress.css => minify_css(&css),
        _ => Ok(css),
    }
}

/// Read the configured card fonts. Relative paths resolve against `base_dir`.
pub fn load_card_fonts(
    options: &OpenGraphOptions,
    base_dir: &Path,
) -> Result<Vec<FontSource>, BuildError> {
    let mut fonts = Vec::with_capacity(options.fonts.len());

    for font in &options.fonts {
        let path = base_dir.join(&font.path);

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if ext == "woff" || ext == "woff2" {
            return Err(BuildError::Font {
                path: path.display().to_string(),
                message: "WOFF fonts cannot be rasterized, use a TTF or OTF file".to_string(),
            });
        }

        let data = fs::read(&path).map_err(|e| BuildError::Font {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!("Read card font {} from {}", font.name, path.display());

        fonts.push(FontSource {
            name: font.name.clone(),
            weight: font.weight,
            style: font.style.as_str().to_string(),
            data,
        });
    }

    Ok(fonts)
}
