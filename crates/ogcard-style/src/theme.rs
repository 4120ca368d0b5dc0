//! Theme tokens: colour palette, spacing scale and type scale.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::convert::StyleError;

const SHADES: [&str; 11] = [
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

const PALETTE: &[(&str, [&str; 11])] = &[
    (
        "neutral",
        [
            "#fafafa", "#f5f5f5", "#e5e5e5", "#d4d4d4", "#a3a3a3", "#737373", "#525252",
            "#404040", "#262626", "#171717", "#0a0a0a",
        ],
    ),
    (
        "gray",
        [
            "#f9fafb", "#f3f4f6", "#e5e7eb", "#d1d5db", "#9ca3af", "#6b7280", "#4b5563",
            "#374151", "#1f2937", "#111827", "#030712",
        ],
    ),
    (
        "red",
        [
            "#fef2f2", "#fee2e2", "#fecaca", "#fca5a5", "#f87171", "#ef4444", "#dc2626",
            "#b91c1c", "#991b1b", "#7f1d1d", "#450a0a",
        ],
    ),
    (
        "amber",
        [
            "#fffbeb", "#fef3c7", "#fde68a", "#fcd34d", "#fbbf24", "#f59e0b", "#d97706",
            "#b45309", "#92400e", "#78350f", "#451a03",
        ],
    ),
    (
        "yellow",
        [
            "#fefce8", "#fef9c3", "#fef08a", "#fde047", "#facc15", "#eab308", "#ca8a04",
            "#a16207", "#854d0e", "#713f12", "#422006",
        ],
    ),
    (
        "blue",
        [
            "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6", "#2563eb",
            "#1d4ed8", "#1e40af", "#1e3a8a", "#172554",
        ],
    ),
];

/// (name, font size in rem, line height)
const FONT_SIZES: &[(&str, f32, &str)] = &[
    ("xs", 0.75, "1rem"),
    ("sm", 0.875, "1.25rem"),
    ("base", 1.0, "1.5rem"),
    ("lg", 1.125, "1.75rem"),
    ("xl", 1.25, "1.75rem"),
    ("2xl", 1.5, "2rem"),
    ("3xl", 1.875, "2.25rem"),
    ("4xl", 2.25, "2.5rem"),
    ("5xl", 3.0, "1"),
    ("6xl", 3.75, "1"),
    ("7xl", 4.5, "1"),
    ("8xl", 6.0, "1"),
    ("9xl", 8.0, "1"),
];

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
        .expect("Invalid hex colour regex")
});

/// Check whether a string is a `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` colour.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// User-supplied theme extensions, read from site configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ThemeOverrides {
    /// Extra or replacement colours: `brand = "#feb804"`
    #[serde(default)]
    pub colors: HashMap<String, String>,

    /// Root font size in px (defaults to 16)
    #[serde(default)]
    pub rem_px: Option<f32>,
}

/// Resolved theme used by the interpreter.
#[derive(Debug, Clone)]
pub struct Theme {
    colors: HashMap<String, String>,
    rem_px: f32,
}

impl Default for Theme {
    fn default() -> Self {
        let mut colors = HashMap::new();
        colors.insert("white".to_string(), "#ffffff".to_string());
        colors.insert("black".to_string(), "#000000".to_string());
        colors.insert("transparent".to_string(), "transparent".to_string());

        for (family, hexes) in PALETTE {
            for (shade, hex) in SHADES.iter().zip(hexes.iter()) {
                colors.insert(format!("{}-{}", family, shade), hex.to_string());
            }
        }

        Self {
            colors,
            rem_px: 16.0,
        }
    }
}

impl Theme {
    /// Apply overrides on top of the default theme.
    ///
    /// Fails on the first invalid entry.
    pub fn with_overrides(overrides: &ThemeOverrides) -> Result<Self, StyleError> {
        let mut theme = Self::default();

        if let Some(rem_px) = overrides.rem_px {
            if !(rem_px.is_finite() && rem_px > 0.0) {
                return Err(StyleError::Theme(format!(
                    "rem_px must be a positive number, got {}",
                    rem_px
                )));
            }
            theme.rem_px = rem_px;
        }

        for (name, value) in &overrides.colors {
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(StyleError::Theme(format!("invalid colour name '{}'", name)));
            }
            if !is_hex_color(value) {
                return Err(StyleError::Theme(format!(
                    "colour '{}' is not a hex colour: {}",
                    name, value
                )));
            }
            theme.colors.insert(name.clone(), value.clone());
        }

        Ok(theme)
    }

    /// Look up a named colour (`white`, `neutral-900`, custom names).
    pub fn color(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    /// Root font size in px.
    pub fn rem_px(&self) -> f32 {
        self.rem_px
    }

    /// Convert a spacing scale step (`4` -> 1rem) to px.
    pub fn spacing(&self, step: f32) -> f32 {
        step * 0.25 * self.rem_px
    }

    /// Font size in px and line height for a named size (`xl`, `6xl`).
    pub fn font_size(&self, name: &str) -> Option<(f32, String)> {
        FONT_SIZES
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, rem, line_height)| {
                let line_height = match line_height.strip_suffix("rem") {
                    Some(lh) => lh
                        .parse::<f32>()
                        .map(|lh| px(lh * self.rem_px))
                        .unwrap_or_else(|_| line_height.to_string()),
                    None => line_height.to_string(),
                };
                (rem * self.rem_px, line_height)
            })
    }
}

/// Format a px length, dropping a trailing `.0`.
pub fn px(value: f32) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{}px", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_has_card_colours() {
        let theme = Theme::default();

        assert_eq!(theme.color("neutral-900"), Some("#171717"));
        assert_eq!(theme.color("neutral-800"), Some("#262626"));
        assert_eq!(theme.color("white"), Some("#ffffff"));
        assert_eq!(theme.color("chartreuse-500"), None);
    }

    #[test]
    fn spacing_follows_quarter_rem_scale() {
        let theme = Theme::default();

        assert_eq!(theme.spacing(20.0), 80.0);
        assert_eq!(theme.spacing(0.5), 2.0);
    }

    #[test]
    fn font_size_resolves_line_height() {
        let theme = Theme::default();

        assert_eq!(theme.font_size("xl"), Some((20.0, "28px".to_string())));
        assert_eq!(theme.font_size("6xl"), Some((60.0, "1".to_string())));
        assert_eq!(theme.font_size("huge"), None);
    }

    #[test]
    fn overrides_add_colours() {
        let mut overrides = ThemeOverrides::default();
        overrides
            .colors
            .insert("bolt".to_string(), "#feb804".to_string());

        let theme = Theme::with_overrides(&overrides).unwrap();

        assert_eq!(theme.color("bolt"), Some("#feb804"));
    }

    #[test]
    fn overrides_reject_bad_colours() {
        let mut overrides = ThemeOverrides::default();
        overrides
            .colors
            .insert("bolt".to_string(), "yellowish".to_string());

        let err = Theme::with_overrides(&overrides).unwrap_err();

        assert!(matches!(err, StyleError::Theme(ref message) if message.contains("bolt")));
    }

    #[test]
    fn overrides_reject_non_positive_rem() {
        let overrides = ThemeOverrides {
            rem_px: Some(0.0),
            ..Default::default()
        };

        assert!(matches!(
            Theme::with_overrides(&overrides),
            Err(StyleError::Theme(_))
        ));
    }

    #[test]
    fn px_formats_whole_numbers() {
        assert_eq!(px(80.0), "80px");
        assert_eq!(px(2.5), "2.5px");
        assert_eq!(px(0.0), "0");
    }
}
