//! Utility class string to style map conversion.

use std::sync::LazyLock;

use regex::Regex;

use crate::class::{parse_class, UtilityClass};
use crate::style::StyleMap;
use crate::theme::{is_hex_color, px, Theme, ThemeOverrides};

/// Errors that can occur when translating classes.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Unknown utility class: {0}")]
    UnknownClass(String),

    #[error("Invalid value in class {class}: {value}")]
    InvalidValue { class: String, value: String },

    #[error("Failed to load theme: {0}")]
    Theme(String),
}

/// Anything that can turn a utility class string into a style map.
pub trait StyleSource: Send + Sync {
    /// Translate a whitespace-separated class string.
    ///
    /// Later classes override earlier ones for the same property.
    fn translate(&self, classes: &str) -> Result<StyleMap, StyleError>;
}

/// Tailwind-compatible interpreter over a fixed rule set.
#[derive(Debug, Clone, Default)]
pub struct Tailwind {
    theme: Theme,
}

/// Properties set by each spacing prefix.
const SPACING: &[(&str, &[&str])] = &[
    ("p", &["padding"]),
    ("px", &["padding-left", "padding-right"]),
    ("py", &["padding-top", "padding-bottom"]),
    ("pt", &["padding-top"]),
    ("pr", &["padding-right"]),
    ("pb", &["padding-bottom"]),
    ("pl", &["padding-left"]),
    ("m", &["margin"]),
    ("mx", &["margin-left", "margin-right"]),
    ("my", &["margin-top", "margin-bottom"]),
    ("mt", &["margin-top"]),
    ("mr", &["margin-right"]),
    ("mb", &["margin-bottom"]),
    ("ml", &["margin-left"]),
    ("gap", &["gap"]),
    ("gap-x", &["column-gap"]),
    ("gap-y", &["row-gap"]),
];

const SIZING: &[(&str, &str)] = &[("w", "width"), ("h", "height")];

/// Border radius steps in rem.
const RADII: &[(&str, f32)] = &[
    ("rounded-none", 0.0),
    ("rounded-sm", 0.125),
    ("rounded", 0.25),
    ("rounded-md", 0.375),
    ("rounded-lg", 0.5),
    ("rounded-xl", 0.75),
    ("rounded-2xl", 1.0),
    ("rounded-3xl", 1.5),
];

const GRADIENT_DIRECTIONS: &[(&str, &str)] = &[
    ("t", "to top"),
    ("tr", "to top right"),
    ("r", "to right"),
    ("br", "to bottom right"),
    ("b", "to bottom"),
    ("bl", "to bottom left"),
    ("l", "to left"),
    ("tl", "to top left"),
];

static LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)(?:px|rem|em|%|vw|vh)?$").expect("Invalid length regex")
});

/// Gradient pieces collected across a class string.
#[derive(Debug, Default)]
struct Gradient {
    direction: Option<&'static str>,
    from: Option<String>,
    via: Option<String>,
    to: Option<String>,
}

impl Gradient {
    /// Compose a `linear-gradient(..)` if a direction was given.
    fn finish(self) -> Option<String> {
        let direction = self.direction?;
        let mut stops = vec![self.from.unwrap_or_else(|| "transparent".to_string())];
        stops.extend(self.via);
        stops.push(self.to.unwrap_or_else(|| "transparent".to_string()));

        Some(format!("linear-gradient({}, {})", direction, stops.join(", ")))
    }
}

impl Tailwind {
    /// Create an interpreter with the default theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interpreter with theme overrides applied.
    pub fn load(overrides: &ThemeOverrides) -> Result<Self, StyleError> {
        Ok(Self {
            theme: Theme::with_overrides(overrides)?,
        })
    }

    /// The resolved theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn keyword(
        &self,
        class: &str,
        style: &mut StyleMap,
        gradient: &mut Gradient,
    ) -> Result<(), StyleError> {
        if let Some(props) = static_rule(class) {
            for (property, value) in props {
                style.insert(*property, *value);
            }
            return Ok(());
        }

        if let Some((_, rem)) = RADII.iter().find(|(name, _)| *name == class) {
            style.insert("border-radius", px(rem * self.theme.rem_px()));
            return Ok(());
        }
        if class == "rounded-full" {
            style.insert("border-radius", "9999px");
            return Ok(());
        }

        if let Some(dir) = class.strip_prefix("bg-gradient-to-") {
            let Some((_, direction)) = GRADIENT_DIRECTIONS.iter().find(|(d, _)| *d == dir) else {
                return Err(StyleError::UnknownClass(class.to_string()));
            };
            gradient.direction = Some(*direction);
            return Ok(());
        }

        if let Some((prefix, value)) = class.rsplit_once('-') {
            if let Some((_, properties)) = SPACING.iter().find(|(p, _)| *p == prefix) {
                let length = self.spacing_value(value).ok_or_else(|| unknown(class))?;
                for property in *properties {
                    style.insert(*property, length.clone());
                }
                return Ok(());
            }

            if let Some((_, property)) = SIZING.iter().find(|(p, _)| *p == prefix) {
                let length = self
                    .size_value(property, value)
                    .ok_or_else(|| unknown(class))?;
                style.insert(*property, length);
                return Ok(());
            }

            if prefix == "opacity" {
                let opacity: u8 = value.parse().map_err(|_| unknown(class))?;
                if opacity > 100 {
                    return Err(StyleError::InvalidValue {
                        class: class.to_string(),
                        value: value.to_string(),
                    });
                }
                style.insert("opacity", format!("{}", f32::from(opacity) / 100.0));
                return Ok(());
            }
        }

        if let Some(rest) = class.strip_prefix("text-") {
            if let Some((size, line_height)) = self.theme.font_size(rest) {
                style.insert("font-size", px(size));
                style.insert("line-height", line_height);
                return Ok(());
            }
            if let Some(color) = self.theme.color(rest) {
                style.insert("color", color);
                return Ok(());
            }
        }

        if let Some(color) = class.strip_prefix("bg-").and_then(|c| self.theme.color(c)) {
            style.insert("background-color", color);
            return Ok(());
        }

        if let Some(stop) = self.gradient_stop(class) {
            let (slot, color) = stop;
            match slot {
                "from" => gradient.from = Some(color),
                "via" => gradient.via = Some(color),
                _ => gradient.to = Some(color),
            }
            return Ok(());
        }

        Err(unknown(class))
    }

    fn arbitrary(
        &self,
        class: &str,
        prefix: &str,
        value: &str,
        style: &mut StyleMap,
        gradient: &mut Gradient,
    ) -> Result<(), StyleError> {
        let invalid = || StyleError::InvalidValue {
            class: class.to_string(),
            value: value.to_string(),
        };

        match prefix {
            "text" if is_length(value) => style.insert("font-size", value),
            "text" if is_color(value) => style.insert("color", value),
            "bg" if is_color(value) => style.insert("background-color", value),
            "text" | "bg" => return Err(invalid()),
            "from" | "via" | "to" => {
                if !is_color(value) {
                    return Err(invalid());
                }
                let color = Some(value.to_string());
                match prefix {
                    "from" => gradient.from = color,
                    "via" => gradient.via = color,
                    _ => gradient.to = color,
                }
            }
            "font" if value.parse::<u16>().is_ok() => style.insert("font-weight", value),
            "font" => style.insert("font-family", value),
            "opacity" => {
                let opacity: f32 = value.parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(invalid());
                }
                style.insert("opacity", value);
            }
            "leading" if is_length(value) => style.insert("line-height", value),
            "tracking" if is_length(value) => style.insert("letter-spacing", value),
            "rounded" if is_length(value) => style.insert("border-radius", value),
            _ => {
                let spacing = SPACING
                    .iter()
                    .find(|(p, _)| *p == prefix)
                    .map(|(_, props)| *props);
                let sizing = SIZING
                    .iter()
                    .find(|(p, _)| *p == prefix)
                    .map(|(_, prop)| std::slice::from_ref(prop));

                let Some(properties) = spacing.or(sizing) else {
                    return Err(unknown(class));
                };
                if !is_length(value) {
                    return Err(invalid());
                }
                for property in properties {
                    style.insert(*property, value);
                }
            }
        }

        Ok(())
    }

    /// `20` -> `80px`, `px` -> `1px`, `0.5` -> `2px`
    fn spacing_value(&self, value: &str) -> Option<String> {
        if value == "px" {
            return Some("1px".to_string());
        }
        let step: f32 = value.parse().ok()?;
        if !step.is_finite() || step < 0.0 {
            return None;
        }
        Some(px(self.theme.spacing(step)))
    }

    /// Spacing scale plus `full`, `screen`, `auto` and fractions.
    fn size_value(&self, property: &str, value: &str) -> Option<String> {
        match value {
            "full" => return Some("100%".to_string()),
            "auto" => return Some("auto".to_string()),
            "screen" if property == "width" => return Some("100vw".to_string()),
            "screen" => return Some("100vh".to_string()),
            _ => {}
        }
        if let Some((num, den)) = value.split_once('/') {
            let num: f32 = num.parse().ok()?;
            let den: f32 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            return Some(percent(num / den * 100.0));
        }
        self.spacing_value(value)
    }

    /// `from-neutral-900` -> ("from", "#171717")
    fn gradient_stop(&self, class: &str) -> Option<(&'static str, String)> {
        ["from", "via", "to"].into_iter().find_map(|slot| {
            let name = class.strip_prefix(slot)?.strip_prefix('-')?;
            self.theme.color(name).map(|c| (slot, c.to_string()))
        })
    }
}

impl StyleSource for Tailwind {
    fn translate(&self, classes: &str) -> Result<StyleMap, StyleError> {
        let mut style = StyleMap::new();
        let mut gradient = Gradient::default();

        for token in classes.split_whitespace() {
            match parse_class(token) {
                UtilityClass::Keyword(class) => self.keyword(class, &mut style, &mut gradient)?,
                UtilityClass::Arbitrary { prefix, value } => {
                    self.arbitrary(token, prefix, &value, &mut style, &mut gradient)?
                }
            }
        }

        if let Some(image) = gradient.finish() {
            style.insert("background-image", image);
        }

        Ok(style)
    }
}

/// Fixed keyword rules that do not depend on the theme.
fn static_rule(class: &str) -> Option<&'static [(&'static str, &'static str)]> {
    let rule: &'static [(&'static str, &'static str)] = match class {
        "flex" => &[("display", "flex")],
        "block" => &[("display", "block")],
        "hidden" => &[("display", "none")],
        "flex-row" => &[("flex-direction", "row")],
        "flex-col" => &[("flex-direction", "column")],
        "flex-wrap" => &[("flex-wrap", "wrap")],
        "flex-nowrap" => &[("flex-wrap", "nowrap")],
        "flex-1" => &[("flex-grow", "1"), ("flex-shrink", "1"), ("flex-basis", "0%")],
        "grow" => &[("flex-grow", "1")],
        "grow-0" => &[("flex-grow", "0")],
        "shrink" => &[("flex-shrink", "1")],
        "shrink-0" => &[("flex-shrink", "0")],
        "items-start" => &[("align-items", "flex-start")],
        "items-end" => &[("align-items", "flex-end")],
        "items-center" => &[("align-items", "center")],
        "items-baseline" => &[("align-items", "baseline")],
        "items-stretch" => &[("align-items", "stretch")],
        "justify-start" => &[("justify-content", "flex-start")],
        "justify-end" => &[("justify-content", "flex-end")],
        "justify-center" => &[("justify-content", "center")],
        "justify-between" => &[("justify-content", "space-between")],
        "justify-around" => &[("justify-content", "space-around")],
        "justify-evenly" => &[("justify-content", "space-evenly")],
        "text-left" => &[("text-align", "left")],
        "text-center" => &[("text-align", "center")],
        "text-right" => &[("text-align", "right")],
        "text-justify" => &[("text-align", "justify")],
        "font-thin" => &[("font-weight", "100")],
        "font-extralight" => &[("font-weight", "200")],
        "font-light" => &[("font-weight", "300")],
        "font-normal" => &[("font-weight", "400")],
        "font-medium" => &[("font-weight", "500")],
        "font-semibold" => &[("font-weight", "600")],
        "font-bold" => &[("font-weight", "700")],
        "font-extrabold" => &[("font-weight", "800")],
        "font-black" => &[("font-weight", "900")],
        "italic" => &[("font-style", "italic")],
        "not-italic" => &[("font-style", "normal")],
        "uppercase" => &[("text-transform", "uppercase")],
        "lowercase" => &[("text-transform", "lowercase")],
        "capitalize" => &[("text-transform", "capitalize")],
        "normal-case" => &[("text-transform", "none")],
        "leading-none" => &[("line-height", "1")],
        "leading-tight" => &[("line-height", "1.25")],
        "leading-snug" => &[("line-height", "1.375")],
        "leading-normal" => &[("line-height", "1.5")],
        "leading-relaxed" => &[("line-height", "1.625")],
        "leading-loose" => &[("line-height", "2")],
        "tracking-tighter" => &[("letter-spacing", "-0.05em")],
        "tracking-tight" => &[("letter-spacing", "-0.025em")],
        "tracking-normal" => &[("letter-spacing", "0em")],
        "tracking-wide" => &[("letter-spacing", "0.025em")],
        "tracking-wider" => &[("letter-spacing", "0.05em")],
        "tracking-widest" => &[("letter-spacing", "0.1em")],
        _ => return None,
    };
    Some(rule)
}

fn unknown(class: &str) -> StyleError {
    StyleError::UnknownClass(class.to_string())
}

fn is_length(value: &str) -> bool {
    LENGTH.is_match(value)
}

fn is_color(value: &str) -> bool {
    is_hex_color(value)
        || (["rgb(", "rgba(", "hsl(", "hsla("]
            .iter()
            .any(|p| value.starts_with(p))
            && value.ends_with(')'))
}

/// Format a percentage with at most six decimals.
fn percent(value: f32) -> String {
    let formatted = format!("{:.6}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{}%", trimmed)
}
