//! Minimal flex layout over the node tree.
//!
//! Produces a flat list of positioned [`Drawable`]s. Only the subset of CSS the
//! card needs is understood: flex direction, padding, margin, gap, px/rem/em/%
//! sizes, `justify-content`, `align-items`, `flex-grow`, backgrounds and basic
//! text properties. Containers default to `display: flex` in a row, like
//! Satori. Unsupported properties are ignored.
//!
//! Text is measured with an average glyph advance rather than real font
//! metrics, so wrapping is approximate.

use ogcard_style::StyleMap;

use crate::node::{Node, VectorGraphic};

const DEFAULT_LINE_HEIGHT: f32 = 1.2;
/// Average glyph advance in em for a proportional sans-serif face.
const AVERAGE_ADVANCE_EM: f32 = 0.55;
const BOLD_ADVANCE_FACTOR: f32 = 1.06;

/// Output surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    /// Default font family for text without an explicit `font-family`
    pub font_family: String,
    /// Root font size in px; `rem` lengths and unsized text resolve against it
    pub rem_px: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            font_family: "Geist Sans".to_string(),
            rem_px: 16.0,
        }
    }
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn with_rem_px(mut self, rem_px: f32) -> Self {
        self.rem_px = rem_px;
        self
    }
}

/// How a rectangle is filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Color(String),
    LinearGradient {
        /// CSS direction keyword: `to right`, `to bottom left`
        direction: String,
        stops: Vec<String>,
    },
}

/// Horizontal anchoring of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// A positioned primitive ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        paint: Paint,
    },
    Text {
        /// Anchor x position
        x: f32,
        /// Top of the first line box
        y: f32,
        anchor: TextAnchor,
        lines: Vec<String>,
        font_size: f32,
        line_height: f32,
        font_weight: u16,
        font_style: String,
        font_family: Option<String>,
        color: String,
    },
    Vector {
        x: f32,
        y: f32,
        graphic: VectorGraphic,
    },
}

/// Lay out a node tree on a canvas.
///
/// The root fills the canvas unless it sets an explicit px size.
pub fn layout(tree: &Node, canvas: &Canvas) -> Vec<Drawable> {
    let width = canvas.width as f32;
    let height = canvas.height as f32;
    let units = Units {
        rem: canvas.rem_px,
        viewport_width: width,
        viewport_height: height,
    };
    let style = tree.style();

    let root_width = explicit(style, "width", width, &units).unwrap_or(width);
    let root_height = explicit(style, "height", height, &units).unwrap_or(height);

    let mut out = Vec::new();
    place(tree, 0.0, 0.0, root_width, root_height, &units, &mut out);
    out
}

/// Reference sizes for relative CSS units.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Units {
    rem: f32,
    viewport_width: f32,
    viewport_height: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Size {
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Edges {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Edges {
    fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Font {
    size: f32,
    line_height: f32,
    weight: u16,
}

impl Font {
    fn from_style(style: &StyleMap, units: &Units) -> Self {
        let size = style
            .get("font-size")
            .and_then(|v| length(v, units.rem, units.rem, units))
            .unwrap_or(units.rem);

        let line_height = style
            .get("line-height")
            .and_then(|v| {
                v.parse::<f32>()
                    .ok()
                    .map(|factor| factor * size)
                    .or_else(|| length(v, size, size, units))
            })
            .unwrap_or(size * DEFAULT_LINE_HEIGHT);

        let weight = style
            .get("font-weight")
            .and_then(|v| v.parse().ok())
            .unwrap_or(400);

        Self {
            size,
            line_height,
            weight,
        }
    }

    fn advance(&self) -> f32 {
        let factor = if self.weight >= 600 {
            BOLD_ADVANCE_FACTOR
        } else {
            1.0
        };
        self.size * AVERAGE_ADVANCE_EM * factor
    }
}

/// Parse a CSS length against a percentage basis and the current font size.
fn length(value: &str, basis: f32, font_size: f32, units: &Units) -> Option<f32> {
    let value = value.trim();
    if value == "0" {
        return Some(0.0);
    }
    if let Some(n) = value.strip_suffix("px") {
        return n.parse().ok();
    }
    if let Some(n) = value.strip_suffix("rem") {
        return n.parse::<f32>().ok().map(|n| n * units.rem);
    }
    if let Some(n) = value.strip_suffix("vw") {
        return n.parse::<f32>().ok().map(|n| units.viewport_width * n / 100.0);
    }
    if let Some(n) = value.strip_suffix("vh") {
        return n.parse::<f32>().ok().map(|n| units.viewport_height * n / 100.0);
    }
    if let Some(n) = value.strip_suffix("em") {
        return n.parse::<f32>().ok().map(|n| n * font_size);
    }
    if let Some(n) = value.strip_suffix('%') {
        return n.parse::<f32>().ok().map(|n| basis * n / 100.0);
    }
    None
}

/// Explicit size of a property; percentages resolve against `basis`.
///
/// Pass `f32::NAN` as basis to ignore percentages.
fn explicit(style: &StyleMap, property: &str, basis: f32, units: &Units) -> Option<f32> {
    style
        .get(property)
        .and_then(|v| length(v, basis, units.rem, units))
        .filter(|v| v.is_finite())
}

fn edges(style: &StyleMap, prefix: &str, basis: f32, units: &Units) -> Edges {
    let all = style
        .get(prefix)
        .and_then(|v| length(v, basis, units.rem, units))
        .unwrap_or(0.0);
    let side = |name: &str| {
        style
            .get(&format!("{}-{}", prefix, name))
            .and_then(|v| length(v, basis, units.rem, units))
            .unwrap_or(all)
    };

    Edges {
        top: side("top"),
        right: side("right"),
        bottom: side("bottom"),
        left: side("left"),
    }
}

fn is_hidden(node: &Node) -> bool {
    node.style().get("display") == Some("none")
}

fn is_column(style: &StyleMap) -> bool {
    style.get("display") == Some("block")
        || matches!(style.get("flex-direction"), Some("column"))
}

fn gap(style: &StyleMap, column: bool, basis: f32, units: &Units) -> f32 {
    let axis = if column { "row-gap" } else { "column-gap" };
    style
        .get(axis)
        .or_else(|| style.get("gap"))
        .and_then(|v| length(v, basis, units.rem, units))
        .unwrap_or(0.0)
}

fn transform_text(text: &str, transform: Option<&str>) -> String {
    match transform {
        Some("uppercase") => text.to_uppercase(),
        Some("lowercase") => text.to_lowercase(),
        _ => text.to_string(),
    }
}

/// Greedy whitespace wrapping. Words wider than the line keep their own line.
fn wrap(text: &str, max_width: f32, advance: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_chars = 0usize;

        for word in paragraph.split_whitespace() {
            let word_chars = word.chars().count();
            let candidate = if line.is_empty() {
                word_chars
            } else {
                line_chars + 1 + word_chars
            };

            if !line.is_empty() && candidate as f32 * advance > max_width {
                lines.push(std::mem::take(&mut line));
                line_chars = 0;
            }
            if !line.is_empty() {
                line.push(' ');
                line_chars += 1;
            }
            line.push_str(word);
            line_chars += word_chars;
        }

        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

fn line_width(line: &str, advance: f32) -> f32 {
    line.chars().count() as f32 * advance
}

/// Background paints of a node, bottom-most first.
fn paints(style: &StyleMap) -> Vec<Paint> {
    let mut paints = Vec::new();

    if let Some(color) = style.get("background-color") {
        paints.push(Paint::Color(color.to_string()));
    }
    if let Some(gradient) = style.get("background-image").and_then(parse_linear_gradient) {
        paints.push(gradient);
    }

    paints
}

/// Parse `linear-gradient(to right, #171717, #262626)`.
fn parse_linear_gradient(value: &str) -> Option<Paint> {
    let body = value
        .trim()
        .strip_prefix("linear-gradient(")?
        .strip_suffix(')')?;

    let mut parts = split_top_level(body);
    if parts.is_empty() {
        return None;
    }

    let direction = if parts[0].starts_with("to ") {
        parts.remove(0)
    } else {
        "to bottom".to_string()
    };

    if parts.is_empty() {
        return None;
    }

    Some(Paint::LinearGradient {
        direction,
        stops: parts,
    })
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in body.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Intrinsic size of a node given the width available to it.
fn measure(node: &Node, available: f32, units: &Units) -> Size {
    if is_hidden(node) {
        return Size::default();
    }

    match node {
        Node::Vector(graphic) => Size {
            width: explicit(&graphic.style, "width", available, units).unwrap_or(graphic.width),
            height: explicit(&graphic.style, "height", f32::NAN, units).unwrap_or(graphic.height),
        },

        Node::Text { style, content, .. } => {
            let font = Font::from_style(style, units);
            let padding = edges(style, "padding", available, units);
            let own_width = explicit(style, "width", available, units);
            let text_width = (own_width.unwrap_or(available) - padding.horizontal()).max(0.0);

            let text = transform_text(content, style.get("text-transform"));
            let lines = wrap(&text, text_width, font.advance());
            let widest = lines
                .iter()
                .map(|l| line_width(l, font.advance()))
                .fold(0.0, f32::max);

            Size {
                width: own_width.unwrap_or(widest.min(text_width) + padding.horizontal()),
                height: explicit(style, "height", f32::NAN, units)
                    .unwrap_or(lines.len() as f32 * font.line_height + padding.vertical()),
            }
        }

        Node::Container {
            style, children, ..
        } => {
            let padding = edges(style, "padding", available, units);
            let own_width = explicit(style, "width", available, units);
            let inner = (own_width.unwrap_or(available) - padding.horizontal()).max(0.0);
            let column = is_column(style);
            let gap = gap(style, column, inner, units);

            let mut main = 0.0f32;
            let mut cross = 0.0f32;
            let mut count = 0usize;

            for child in children.iter().filter(|c| !is_hidden(c)) {
                let child_style = child.style();
                let margin = edges(child_style, "margin", inner, units);
                let child_available = if column {
                    inner - margin.horizontal()
                } else {
                    (inner - main - margin.horizontal()).max(0.0)
                };

                let measured = measure(child, child_available, units);
                let width = explicit(child_style, "width", inner, units).unwrap_or(measured.width)
                    + margin.horizontal();
                let height = measured.height + margin.vertical();

                if count > 0 {
                    main += gap;
                }
                if column {
                    main += height;
                    cross = cross.max(width);
                } else {
                    main += width;
                    cross = cross.max(height);
                }
                count += 1;
            }

            let (content_width, content_height) = if column {
                (cross, main)
            } else {
                (main, cross)
            };

            Size {
                width: own_width.unwrap_or(content_width + padding.horizontal()),
                height: explicit(style, "height", f32::NAN, units)
                    .unwrap_or(content_height + padding.vertical()),
            }
        }
    }
}

/// A child positioned along the main axis of its flex container.
struct Item<'a> {
    node: &'a Node,
    main: f32,
    cross: f32,
    margin: Edges,
    grow: f32,
}

/// Place a node in the given box, emitting drawables.
fn place(
    node: &Node,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    units: &Units,
    out: &mut Vec<Drawable>,
) {
    if is_hidden(node) {
        return;
    }

    let style = node.style();
    let radius = style
        .get("border-radius")
        .and_then(|v| length(v, width.min(height), units.rem, units))
        .unwrap_or(0.0);

    for paint in paints(style) {
        out.push(Drawable::Rect {
            x,
            y,
            width,
            height,
            radius,
            paint,
        });
    }

    match node {
        Node::Vector(graphic) => out.push(Drawable::Vector {
            x,
            y,
            graphic: graphic.clone(),
        }),

        Node::Text { style, content, .. } => {
            place_text(style, content, x, y, width, units, out)
        }

        Node::Container {
            style, children, ..
        } => place_children(style, children, x, y, width, height, units, out),
    }
}

fn place_text(
    style: &StyleMap,
    content: &str,
    x: f32,
    y: f32,
    width: f32,
    units: &Units,
    out: &mut Vec<Drawable>,
) {
    let font = Font::from_style(style, units);
    let padding = edges(style, "padding", width, units);
    let text_width = (width - padding.horizontal()).max(0.0);

    let text = transform_text(content, style.get("text-transform"));
    let lines = wrap(&text, text_width, font.advance());
    if lines.is_empty() {
        return;
    }

    let (anchor_x, anchor) = match style.get("text-align") {
        Some("center") => (x + padding.left + text_width / 2.0, TextAnchor::Middle),
        Some("right") => (x + width - padding.right, TextAnchor::End),
        _ => (x + padding.left, TextAnchor::Start),
    };

    out.push(Drawable::Text {
        x: anchor_x,
        y: y + padding.top,
        anchor,
        lines,
        font_size: font.size,
        line_height: font.line_height,
        font_weight: font.weight,
        font_style: style.get("font-style").unwrap_or("normal").to_string(),
        font_family: style.get("font-family").map(str::to_string),
        color: style.get("color").unwrap_or("#000000").to_string(),
    });
}

fn place_children(
    style: &StyleMap,
    children: &[Node],
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    units: &Units,
    out: &mut Vec<Drawable>,
) {
    let padding = edges(style, "padding", width, units);
    let inner_x = x + padding.left;
    let inner_y = y + padding.top;
    let inner_width = (width - padding.horizontal()).max(0.0);
    let inner_height = (height - padding.vertical()).max(0.0);

    let column = is_column(style);
    let (main_size, cross_size) = if column {
        (inner_height, inner_width)
    } else {
        (inner_width, inner_height)
    };
    let gap = gap(style, column, main_size, units);
    let align = style.get("align-items").unwrap_or("stretch");

    let mut items: Vec<Item> = Vec::new();
    let mut used = 0.0f32;

    for child in children.iter().filter(|c| !is_hidden(c)) {
        let child_style = child.style();
        let margin = edges(child_style, "margin", inner_width, units);
        let available = if column {
            inner_width - margin.horizontal()
        } else {
            (inner_width - used - margin.horizontal()).max(0.0)
        };

        let measured = measure(child, available, units);
        let explicit_width = explicit(child_style, "width", inner_width, units);
        let explicit_height = explicit(child_style, "height", inner_height, units);
        let child_width = explicit_width.unwrap_or(measured.width);
        let child_height = explicit_height.unwrap_or(measured.height);

        let (main, mut cross, has_cross, main_margin, cross_margin) = if column {
            (
                child_height,
                child_width,
                explicit_width.is_some(),
                margin.vertical(),
                margin.horizontal(),
            )
        } else {
            (
                child_width,
                child_height,
                explicit_height.is_some(),
                margin.horizontal(),
                margin.vertical(),
            )
        };

        let stretchable = !matches!(child, Node::Vector(_));
        if align == "stretch" && !has_cross && stretchable {
            cross = (cross_size - cross_margin).max(0.0);
        }

        if !items.is_empty() {
            used += gap;
        }
        used += main + main_margin;

        let grow = child_style
            .get("flex-grow")
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(0.0);

        items.push(Item {
            node: child,
            main,
            cross,
            margin,
            grow,
        });
    }

    let count = items.len();
    let mut free = main_size - used;

    let total_grow: f32 = items.iter().map(|i| i.grow).sum();
    if free > 0.0 && total_grow > 0.0 {
        for item in &mut items {
            item.main += free * item.grow / total_grow;
        }
        free = 0.0;
    }

    let free = free.max(0.0);
    let (mut cursor, between) = match style.get("justify-content") {
        Some("flex-end") | Some("end") => (free, 0.0),
        Some("center") => (free / 2.0, 0.0),
        Some("space-between") if count > 1 => (0.0, free / (count - 1) as f32),
        Some("space-around") if count > 0 => {
            let share = free / count as f32;
            (share / 2.0, share)
        }
        Some("space-evenly") => {
            let share = free / (count + 1) as f32;
            (share, share)
        }
        _ => (0.0, 0.0),
    };

    for item in items {
        let (main_start, main_end, cross_start, cross_end) = if column {
            (item.margin.top, item.margin.bottom, item.margin.left, item.margin.right)
        } else {
            (item.margin.left, item.margin.right, item.margin.top, item.margin.bottom)
        };

        cursor += main_start;

        let cross_offset = match align {
            "flex-end" | "end" => cross_size - item.cross - cross_end,
            "center" => (cross_size - item.cross - cross_start - cross_end) / 2.0 + cross_start,
            _ => cross_start,
        };

        let (cx, cy, cw, ch) = if column {
            (inner_x + cross_offset, inner_y + cursor, item.cross, item.main)
        } else {
            (inner_x + cursor, inner_y + cross_offset, item.main, item.cross)
        };

        place(item.node, cx, cy, cw, ch, units, out);

        cursor += item.main + main_end + gap + between;
    }
}
