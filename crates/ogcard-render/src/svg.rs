//! SVG serialization of laid-out drawables.

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

use crate::card::RenderError;
use crate::layout::{Canvas, Drawable, Paint};
use crate::node::VectorPath;

/// Ascent of a typical sans-serif face, in em.
const ASCENT_EM: f32 = 0.8;

#[derive(Debug, Serialize)]
struct Stop {
    offset: String,
    color: String,
}

#[derive(Debug, Serialize)]
struct GradientDef {
    id: String,
    x1: u8,
    y1: u8,
    x2: u8,
    y2: u8,
    stops: Vec<Stop>,
}

#[derive(Debug, Serialize)]
struct Line {
    y: f64,
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Item {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: String,
    },
    Text {
        x: f64,
        anchor: &'static str,
        font_size: f64,
        font_weight: u16,
        font_style: String,
        font_family: Option<String>,
        fill: String,
        lines: Vec<Line>,
    },
    Vector {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        view_box: String,
        paths: Vec<VectorPath>,
    },
}

/// Writes drawables as a standalone SVG document.
pub struct SvgWriter {
    env: Environment<'static>,
}

impl SvgWriter {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        env.add_template_owned("card.svg".to_string(), CARD_TEMPLATE.to_string())
            .expect("Failed to add card template");

        Self { env }
    }

    /// Serialize drawables onto a canvas.
    pub fn write(&self, drawables: &[Drawable], canvas: &Canvas) -> Result<String, RenderError> {
        let mut gradients = Vec::new();
        let mut items = Vec::with_capacity(drawables.len());

        for drawable in drawables {
            items.push(match drawable {
                Drawable::Rect {
                    x,
                    y,
                    width,
                    height,
                    radius,
                    paint,
                } => {
                    let fill = match paint {
                        Paint::Color(color) => xml_safe(color),
                        Paint::LinearGradient { direction, stops } => {
                            let id = format!("g{}", gradients.len());
                            gradients.push(gradient_def(&id, direction, stops));
                            format!("url(#{})", id)
                        }
                    };
                    Item::Rect {
                        x: round(*x),
                        y: round(*y),
                        width: round(*width),
                        height: round(*height),
                        radius: round(*radius),
                        fill,
                    }
                }

                Drawable::Text {
                    x,
                    y,
                    anchor,
                    lines,
                    font_size,
                    line_height,
                    font_weight,
                    font_style,
                    font_family,
                    color,
                } => {
                    let half_leading = (line_height - font_size) / 2.0;
                    Item::Text {
                        x: round(*x),
                        anchor: anchor.as_svg(),
                        font_size: round(*font_size),
                        font_weight: *font_weight,
                        font_style: xml_safe(font_style),
                        font_family: font_family.as_deref().map(xml_safe),
                        fill: xml_safe(color),
                        lines: lines
                            .iter()
                            .enumerate()
                            .map(|(i, text)| {
                                let top = y + i as f32 * line_height + half_leading;
                                Line {
                                    y: round(top + font_size * ASCENT_EM),
                                    text: xml_safe(text),
                                }
                            })
                            .collect(),
                    }
                }

                Drawable::Vector { x, y, graphic } => Item::Vector {
                    x: round(*x),
                    y: round(*y),
                    width: round(graphic.width),
                    height: round(graphic.height),
                    view_box: graphic
                        .view_box
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(" "),
                    paths: graphic.paths.clone(),
                },
            });
        }

        let tmpl = self
            .env
            .get_template("card.svg")
            .map_err(|e| RenderError::Template(e.to_string()))?;

        tmpl.render(context! {
            width => canvas.width,
            height => canvas.height,
            font_family => xml_safe(&canvas.font_family),
            gradients => gradients,
            items => items,
        })
        .map_err(|e| RenderError::Template(e.to_string()))
    }
}

impl Default for SvgWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop characters XML 1.0 cannot carry, even escaped.
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            !(c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r'))
                && !matches!(c, '\u{FFFE}' | '\u{FFFF}')
        })
        .collect()
}

/// Round to two decimals for compact output.
fn round(value: f32) -> f64 {
    (f64::from(value) * 100.0).round() / 100.0
}

/// Map a CSS direction keyword onto bounding-box gradient coordinates.
fn gradient_def(id: &str, direction: &str, stops: &[String]) -> GradientDef {
    let (x1, y1, x2, y2) = match direction {
        "to top" => (0, 1, 0, 0),
        "to right" => (0, 0, 1, 0),
        "to left" => (1, 0, 0, 0),
        "to top right" | "to right top" => (0, 1, 1, 0),
        "to top left" | "to left top" => (1, 1, 0, 0),
        "to bottom right" | "to right bottom" => (0, 0, 1, 1),
        "to bottom left" | "to left bottom" => (1, 0, 0, 1),
        _ => (0, 0, 0, 1),
    };

    let last = stops.len().saturating_sub(1).max(1) as f32;
    let stops = stops
        .iter()
        .enumerate()
        .map(|(i, color)| Stop {
            offset: format!("{}", round(i as f32 / last)),
            color: xml_safe(color),
        })
        .collect();

    GradientDef {
        id: id.to_string(),
        x1,
        y1,
        x2,
        y2,
        stops,
    }
}

const CARD_TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="{{ width }}" height="{{ height }}" viewBox="0 0 {{ width }} {{ height }}" font-family="{{ font_family }}">
{%- if gradients %}
  <defs>
  {%- for g in gradients %}
    <linearGradient id="{{ g.id }}" x1="{{ g.x1 }}" y1="{{ g.y1 }}" x2="{{ g.x2 }}" y2="{{ g.y2 }}">
    {%- for stop in g.stops %}
      <stop offset="{{ stop.offset }}" stop-color="{{ stop.color }}"/>
    {%- endfor %}
    </linearGradient>
  {%- endfor %}
  </defs>
{%- endif %}
{%- for item in items %}
{%- if item.kind == "rect" %}
  <rect x="{{ item.x }}" y="{{ item.y }}" width="{{ item.width }}" height="{{ item.height }}" rx="{{ item.radius }}" fill="{{ item.fill }}"/>
{%- elif item.kind == "text" %}
  <text text-anchor="{{ item.anchor }}" font-size="{{ item.font_size }}" font-weight="{{ item.font_weight }}" font-style="{{ item.font_style }}"{% if item.font_family %} font-family="{{ item.font_family }}"{% endif %} fill="{{ item.fill }}">
  {%- for line in item.lines %}<tspan x="{{ item.x }}" y="{{ line.y }}">{{ line.text }}</tspan>{% endfor -%}
  </text>
{%- elif item.kind == "vector" %}
  <svg x="{{ item.x }}" y="{{ item.y }}" width="{{ item.width }}" height="{{ item.height }}" viewBox="{{ item.view_box }}">
  {%- for path in item.paths %}
    <path d="{{ path.d }}" fill="{{ path.fill }}"/>
  {%- endfor %}
  </svg>
{%- endif %}
{%- endfor %}
</svg>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardRenderer, PreviewRequest};
    use crate::layout::layout;
    use ogcard_style::Tailwind;
    use std::sync::Arc;

    fn card_svg(title: &str, description: &str) -> String {
        let renderer = CardRenderer::new(Arc::new(Tailwind::new()));
        let tree = renderer
            .render(&PreviewRequest::new(title, description))
            .unwrap();
        let canvas = Canvas::default();

        SvgWriter::new()
            .write(&layout(&tree, &canvas), &canvas)
            .unwrap()
    }

    #[test]
    fn writes_gradient_background() {
        let svg = card_svg("Title", "Description");

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1200\""));
        assert!(svg.contains("<linearGradient id=\"g0\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"0\">"));
        assert!(svg.contains("stop-color=\"#171717\""));
        assert!(svg.contains("stop-color=\"#262626\""));
        assert!(svg.contains("fill=\"url(#g0)\""));
    }

    #[test]
    fn writes_logo_and_text() {
        let svg = card_svg("Understanding Caches | moyis.dev", "How caches work");

        assert!(svg.contains("viewBox=\"0 0 128 128\""));
        assert!(svg.contains("fill=\"#feb804\""));
        assert!(svg.contains(">Understanding Caches</tspan>"));
        assert!(svg.contains(">How caches work</tspan>"));
        assert!(svg.contains(">moyis.dev</tspan>"));
        assert!(!svg.contains("| moyis.dev"));
    }

    #[test]
    fn escapes_text() {
        let svg = card_svg("Tom & Jerry <3", "");

        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
        assert!(!svg.contains("Tom & Jerry"));
    }

    #[test]
    fn strips_xml_forbidden_characters() {
        let svg = card_svg("Tab\tted", "Ctrl\u{0B}char\u{0}s\u{FFFF}");

        assert!(svg.contains(">Ctrl chars</tspan>"));
        assert!(!svg.contains('\u{0B}'));
        assert!(!svg.contains('\u{0}'));
        assert!(!svg.contains('\u{FFFF}'));
    }

    #[test]
    fn xml_safe_keeps_whitespace_and_text() {
        assert_eq!(xml_safe("a\tb\nc\rd é"), "a\tb\nc\rd é");
        assert_eq!(xml_safe("\u{1}\u{1F}\u{FFFE}"), "");
    }

    #[test]
    fn gradient_offsets_are_evenly_spaced() {
        let stops = vec!["#000".to_string(), "#111".to_string(), "#222".to_string()];
        let def = gradient_def("g0", "to bottom", &stops);

        let offsets: Vec<_> = def.stops.iter().map(|s| s.offset.as_str()).collect();
        assert_eq!(offsets, vec!["0", "0.5", "1"]);
        assert_eq!((def.x1, def.y1, def.x2, def.y2), (0, 0, 0, 1));
    }
}
