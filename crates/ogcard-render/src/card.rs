//! The Open Graph preview card.
//!
//! A card is a fixed layout: a charcoal gradient background, a padded column
//! holding the logo mark with the site label, the page title and the page
//! description. Every visual property comes from a utility class string run
//! through the injected [`StyleSource`].

use std::sync::Arc;

use ogcard_style::{StyleError, StyleMap, StyleSource};
use serde::{Deserialize, Serialize};

use crate::node::{ContainerTag, Node, TextTag, VectorGraphic, VectorPath};

/// Separator between a page title and the site suffix: `"Caches | moyis.dev"`.
pub const TITLE_DELIMITER: &str = " | ";

const BACKGROUND_CLASSES: &str =
    "h-full w-full flex items-start justify-start bg-gradient-to-r from-neutral-900 to-neutral-800";
const FRAME_CLASSES: &str = "flex items-start justify-start h-full";
const COLUMN_CLASSES: &str = "flex flex-col justify-between w-full h-full p-20";
const HEADER_CLASSES: &str = "";
const LABEL_CLASSES: &str = "text-[20px] text-white text-left";
const TITLE_CLASSES: &str = "text-[60px] text-white font-bold text-left";
const DESCRIPTION_CLASSES: &str = "text-[20px] text-white text-left";

/// Lightning bolt logo, drawn on a 128x128 grid.
const LOGO_PATHS: [(&str, &str); 3] = [
    (
        "M69.68 54.04S98.65 7.63 99.31 6.47c.66-1.16.8-3.29-1.02-3.29S51.34 49.25 51.34 49.25l-32.05 19s-2.15 1.32-1.82 2.97 1.77 1.72 2.43 1.72 34.85-.18 36.84-.24c2.47-.07 1.86 3.44 1.86 3.44l-21.64 34.02s-9.45 13.08-9.45 13.97c0 1.31 1.58 1.96 3.05 1.08 1.14-.68 74.84-63.13 78.09-67.42.88-1.17 1.33-4.25-2.3-4.25s-32.54 8.42-32.54 8.42l-4.13-7.92z",
        "#feb804",
    ),
    (
        "M64.61 50.35c-.89 1.22-1.13 3.26.79 3.38 1.91.11 40.95-.18 40.95-.18S78.46 79.18 70.02 86.83s-36.39 32.43-38.27 34.18c-1.84 1.72-3.51 3.3-4.19 3.08-.11-.03-.25-.62 2.38-4.95 2.4-3.95 25.44-42.56 26.34-44.02.9-1.46 1.69-2.7 2.14-3.38.45-.68 1.91-4.39-1.13-4.39s-38 .9-38 .9 24.15-20.49 31.13-26S96.96 3.18 98.29 3.18 65.51 49.12 64.61 50.35z",
        "#ffc927",
    ),
    (
        "M63.45 70.75c1.8-2.59 3.57-2.78 4.64-2.14 1.38.83 1.52 2.74-.22 5.05-2.74 3.66-22.88 30.61-23.65 31.56-1.46 1.8-3.61 1.01-2.21-1.6 1.17-2.16 19.58-30.19 21.44-32.87zM34.83 65.49c-3.45 2.31-6.66-1.14-4.35-3.67s17.47-15.15 20.54-17.76 20.99-18.2 22.38-19.32c1.84-1.48 2.98.02 1.82 1.56-1.15 1.54-13.82 14.2-19.41 19.34-4.32 3.98-17.7 17.65-20.98 19.85z",
        "#ffe567",
    ),
];

const LOGO_SIZE: f32 = 50.0;

/// Errors that can occur while rendering a card.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Style error: {0}")]
    Style(#[from] StyleError),

    #[error("Failed to render SVG template: {0}")]
    Template(String),

    #[error("Failed to parse generated SVG: {0}")]
    Svg(String),

    #[error("Failed to rasterize image: {0}")]
    Raster(String),
}

/// Title and description of the page a card is rendered for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl PreviewRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Title as displayed on the card: everything before the first `" | "`.
pub fn display_title(title: &str) -> &str {
    title
        .split_once(TITLE_DELIMITER)
        .map(|(head, _)| head)
        .unwrap_or(title)
}

/// Renders preview cards with an injected style converter.
///
/// The renderer holds no mutable state; one instance can serve any number of
/// concurrent calls.
#[derive(Clone)]
pub struct CardRenderer {
    styles: Arc<dyn StyleSource>,
    site_label: String,
}

impl CardRenderer {
    /// Site label used when none is configured.
    pub const DEFAULT_SITE_LABEL: &'static str = "moyis.dev";

    /// Create a renderer using the given style converter.
    pub fn new(styles: Arc<dyn StyleSource>) -> Self {
        Self {
            styles,
            site_label: Self::DEFAULT_SITE_LABEL.to_string(),
        }
    }

    /// Replace the site label shown next to the logo.
    pub fn with_site_label(mut self, label: impl Into<String>) -> Self {
        self.site_label = label.into();
        self
    }

    pub fn site_label(&self) -> &str {
        &self.site_label
    }

    /// Build the card node tree for a page.
    ///
    /// Fails if any class string cannot be translated; no partial tree is
    /// returned.
    pub fn render(&self, request: &PreviewRequest) -> Result<Node, RenderError> {
        let header = Node::Container {
            tag: ContainerTag::Span,
            style: self.style(HEADER_CLASSES)?,
            children: vec![
                logo_mark(),
                Node::Text {
                    tag: TextTag::P,
                    style: self.style(LABEL_CLASSES)?,
                    content: self.site_label.clone(),
                },
            ],
        };

        let column = Node::Container {
            tag: ContainerTag::Div,
            style: self.style(COLUMN_CLASSES)?,
            children: vec![
                header,
                Node::Text {
                    tag: TextTag::H1,
                    style: self.style(TITLE_CLASSES)?,
                    content: display_title(&request.title).to_string(),
                },
                Node::Text {
                    tag: TextTag::H2,
                    style: self.style(DESCRIPTION_CLASSES)?,
                    content: request.description.clone(),
                },
            ],
        };

        Ok(Node::Container {
            tag: ContainerTag::Div,
            style: self.style(BACKGROUND_CLASSES)?,
            children: vec![Node::Container {
                tag: ContainerTag::Div,
                style: self.style(FRAME_CLASSES)?,
                children: vec![column],
            }],
        })
    }

    fn style(&self, classes: &str) -> Result<StyleMap, RenderError> {
        Ok(self.styles.translate(classes)?)
    }
}

fn logo_mark() -> Node {
    Node::Vector(VectorGraphic {
        width: LOGO_SIZE,
        height: LOGO_SIZE,
        view_box: [0.0, 0.0, 128.0, 128.0],
        paths: LOGO_PATHS
            .iter()
            .map(|(d, fill)| VectorPath {
                d: d.to_string(),
                fill: fill.to_string(),
            })
            .collect(),
        style: StyleMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogcard_style::Tailwind;
    use pretty_assertions::assert_eq;

    fn renderer() -> CardRenderer {
        CardRenderer::new(Arc::new(Tailwind::new()))
    }

    /// Converter that never managed to load.
    struct Unloaded;

    impl StyleSource for Unloaded {
        fn translate(&self, _classes: &str) -> Result<StyleMap, StyleError> {
            Err(StyleError::Theme("converter unavailable".to_string()))
        }
    }

    /// Converter that fails on one specific class string.
    struct FailsOn(&'static str);

    impl StyleSource for FailsOn {
        fn translate(&self, classes: &str) -> Result<StyleMap, StyleError> {
            if classes == self.0 {
                Err(StyleError::UnknownClass(classes.to_string()))
            } else {
                Tailwind::new().translate(classes)
            }
        }
    }

    fn text_of(tree: &Node, wanted: TextTag) -> Vec<String> {
        tree.texts()
            .into_iter()
            .filter(|(tag, _)| *tag == wanted)
            .map(|(_, content)| content.to_string())
            .collect()
    }

    #[test]
    fn truncates_title_at_delimiter() {
        let tree = renderer()
            .render(&PreviewRequest::new(
                "Understanding Caches | moyis.dev",
                "How caches work",
            ))
            .unwrap();

        assert_eq!(text_of(&tree, TextTag::H1), vec!["Understanding Caches"]);
    }

    #[test]
    fn keeps_title_without_delimiter() {
        let tree = renderer()
            .render(&PreviewRequest::new("Hello World", ""))
            .unwrap();

        assert_eq!(text_of(&tree, TextTag::H1), vec!["Hello World"]);
    }

    #[test]
    fn truncates_at_first_delimiter_only() {
        assert_eq!(display_title("A | B | C"), "A");
        assert_eq!(display_title("A|B"), "A|B");
        assert_eq!(display_title(" | tail"), "");
    }

    #[test]
    fn description_is_verbatim() {
        let description = "  Spaces, <tags> & a | pipe  ";
        let tree = renderer()
            .render(&PreviewRequest::new("Title", description))
            .unwrap();

        assert_eq!(text_of(&tree, TextTag::H2), vec![description]);
    }

    #[test]
    fn tree_has_one_of_each_part() {
        let tree = renderer()
            .render(&PreviewRequest::new("Title | site", "Description"))
            .unwrap();

        let vectors = tree
            .descendants()
            .into_iter()
            .filter(|n| matches!(n, Node::Vector(_)))
            .count();

        assert_eq!(vectors, 1);
        assert_eq!(text_of(&tree, TextTag::P), vec!["moyis.dev"]);
        assert_eq!(text_of(&tree, TextTag::H1).len(), 1);
        assert_eq!(text_of(&tree, TextTag::H2).len(), 1);
    }

    #[test]
    fn identical_input_gives_identical_tree() {
        let renderer = renderer();
        let request = PreviewRequest::new("Same | site", "Same description");

        let first = renderer.render(&request).unwrap();
        let second = renderer.render(&request).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_renders_empty_text() {
        let tree = renderer().render(&PreviewRequest::default()).unwrap();

        assert_eq!(text_of(&tree, TextTag::H1), vec![""]);
        assert_eq!(text_of(&tree, TextTag::H2), vec![""]);
    }

    #[test]
    fn background_is_charcoal_gradient() {
        let tree = renderer()
            .render(&PreviewRequest::new("Title", "Description"))
            .unwrap();

        assert_eq!(
            tree.style().get("background-image"),
            Some("linear-gradient(to right, #171717, #262626)")
        );
    }

    #[test]
    fn text_is_white_and_left_aligned() {
        let tree = renderer()
            .render(&PreviewRequest::new("Title", "Description"))
            .unwrap();

        for node in tree.descendants() {
            if let Node::Text { style, .. } = node {
                assert_eq!(style.get("color"), Some("#ffffff"));
                assert_eq!(style.get("text-align"), Some("left"));
            }
        }
    }

    #[test]
    fn unloaded_converter_fails_render() {
        let renderer = CardRenderer::new(Arc::new(Unloaded));

        let result = renderer.render(&PreviewRequest::new("Title", "Description"));

        assert!(matches!(result, Err(RenderError::Style(StyleError::Theme(_)))));
    }

    #[test]
    fn failure_after_other_styles_returns_no_tree() {
        let renderer = CardRenderer::new(Arc::new(FailsOn(BACKGROUND_CLASSES)));

        let result = renderer.render(&PreviewRequest::new("Title", "Description"));

        assert!(matches!(
            result,
            Err(RenderError::Style(StyleError::UnknownClass(_)))
        ));
    }

    #[test]
    fn custom_site_label() {
        let tree = renderer()
            .with_site_label("example.org")
            .render(&PreviewRequest::new("Title", ""))
            .unwrap();

        assert_eq!(text_of(&tree, TextTag::P), vec!["example.org"]);
    }
}
