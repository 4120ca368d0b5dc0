//! Layout node tree.

use ogcard_style::StyleMap;
use serde::Serialize;

/// Element tag of a container node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerTag {
    Div,
    Span,
}

/// Element tag of a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTag {
    P,
    H1,
    H2,
}

/// A single filled path inside a vector graphic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorPath {
    /// SVG path data
    pub d: String,
    /// Fill colour
    pub fill: String,
}

/// An inline vector graphic (the logo mark).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorGraphic {
    /// Rendered width in px
    pub width: f32,
    /// Rendered height in px
    pub height: f32,
    /// `min-x min-y width height`
    pub view_box: [f32; 4],
    pub paths: Vec<VectorPath>,
    pub style: StyleMap,
}

/// A styled layout node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// A box that lays out its children.
    Container {
        tag: ContainerTag,
        style: StyleMap,
        children: Vec<Node>,
    },
    /// A run of text.
    Text {
        tag: TextTag,
        style: StyleMap,
        content: String,
    },
    /// An inline vector graphic.
    Vector(VectorGraphic),
}

impl Node {
    /// Style map of this node.
    pub fn style(&self) -> &StyleMap {
        match self {
            Node::Container { style, .. } | Node::Text { style, .. } => style,
            Node::Vector(graphic) => &graphic.style,
        }
    }

    /// Direct children (empty for leaves).
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Container { children, .. } => children,
            _ => &[],
        }
    }

    /// All nodes in depth-first pre-order, including `self`.
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.descendants());
        }
        out
    }

    /// Text nodes in document order as `(tag, content)`.
    pub fn texts(&self) -> Vec<(TextTag, &str)> {
        self.descendants()
            .into_iter()
            .filter_map(|node| match node {
                Node::Text { tag, content, .. } => Some((*tag, content.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Serialize the tree as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
