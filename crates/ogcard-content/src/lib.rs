//! Page metadata extraction for Open Graph cards.
//!
//! Reads Markdown/MDX sources, pulls the YAML frontmatter and falls back to the
//! first heading and paragraph when the frontmatter leaves gaps.

pub mod frontmatter;
pub mod parser;

pub use frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
pub use parser::{parse_page, PageMeta, ParseError, ParsedPage};
