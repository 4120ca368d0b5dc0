//! Page parser.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A parsed content page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Plain text of the first heading
    pub first_heading: Option<String>,

    /// Plain text of the first prose paragraph
    pub first_paragraph: Option<String>,
}

/// Resolved metadata used to render a page's card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub slug: Option<String>,
    pub draft: bool,
}

/// Errors that can occur when parsing a page.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

impl ParsedPage {
    /// Resolve card metadata.
    ///
    /// Title: frontmatter, then first heading, then `fallback_title`.
    /// Description: frontmatter, then first paragraph, then empty.
    pub fn meta(&self, fallback_title: &str) -> PageMeta {
        let fm = self.frontmatter.as_ref();

        let title = fm
            .and_then(|f| f.title.clone())
            .or_else(|| self.first_heading.clone())
            .unwrap_or_else(|| fallback_title.to_string());

        let description = fm
            .and_then(|f| f.description.clone())
            .or_else(|| self.first_paragraph.clone())
            .unwrap_or_default();

        PageMeta {
            title,
            description,
            slug: fm.and_then(|f| f.slug.clone()),
            draft: fm.map(|f| f.draft).unwrap_or(false),
        }
    }
}

/// Parse a Markdown/MDX page.
pub fn parse_page(source: &str) -> Result<ParsedPage, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut first_heading = None;
    let mut first_paragraph = None;

    // Text collected for the block currently open, if we still need it.
    let mut current: Option<(Capture, String)> = None;

    for event in Parser::new_ext(content, options) {
        match event {
            Event::Start(Tag::Heading { .. }) if first_heading.is_none() => {
                current = Some((Capture::Heading, String::new()));
            }
            Event::Start(Tag::Paragraph) if first_paragraph.is_none() => {
                current = Some((Capture::Paragraph, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, ref mut buf)) = current {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, ref mut buf)) = current {
                    buf.push(' ');
                }
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Paragraph) => {
                if let Some((kind, buf)) = current.take() {
                    let text = buf.trim().to_string();
                    match kind {
                        Capture::Heading if !text.is_empty() => first_heading = Some(text),
                        Capture::Paragraph if is_prose(&text) => first_paragraph = Some(text),
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        if first_heading.is_some() && first_paragraph.is_some() {
            break;
        }
    }

    Ok(ParsedPage {
        frontmatter,
        first_heading,
        first_paragraph,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Heading,
    Paragraph,
}

/// MDX import/export statements parse as paragraphs; they are not prose.
fn is_prose(text: &str) -> bool {
    !text.is_empty() && !text.starts_with("import ") && !text.starts_with("export ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefers_frontmatter() {
        let source = r#"---
title: Understanding Caches | moyis.dev
description: How caches work
---

# Something else

Other text.
"#;

        let meta = parse_page(source).unwrap().meta("fallback");

        assert_eq!(
            meta,
            PageMeta {
                title: "Understanding Caches | moyis.dev".to_string(),
                description: "How caches work".to_string(),
                slug: None,
                draft: false,
            }
        );
    }

    #[test]
    fn falls_back_to_heading_and_paragraph() {
        let source = r#"import Chart from "../components/Chart.astro";

# Hello `World`

First line
second line.

Another paragraph.
"#;

        let page = parse_page(source).unwrap();

        assert!(page.frontmatter.is_none());
        assert_eq!(page.first_heading.as_deref(), Some("Hello World"));
        assert_eq!(
            page.first_paragraph.as_deref(),
            Some("First line second line.")
        );
    }

    #[test]
    fn falls_back_to_file_stem() {
        let meta = parse_page("Just a paragraph.").unwrap().meta("notes");

        assert_eq!(meta.title, "notes");
        assert_eq!(meta.description, "Just a paragraph.");
    }

    #[test]
    fn empty_page_gives_empty_description() {
        let meta = parse_page("").unwrap().meta("empty");

        assert_eq!(meta.title, "empty");
        assert_eq!(meta.description, "");
    }

    #[test]
    fn carries_slug_and_draft() {
        let source = "---\ntitle: Draft\nslug: posts/draft\ndraft: true\n---\n";

        let meta = parse_page(source).unwrap().meta("x");

        assert_eq!(meta.slug.as_deref(), Some("posts/draft"));
        assert!(meta.draft);
    }

    #[test]
    fn propagates_frontmatter_errors() {
        let result = parse_page("---\ntitle: open");

        assert!(matches!(result, Err(ParseError::Frontmatter(_))));
    }
}
