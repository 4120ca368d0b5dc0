//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Frontmatter fields relevant to preview cards.
///
/// Unknown keys (`pubDate`, `tags`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Page title
    #[serde(default)]
    pub title: Option<String>,

    /// Page description for link previews
    #[serde(default)]
    pub description: Option<String>,

    /// Custom slug override for the image path
    #[serde(default)]
    pub slug: Option<String>,

    /// Drafts get no card
    #[serde(default)]
    pub draft: bool,
}

/// Split a leading `---` fenced YAML block off a Markdown/MDX source.
///
/// Both fences must sit on their own line. Returns the parsed block (if any)
/// and the content after it.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(after_fence) = source.trim_start().strip_prefix("---") else {
        return Ok((None, source));
    };
    let Some(body) = after_fence
        .strip_prefix("\r\n")
        .or_else(|| after_fence.strip_prefix('\n'))
    else {
        return Ok((None, source));
    };

    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let frontmatter = parse_yaml(&body[..offset])?;
            let remaining = &body[offset + line.len()..];
            return Ok((Some(frontmatter), remaining.trim_start()));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unclosed)
}

fn parse_yaml(yaml: &str) -> Result<Frontmatter, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Understanding Caches | moyis.dev
description: How caches work
pubDate: 2024-03-01
---

# Understanding Caches
"#;

        let (fm, content) = extract_frontmatter(source).unwrap();
        let fm = fm.unwrap();

        assert_eq!(fm.title.as_deref(), Some("Understanding Caches | moyis.dev"));
        assert_eq!(fm.description.as_deref(), Some("How caches work"));
        assert!(!fm.draft);
        assert!(content.starts_with("# Understanding Caches"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(content, source);
    }

    #[test]
    fn handles_empty_frontmatter() {
        let (fm, content) = extract_frontmatter("---\n---\nBody").unwrap();

        assert_eq!(fm, Some(Frontmatter::default()));
        assert_eq!(content, "Body");
    }

    #[test]
    fn reads_draft_flag() {
        let (fm, _) = extract_frontmatter("---\ntitle: WIP\ndraft: true\n---\n").unwrap();

        assert!(fm.unwrap().draft);
    }

    #[test]
    fn ignores_dashes_inside_values() {
        let source = "---\ntitle: Before --- after\n---\nBody";

        let (fm, content) = extract_frontmatter(source).unwrap();

        assert_eq!(fm.unwrap().title.as_deref(), Some("Before --- after"));
        assert_eq!(content, "Body");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }
}
