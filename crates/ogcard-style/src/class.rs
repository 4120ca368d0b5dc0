//! Utility class tokenizer.
//!
//! Splits a single class token into either a plain keyword (`p-20`, `flex`)
//! or a prefix with an arbitrary bracketed value (`text-[20px]`).

use regex::Regex;
use std::sync::LazyLock;

/// A single parsed utility class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtilityClass<'a> {
    /// Plain utility: `flex`, `p-20`, `text-white`
    Keyword(&'a str),
    /// Arbitrary value: `text-[20px]` -> prefix `text`, value `20px`
    Arbitrary { prefix: &'a str, value: String },
}

/// Parse one class token.
///
/// Underscores inside arbitrary values stand for spaces, as in Tailwind:
/// `font-[Geist_Sans]` has the value `Geist Sans`.
pub fn parse_class(token: &str) -> UtilityClass<'_> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^([a-z][a-z0-9-]*?)-\[([^\]]+)\]$").expect("Invalid arbitrary class regex")
    });

    if let Some(caps) = RE.captures(token) {
        if let (Some(prefix), Some(value)) = (caps.get(1), caps.get(2)) {
            return UtilityClass::Arbitrary {
                prefix: prefix.as_str(),
                value: value.as_str().replace('_', " "),
            };
        }
    }

    UtilityClass::Keyword(token)
}
