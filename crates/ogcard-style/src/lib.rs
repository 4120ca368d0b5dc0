//! Utility-class interpreter for Open Graph card styles.
//!
//! This crate translates Tailwind-style utility class strings like
//! `"flex flex-col p-20 text-white"` into concrete CSS property maps, using a
//! fixed, enumerable rule set and a small theme (palette, spacing and type scales).

pub mod class;
pub mod convert;
pub mod style;
pub mod theme;

pub use class::{parse_class, UtilityClass};
pub use convert::{StyleError, StyleSource, Tailwind};
pub use style::StyleMap;
pub use theme::{Theme, ThemeOverrides};
