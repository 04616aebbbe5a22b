//! `{{ expr }}` extraction from text nodes.

use std::sync::LazyLock;

use regex::Regex;

/// Shortest `{{ ... }}` span on a single line.
static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("interpolation pattern is valid"));

/// The trimmed expression of the first `{{ ... }}` in `text`, if any.
///
/// Only the first match is used; the whole text node is later replaced by
/// the value, so surrounding literal text and further placeholders are
/// overwritten on paint.
#[must_use]
pub fn extract(text: &str) -> Option<&str> {
    INTERPOLATION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}
