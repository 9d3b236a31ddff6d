//! Canonical product-name keys and the presentation-only display cleanup.
//!
//! [`normalize_name`] produces the key used for aggregation, mapping lookups
//! and combo-item dedup. [`display_name`] is for showing unmapped tokens and
//! must never feed a key.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static QUANTITY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*[xX]\s*").expect("valid quantity prefix regex"));

/// Returns the canonical key for a raw or parenthesized product name.
///
/// Lowercases, strips combining diacritical marks (NFD, `U+0300..=U+036F`),
/// removes wrapping parentheses and a leading `"<digits> x "` quantity prefix,
/// and collapses whitespace. Punctuation (including `|`) is kept as-is.
///
/// Wrapper and prefix removal repeats until neither applies, so the result is
/// a fixed point: `normalize_name(&normalize_name(s)) == normalize_name(s)`.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect();

    let mut current = folded.trim();
    loop {
        let unwrapped = strip_outer_parens(current).trim();
        let stripped = strip_quantity_prefix(unwrapped).trim();
        if stripped.len() == current.len() {
            break;
        }
        current = stripped;
    }

    current.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Presentation cleanup for a parenthesized unmapped name:
/// `"(2 X Widget)"` becomes `"(Widget)"`.
///
/// Names without wrapping parentheses are returned trimmed and otherwise
/// untouched.
#[must_use]
pub fn display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if !is_wrapped(trimmed) {
        return trimmed.to_string();
    }
    let interior = strip_outer_parens(trimmed).trim();
    let rest = strip_quantity_prefix(interior).trim();
    format!("({rest})")
}

/// Bare product name as sent to the dictionary webhook: no parentheses, no
/// quantity prefix, original casing.
#[must_use]
pub fn strip_for_dictionary(raw: &str) -> String {
    let interior = strip_outer_parens(raw.trim()).trim();
    strip_quantity_prefix(interior).trim().to_string()
}

fn is_wrapped(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('(') && s.ends_with(')')
}

fn strip_outer_parens(s: &str) -> &str {
    if is_wrapped(s) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn strip_quantity_prefix(s: &str) -> &str {
    match QUANTITY_PREFIX.find(s) {
        Some(m) => &s[m.end()..],
        None => s,
    }
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
