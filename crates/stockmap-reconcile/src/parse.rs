//! Tokenizer for the free-text product field on orders.
//!
//! The field is a comma-separated list such as
//! `"1X GEL PYTHON, (1 X EVIL GOODS! | SEBO DE RES)"`. Parenthesized runs are
//! entries the upstream automation could not match to inventory; everything
//! else is a recognized entry.

use std::sync::LazyLock;

use regex::Regex;
use stockmap_core::OrderProductToken;

static PAREN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]*)\)").expect("valid paren run regex"));

static QUANTITY_AND_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*[xX]\s*(.+)$").expect("valid quantity regex"));

/// Splits an order's product string into tokens.
///
/// Unmapped tokens come first, in source order, followed by the mapped ones.
/// For an unmapped token `raw_text` is the text inside the parentheses and
/// `name` keeps the parenthesized form. Malformed input never errors: an
/// unterminated `(` stays literal text in the comma split and empty pieces
/// are dropped.
#[must_use]
pub fn parse_product_tokens(raw: &str) -> Vec<OrderProductToken> {
    let mut tokens = Vec::new();
    if raw.trim().is_empty() {
        return tokens;
    }

    for caps in PAREN_RUN.captures_iter(raw) {
        let interior = caps.get(1).map_or("", |m| m.as_str()).trim();
        if interior.is_empty() {
            continue;
        }
        let (quantity, _) = split_quantity(interior);
        let whole = caps.get(0).map_or(interior, |m| m.as_str());
        tokens.push(OrderProductToken {
            raw_text: interior.to_string(),
            name: whole.to_string(),
            quantity,
            is_unmapped: true,
        });
    }

    let remainder = PAREN_RUN.replace_all(raw, "");
    for piece in remainder.split(',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        let (quantity, name) = split_quantity(piece);
        tokens.push(OrderProductToken {
            raw_text: piece.to_string(),
            name: name.to_string(),
            quantity,
            is_unmapped: false,
        });
    }

    tokens
}

/// Splits `"<n> x <name>"` into `(Some(n), name)`. Anything else, including a
/// count too large for `u32`, is returned whole with no quantity.
fn split_quantity(text: &str) -> (Option<u32>, &str) {
    let Some(caps) = QUANTITY_AND_NAME.captures(text) else {
        return (None, text);
    };
    let quantity = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
    match (quantity, caps.get(2)) {
        (Some(q), Some(name)) => (Some(q), name.as_str().trim()),
        _ => (None, text),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
