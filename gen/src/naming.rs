//! Identifier conversion between schema names and Rust names.
//!
//! Contract names arrive in CamelCase (`Bs721Royalties`), variant tags in
//! snake_case (`withdraw_for_all`), and field names in whatever the schema
//! author wrote. These helpers normalize all of them into valid Rust
//! identifiers while the serde attributes on the generated types preserve
//! the authored spellings on the wire.

use proc_macro2::{Ident, Span};

/// Reserved words that need raw-identifier spelling when a schema field
/// uses them. Not exhaustive; covers the keywords that plausibly appear as
/// field names in message schemas.
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "box", "const", "crate", "else", "enum", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "static",
    "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
];

/// Converts a name to snake_case, splitting CamelCase words and normalizing
/// separators. Digits stick to the word they follow: `Bs721Royalties`
/// becomes `bs721_royalties`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let chars: Vec<char> = name.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '_' {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1);
            // Word boundary: lowercase/digit before, or an acronym ending
            // (uppercase before, lowercase after).
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Converts a name to UpperCamelCase: `withdraw_for_all` becomes
/// `WithdrawForAll`, `bs721-royalties` becomes `Bs721Royalties`.
pub fn to_upper_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;

    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Derives the snake_case module identifier for a contract name.
pub fn to_module_ident(name: &str) -> String {
    to_snake_case(name)
}

/// Builds a field identifier, falling back to a raw identifier for Rust
/// keywords so the authored name survives serialization unchanged.
pub fn field_ident(name: &str) -> Ident {
    let sanitized = sanitize(name);
    if RUST_KEYWORDS.contains(&sanitized.as_str()) {
        Ident::new_raw(&sanitized, Span::call_site())
    } else {
        Ident::new(&sanitized, Span::call_site())
    }
}

/// Whether sanitizing `name` changes its spelling, in which case the
/// rendered field needs a serde rename back to the authored form.
pub fn needs_rename(name: &str) -> bool {
    sanitize(name) != name
}

fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
