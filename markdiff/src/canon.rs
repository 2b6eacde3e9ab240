//! Canonicalization of text and attribute values.
//!
//! The comparator never compares raw payloads directly: both sides go
//! through these functions first, so cosmetic formatting (indentation,
//! line wrapping, padded attribute values) does not register as a change.
//!
//! The policy is fixed and deliberately dumb: collapse every run of ASCII
//! and Unicode whitespace to a single space and trim the ends. Anything
//! smarter (entity resolution, case folding) belongs upstream in the
//! parser.

/// Canonicalize a text payload: whitespace runs collapse to one space,
/// leading/trailing whitespace is dropped.
pub fn canonicalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_gap = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            in_gap = true;
        } else {
            if in_gap && !out.is_empty() {
                out.push(' ');
            }
            in_gap = false;
            out.push(ch);
        }
    }
    out
}

/// Canonicalize an attribute value that may be absent.
///
/// A missing attribute stays `None`, which compares unequal to every real
/// value — the type system plays the role of the "canonicalization of
/// undefined" sentinel.
pub fn canonicalize_attr(raw: Option<&str>) -> Option<String> {
    raw.map(canonicalize_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_interior_whitespace() {
        assert_eq!(canonicalize_text("a  b\n\tc"), "a b c");
    }

    #[test]
    fn test_trims_ends() {
        assert_eq!(canonicalize_text("  hello  "), "hello");
        assert_eq!(canonicalize_text("\n\n"), "");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(canonicalize_text("Hello World"), "Hello World");
    }

    #[test]
    fn test_missing_attr_differs_from_every_value() {
        assert_ne!(canonicalize_attr(None), canonicalize_attr(Some("")));
        assert_ne!(canonicalize_attr(None), canonicalize_attr(Some("x")));
        assert_eq!(canonicalize_attr(None), None);
    }

    #[test]
    fn test_attr_values_normalized() {
        assert_eq!(
            canonicalize_attr(Some(" btn  primary ")),
            Some("btn primary".to_string())
        );
    }
}
