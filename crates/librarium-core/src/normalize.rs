//! String normalization for duplicate comparison.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Characters that carry no comparison meaning. Replaced with a space so
/// hyphenated and dotted words still split at word boundaries.
static NON_COMPARABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

/// Normalize a display name or title for comparison.
///
/// Lowercases, strips diacritics (NFKD decomposition, then ASCII filter),
/// replaces punctuation with spaces, and collapses whitespace runs to single
/// spaces. Pure and idempotent; empty input yields an empty string.
pub fn normalize(s: &str) -> String {
    let ascii: String = s.nfkd().filter(|c| c.is_ascii()).collect();
    let lowered = ascii.to_lowercase();
    let spaced = NON_COMPARABLE.replace_all(&lowered, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an author name, canonicalizing `"Last, First"` to `"First Last"`.
///
/// Only the first comma is treated as a surname separator, so
/// `"Smith, John"` and `"John Smith"` normalize identically. Names without a
/// comma pass straight through to [`normalize`].
pub fn normalize_author_name(s: &str) -> String {
    match s.split_once(',') {
        Some((last, first)) => normalize(&format!("{} {}", first.trim(), last.trim())),
        None => normalize(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(normalize("The Hobbit: There & Back Again!"), "the hobbit there back again");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(normalize("Gabriel García Márquez"), "gabriel garcia marquez");
        assert_eq!(normalize("Brontë"), "bronte");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  Dune \t Messiah \n "), "dune messiah");
    }

    #[test]
    fn splits_hyphenated_words() {
        assert_eq!(normalize("Spider-Man"), "spider man");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  ¿¡  "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in [
            "The Hobbit: There & Back Again!",
            "Gabriel García Márquez",
            "  Dune \t Messiah ",
            "Spider-Man",
            "",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn author_comma_form_reorders() {
        assert_eq!(normalize_author_name("Smith, John"), "john smith");
        assert_eq!(normalize_author_name("Smith, John"), normalize_author_name("John Smith"));
    }

    #[test]
    fn author_with_initials() {
        assert_eq!(
            normalize_author_name("Tolkien, J. R. R."),
            normalize_author_name("J. R. R. Tolkien")
        );
    }

    #[test]
    fn author_without_comma_passes_through() {
        assert_eq!(normalize_author_name("Ursula K. Le Guin"), "ursula k le guin");
    }

    #[test]
    fn author_trailing_comma() {
        assert_eq!(normalize_author_name("Smith,"), "smith");
    }
}
