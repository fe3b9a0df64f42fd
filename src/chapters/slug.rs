//! Filesystem-safe chapter names

use crate::pdf::outline::UNKNOWN_TITLE;
use unicode_normalization::UnicodeNormalization;

/// Turn a title into a lowercase `[a-z0-9_]` slug.
///
/// Accents are stripped through NFKD decomposition, then every run of
/// characters outside `[A-Za-z0-9_]` collapses to a single underscore.
///
/// ```
/// use pdf_chapter_splitter::chapters::slugify;
///
/// assert_eq!(slugify("Chapter 1: The Beginning"), "chapter_1_the_beginning");
/// assert_eq!(slugify("Café Été"), "cafe_ete");
/// assert_eq!(slugify("!!!"), "unknown");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator {
                slug.push('_');
                pending_separator = false;
            }
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Slug for the chapter at 0-based `index`, e.g. `01_introduction`
pub fn chapter_slug(index: usize, title: &str) -> String {
    format!("{:02}_{}", index + 1, slugify(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Introduction", "introduction")]
    #[case("Chapter 1: The Beginning", "chapter_1_the_beginning")]
    #[case("  leading and trailing  ", "leading_and_trailing")]
    #[case("Café Été", "cafe_ete")]
    #[case("Über-Größe", "uber_groe")]
    #[case("snake_case__kept", "snake_case__kept")]
    #[case("__Edges__", "edges")]
    #[case("A -- B", "a_b")]
    #[case("ﬁnal Ⅳ", "final_iv")]
    #[case("第一章 Intro", "intro")]
    #[case("", "unknown")]
    #[case("!!!", "unknown")]
    #[case("日本語", "unknown")]
    #[case("___", "unknown")]
    fn test_slugify(#[case] title: &str, #[case] expected: &str) {
        assert_eq!(slugify(title), expected);
    }

    #[rstest]
    #[case("Ça va? Très bien!")]
    #[case("Ω≈ç√∫˜µ≤≥÷")]
    #[case("Résumé — 2nd draft (final).pdf")]
    #[case("\t\n\r")]
    fn test_slug_charset(#[case] title: &str) {
        let first = slugify(title);
        assert!(!first.is_empty());
        assert!(first
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        assert_eq!(first, slugify(title));
    }

    #[test]
    fn test_chapter_slug_padding() {
        assert_eq!(chapter_slug(0, "Intro"), "01_intro");
        assert_eq!(chapter_slug(9, "Ten"), "10_ten");
        assert_eq!(chapter_slug(99, "Hundred"), "100_hundred");
        assert_eq!(chapter_slug(2, "???"), "03_unknown");
    }
}
