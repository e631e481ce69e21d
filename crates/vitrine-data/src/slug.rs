use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r"[^\w\s-]").expect("Invalid slug regex")
});

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
  #[allow(
    clippy::expect_used,
    reason = "Hardcoded regex pattern is known to be valid"
  )]
  Regex::new(r"[-\s]+").expect("Invalid slug separator regex")
});

/// Turn display text into an ASCII, lowercase, hyphenated identifier.
///
/// Accented Latin letters are folded to their base letter; anything else
/// outside ASCII is dropped.
///
/// ```
/// assert_eq!(vitrine_data::slugify("Crème Brûlée & Co"), "creme-brulee-co");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
  if text.is_empty() {
    return String::new();
  }

  let lowered = text.to_lowercase();
  let cleaned = NON_WORD.replace_all(&lowered, "");
  let hyphenated = SEPARATORS.replace_all(&cleaned, "-");

  let ascii: String = hyphenated.nfd().filter(char::is_ascii).collect();
  ascii.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_slugify_basic() {
    assert_eq!(slugify("Hello World"), "hello-world");
    assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
    assert_eq!(slugify(""), "");
  }

  #[test]
  fn test_slugify_accents_and_punctuation() {
    assert_eq!(slugify("Mentions légales"), "mentions-legales");
    assert_eq!(slugify("Politique de confidentialité!"), "politique-de-confidentialite");
    assert_eq!(slugify("Größe"), "groe");
  }

  #[test]
  fn test_slugify_collapses_separators() {
    assert_eq!(slugify("a -- b"), "a-b");
    assert_eq!(slugify("--edge--"), "edge");
    assert_eq!(slugify("snake_case stays"), "snake_case-stays");
  }

  #[test]
  fn test_slugify_drops_non_latin() {
    assert_eq!(slugify("日本 shop"), "shop");
  }
}
