//! Text normalization for client narratives.
//!
//! Cleans the raw text of a spreadsheet cell before it is cut into blocs:
//! surrounding quotes, list-style dashes, bracketed annotations and braces
//! are removed, and paragraph breaks are canonicalized to a single blank line.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Delimiter between narrative elements after normalization.
pub const ELEMENT_DELIMITER: &str = "\n\n";

/// Regex matching a hyphen surrounded by whitespace between two words.
static SPACED_HYPHEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\s+-\s+(\w+)\b").unwrap());

/// Regex matching a bracketed annotation such as `[note]`.
static BRACKETED_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").unwrap());

/// Regex matching two or more newlines with any whitespace between them.
static BLANK_LINES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n[\s\n]*").unwrap());

/// Normalizer for raw client narratives.
#[derive(Debug, Clone)]
pub struct NarrativeNormalizer {
    /// Whether to compose the text to Unicode NFC first.
    compose_unicode: bool,
}

impl Default for NarrativeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrativeNormalizer {
    /// Create a new normalizer with default settings.
    pub fn new() -> Self {
        Self {
            compose_unicode: true,
        }
    }

    /// Set whether to compose the text to Unicode NFC before cleaning.
    pub fn with_compose_unicode(mut self, compose: bool) -> Self {
        self.compose_unicode = compose;
        self
    }

    /// Normalize a raw narrative.
    ///
    /// - Normalizes line endings (and composes to NFC unless disabled)
    /// - Strips surrounding double quotes
    /// - Turns `" - "` into `", "` and `word  -  word` into `word-word`
    /// - Removes `[...]` annotations and `{` / `}` characters
    /// - Collapses runs of blank lines into a single blank line
    /// - Trims leading/trailing whitespace
    pub fn normalize(&self, text: &str) -> String {
        let mut result = text.replace("\r\n", "\n").replace('\r', "\n");

        if self.compose_unicode {
            result = result.nfc().collect();
        }

        result = result.trim_matches('"').replace(" - ", ", ");
        result = SPACED_HYPHEN_REGEX
            .replace_all(&result, "${1}-${2}")
            .into_owned();
        result = BRACKETED_REGEX.replace_all(&result, "").into_owned();
        result.retain(|c| c != '{' && c != '}');

        let result = BLANK_LINES_REGEX.replace_all(result.trim(), ELEMENT_DELIMITER);

        result.trim().to_string()
    }

    /// Normalize a narrative and split it into its non-empty elements.
    pub fn normalize_to_elements(&self, text: &str) -> Vec<String> {
        split_elements(&self.normalize(text))
            .map(str::to_string)
            .collect()
    }
}

/// Split normalized text into trimmed, non-empty elements.
pub fn split_elements(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(ELEMENT_DELIMITER)
        .map(str::trim)
        .filter(|element| !element.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_surrounding_quotes() {
        let normalizer = NarrativeNormalizer::new();

        assert_eq!(normalizer.normalize("\"Hello there\""), "Hello there");
        assert_eq!(normalizer.normalize("\"\"Twice\"\""), "Twice");
        assert_eq!(
            normalizer.normalize("She said \"yes\" today"),
            "She said \"yes\" today"
        );
    }

    #[test]
    fn test_spaced_dash_becomes_comma() {
        let normalizer = NarrativeNormalizer::new();

        assert_eq!(
            normalizer.normalize("Strengths - focus - energy"),
            "Strengths, focus, energy"
        );
    }

    #[test]
    fn test_wide_spaced_hyphen_collapses() {
        let normalizer = NarrativeNormalizer::new();

        assert_eq!(normalizer.normalize("self -\taware"), "self-aware");
        assert_eq!(normalizer.normalize("self\t-\tdriven"), "self-driven");
        assert_eq!(normalizer.normalize("well-being"), "well-being");
    }

    #[test]
    fn test_remove_bracketed_annotations() {
        let normalizer = NarrativeNormalizer::new();

        assert_eq!(
            normalizer.normalize("You lead [internal note] with care [sic]."),
            "You lead  with care ."
        );
        // Non-greedy: text between two spans survives
        assert_eq!(normalizer.normalize("[a] keep [b]"), "keep");
    }

    #[test]
    fn test_remove_braces() {
        let normalizer = NarrativeNormalizer::new();

        assert_eq!(normalizer.normalize("Dear {first_name}"), "Dear first_name");
    }

    #[test]
    fn test_collapse_blank_lines() {
        let normalizer = NarrativeNormalizer::new();

        assert_eq!(
            normalizer.normalize("Title\n\n\n\nBody"),
            "Title\n\nBody"
        );
        assert_eq!(
            normalizer.normalize("Title\n  \n \t\n  Body"),
            "Title\n\nBody"
        );
        assert_eq!(normalizer.normalize("Line one\nLine two"), "Line one\nLine two");
    }

    #[test]
    fn test_windows_line_endings() {
        let normalizer = NarrativeNormalizer::new();

        assert_eq!(normalizer.normalize("Title\r\n\r\nBody"), "Title\n\nBody");
    }

    #[test]
    fn test_trim_whitespace() {
        let normalizer = NarrativeNormalizer::new();

        assert_eq!(normalizer.normalize("  \n\nHello\n\n  "), "Hello");
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   "), "");
    }

    #[test]
    fn test_compose_unicode() {
        let decomposed = "Cafe\u{301}";

        assert_eq!(NarrativeNormalizer::new().normalize(decomposed), "Café");
        assert_eq!(
            NarrativeNormalizer::new()
                .with_compose_unicode(false)
                .normalize(decomposed),
            decomposed
        );
    }

    #[test]
    fn test_normalize_to_elements() {
        let normalizer = NarrativeNormalizer::new();

        let elements = normalizer.normalize_to_elements("\"Intro\n\n\nFirst part.\n \nSecond part.\"");
        assert_eq!(elements, vec!["Intro", "First part.", "Second part."]);
    }

    #[test]
    fn test_empty_input_has_no_elements() {
        let normalizer = NarrativeNormalizer::new();

        assert!(normalizer.normalize_to_elements("").is_empty());
        assert!(normalizer.normalize_to_elements("\"\"").is_empty());
        assert!(normalizer.normalize_to_elements("[only a note]").is_empty());
    }
}
