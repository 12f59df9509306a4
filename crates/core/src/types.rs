//! Domain types for layout limits and narrative elements.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Limits describing how much text fits in one slide's text box.
///
/// Lines are logical fragments (a title, or one wrapped paragraph line),
/// not rendered height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutLimits {
    /// Maximum number of logical lines a bloc may hold.
    #[serde(alias = "blocMaxLines", alias = "slides_bloc_max_lines")]
    pub bloc_max_lines: usize,

    /// Maximum characters per wrapped paragraph line.
    #[serde(alias = "lineMaxChars", alias = "slides_lines_max_chars")]
    pub line_max_chars: usize,

    /// Elements shorter than this many characters are titles.
    #[serde(alias = "titleMaxChars", alias = "slides_title_max_chars")]
    pub title_max_chars: usize,

    /// Lines of headroom required before a title may be appended.
    #[serde(
        alias = "titleParagraphMinSpace",
        alias = "slides_title_paragraph_min_space"
    )]
    pub title_paragraph_min_space: usize,

    /// Lines of headroom required before a paragraph may follow a paragraph.
    #[serde(alias = "paragraphsMinSpace", alias = "slides_paragraphs_min_space")]
    pub paragraphs_min_space: usize,
}

impl Default for LayoutLimits {
    fn default() -> Self {
        Self {
            bloc_max_lines: 18,
            line_max_chars: 100,
            title_max_chars: 50,
            title_paragraph_min_space: 2,
            paragraphs_min_space: 2,
        }
    }
}

impl LayoutLimits {
    /// Create limits from explicit values.
    pub fn new(
        bloc_max_lines: usize,
        line_max_chars: usize,
        title_max_chars: usize,
        title_paragraph_min_space: usize,
        paragraphs_min_space: usize,
    ) -> Self {
        Self {
            bloc_max_lines,
            line_max_chars,
            title_max_chars,
            title_paragraph_min_space,
            paragraphs_min_space,
        }
    }

    /// Parse limits from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let limits: Self = serde_json::from_str(json)?;
        limits.validate()?;
        Ok(limits)
    }

    /// Load limits from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Reject limits with any zero field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("bloc_max_lines", self.bloc_max_lines),
            ("line_max_chars", self.line_max_chars),
            ("title_max_chars", self.title_max_chars),
            ("title_paragraph_min_space", self.title_paragraph_min_space),
            ("paragraphs_min_space", self.paragraphs_min_space),
        ];

        match fields.iter().find(|(_, value)| *value == 0) {
            Some(&(field, value)) => Err(Error::InvalidConfiguration { field, value }),
            None => Ok(()),
        }
    }

    /// Classify an element as a title or a paragraph by its trimmed length.
    pub fn classify(&self, element: &str) -> ElementKind {
        if element.trim().chars().count() < self.title_max_chars {
            ElementKind::Title
        } else {
            ElementKind::Paragraph
        }
    }

    /// Bloc length below which a title may still be appended.
    pub(crate) fn title_capacity(&self) -> usize {
        self.bloc_max_lines
            .saturating_sub(self.title_paragraph_min_space)
    }

    /// Bloc length below which a new paragraph may still be appended.
    pub(crate) fn paragraph_capacity(&self) -> usize {
        self.bloc_max_lines.saturating_sub(self.paragraphs_min_space)
    }
}

/// Kind of a blank-line-delimited narrative element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Short heading line.
    Title,
    /// Body text, word-wrapped into lines.
    Paragraph,
}

/// What to do when a bloc is full and the overflowing line has no period or comma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Close the full bloc and carry the whole line into the next one.
    #[default]
    CarryLine,
    /// Keep the line in the current bloc, exceeding `bloc_max_lines`.
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_valid() {
        assert!(LayoutLimits::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_field() {
        let limits = LayoutLimits::new(18, 100, 50, 0, 2);
        match limits.validate() {
            Err(Error::InvalidConfiguration { field, value }) => {
                assert_eq!(field, "title_paragraph_min_space");
                assert_eq!(value, 0);
            }
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_by_trimmed_length() {
        let limits = LayoutLimits::new(18, 100, 10, 2, 2);

        assert_eq!(limits.classify("Intro"), ElementKind::Title);
        assert_eq!(limits.classify("   Intro    "), ElementKind::Title);
        assert_eq!(limits.classify("123456789"), ElementKind::Title);
        assert_eq!(limits.classify("1234567890"), ElementKind::Paragraph);
        assert_eq!(limits.classify(""), ElementKind::Title);
    }

    #[test]
    fn test_classify_counts_characters_not_bytes() {
        let limits = LayoutLimits::new(18, 100, 6, 2, 2);

        // 5 characters, 10 bytes
        assert_eq!(limits.classify("éééèè"), ElementKind::Title);
    }

    #[test]
    fn test_from_json_accepts_all_spellings() {
        let snake = r#"{"bloc_max_lines": 12, "line_max_chars": 80, "title_max_chars": 40,
            "title_paragraph_min_space": 3, "paragraphs_min_space": 1}"#;
        let camel = r#"{"blocMaxLines": 12, "lineMaxChars": 80, "titleMaxChars": 40,
            "titleParagraphMinSpace": 3, "paragraphsMinSpace": 1}"#;
        let legacy = r#"{"slides_bloc_max_lines": 12, "slides_lines_max_chars": 80,
            "slides_title_max_chars": 40, "slides_title_paragraph_min_space": 3,
            "slides_paragraphs_min_space": 1}"#;

        let expected = LayoutLimits::new(12, 80, 40, 3, 1);
        assert_eq!(LayoutLimits::from_json(snake).unwrap(), expected);
        assert_eq!(LayoutLimits::from_json(camel).unwrap(), expected);
        assert_eq!(LayoutLimits::from_json(legacy).unwrap(), expected);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            LayoutLimits::from_json("{not json"),
            Err(Error::ConfigParse(_))
        ));
        assert!(matches!(
            LayoutLimits::from_json(r#"{"bloc_max_lines": -1}"#),
            Err(Error::ConfigParse(_))
        ));

        let zero = r#"{"bloc_max_lines": 0, "line_max_chars": 80, "title_max_chars": 40,
            "title_paragraph_min_space": 3, "paragraphs_min_space": 1}"#;
        assert!(matches!(
            LayoutLimits::from_json(zero),
            Err(Error::InvalidConfiguration { field: "bloc_max_lines", .. })
        ));
    }

    #[test]
    fn test_capacities_saturate() {
        let limits = LayoutLimits::new(2, 100, 50, 5, 3);
        assert_eq!(limits.title_capacity(), 0);
        assert_eq!(limits.paragraph_capacity(), 0);
    }
}
