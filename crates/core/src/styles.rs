//! Inline emphasis markers in bloc text.
//!
//! Narratives mark emphasis with `**text**` or `✮text✮`. Renderers insert the
//! text with the `**` markers stripped and apply bold to the returned ranges.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

/// Longest `**` span, in characters, that is still rendered bold.
pub const BOLD_SPAN_MAX_CHARS: usize = 89;

/// Runs of three or more asterisks, which are dropped.
static STAR_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*{3,}").unwrap());

/// `**text**` emphasis.
static DOUBLE_STAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// `✮text✮` emphasis.
static STAR_GLYPH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\u{272E}(.*?)\u{272E}").unwrap());

/// Text ready for insertion, with the character ranges to render bold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText {
    /// Text with `**` markers removed.
    pub text: String,

    /// Bold character ranges into `text`, sorted by start.
    pub bold: Vec<Range<usize>>,
}

/// Strip emphasis markers and compute bold ranges.
pub fn parse_inline_styles(text: &str) -> StyledText {
    let text = STAR_RUN_REGEX.replace_all(text, "");

    let mut output = String::with_capacity(text.len());
    let mut output_chars = 0;
    let mut bold = Vec::new();
    let mut last_end = 0;

    for caps in DOUBLE_STAR_REGEX.captures_iter(&text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let between = text[last_end..whole.start()].replace("**", "");
        output_chars += between.chars().count();
        output.push_str(&between);

        let inner_chars = inner.as_str().chars().count();
        if inner_chars <= BOLD_SPAN_MAX_CHARS {
            bold.push(output_chars..output_chars + inner_chars);
        } else {
            log::debug!("not bolding {}-character emphasis span", inner_chars);
        }
        output_chars += inner_chars;
        output.push_str(inner.as_str());

        last_end = whole.end();
    }
    output.push_str(&text[last_end..].replace("**", ""));

    for glyph_span in STAR_GLYPH_REGEX.find_iter(&output) {
        let start = output[..glyph_span.start()].chars().count();
        let len = glyph_span.as_str().chars().count();
        bold.push(start..start + len);
    }
    bold.sort_by_key(|range| range.start);

    StyledText { text: output, bold }
}

/// Collapse the blank-line artifacts left by segmentation.
pub fn tidy_bloc(text: &str) -> String {
    text.replace("\n\n\n", "\n\n").replace("\n \n", "\n\n")
}
