//! Greedy word wrapping for paragraph elements.

/// Wrap text into lines of at most `width` characters.
///
/// Breaks only at whitespace. Whitespace runs (including newlines) collapse
/// to a single space. A word longer than `width` is kept whole on its own
/// line rather than being cut.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_short_text() {
        assert_eq!(wrap_words("A modest paragraph.", 100), vec!["A modest paragraph."]);
    }

    #[test]
    fn test_wrap_at_word_boundaries() {
        let lines = wrap_words("the quick brown fox jumps over the lazy dog", 10);
        assert_eq!(
            lines,
            vec!["the quick", "brown fox", "jumps over", "the lazy", "dog"]
        );
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_wrap_exact_width() {
        assert_eq!(wrap_words("abcd efgh", 9), vec!["abcd efgh"]);
        assert_eq!(wrap_words("abcd efgh", 8), vec!["abcd", "efgh"]);
    }

    #[test]
    fn test_long_word_is_not_split() {
        let lines = wrap_words("a supercalifragilistic word", 8);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "word"]);
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        assert_eq!(wrap_words("  one\ntwo \t three  ", 100), vec!["one two three"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_words("", 10).is_empty());
        assert!(wrap_words("   \n ", 10).is_empty());
    }

    #[test]
    fn test_wrap_counts_characters() {
        // Each word is 4 characters but 8 bytes
        assert_eq!(wrap_words("éééé èèèè", 9), vec!["éééé èèèè"]);
    }

    #[test]
    fn test_wrap_preserves_every_word() {
        let text = "Every word of this sentence must survive the wrapping step intact.";
        let joined = wrap_words(text, 12).join(" ");
        assert_eq!(joined, text);
    }
}
