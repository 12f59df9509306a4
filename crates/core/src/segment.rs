//! Bloc segmentation.
//!
//! Cuts a normalized narrative into blocs, each sized for one slide's text
//! box. Titles and paragraph starts are only placed where enough headroom is
//! left for what follows them; a paragraph that reaches the line limit is
//! split at its first period (or comma) so slides end on punctuation.

use crate::normalize::{split_elements, NarrativeNormalizer, ELEMENT_DELIMITER};
use crate::types::{ElementKind, LayoutLimits, OverflowPolicy};
use crate::wrap::wrap_words;
use crate::Result;

/// One slide's worth of text, as an ordered list of line fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bloc {
    fragments: Vec<String>,
}

impl Bloc {
    /// Create an empty bloc.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of logical lines accumulated so far.
    pub fn line_count(&self) -> usize {
        self.fragments.len()
    }

    /// Whether no fragment has been added yet.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The raw fragments, in insertion order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Final text: fragments joined by single spaces, trimmed.
    pub fn text(&self) -> String {
        self.fragments.join(" ").trim().to_string()
    }

    fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }
}

/// Splits narratives into slide-sized blocs.
#[derive(Debug, Clone)]
pub struct BlocSegmenter {
    limits: LayoutLimits,
    overflow: OverflowPolicy,
    normalizer: NarrativeNormalizer,
}

impl BlocSegmenter {
    /// Create a segmenter, rejecting limits with a zero field.
    pub fn new(limits: LayoutLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self {
            limits,
            overflow: OverflowPolicy::default(),
            normalizer: NarrativeNormalizer::new(),
        })
    }

    /// Set what happens to a full bloc's overflowing line that has no period or comma.
    pub fn with_overflow_policy(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Use a custom normalizer for [`segment`](Self::segment).
    pub fn with_normalizer(mut self, normalizer: NarrativeNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The limits this segmenter was built with.
    pub fn limits(&self) -> &LayoutLimits {
        &self.limits
    }

    /// Normalize a raw narrative and cut it into bloc texts.
    pub fn segment(&self, narrative: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(narrative);
        self.segment_normalized(&normalized)
    }

    /// Cut already-normalized text into bloc texts.
    pub fn segment_normalized(&self, normalized: &str) -> Vec<String> {
        self.segment_to_blocs(normalized)
            .iter()
            .map(Bloc::text)
            .collect()
    }

    /// Cut already-normalized text into blocs, keeping their fragments.
    pub fn segment_to_blocs(&self, normalized: &str) -> Vec<Bloc> {
        let mut builder = BlocBuilder::new(&self.limits, self.overflow);

        for element in split_elements(normalized) {
            match self.limits.classify(element) {
                ElementKind::Title => builder.push_title(element),
                ElementKind::Paragraph => builder.push_paragraph(element),
            }
        }

        builder.finish()
    }
}

/// Normalize and segment a narrative with the given limits.
pub fn segment(narrative: &str, limits: LayoutLimits) -> Result<Vec<String>> {
    Ok(BlocSegmenter::new(limits)?.segment(narrative))
}

/// Accumulator state for one segmentation run.
struct BlocBuilder<'a> {
    limits: &'a LayoutLimits,
    overflow: OverflowPolicy,
    blocs: Vec<Bloc>,
    current: Bloc,
    previous: Option<ElementKind>,
}

impl<'a> BlocBuilder<'a> {
    fn new(limits: &'a LayoutLimits, overflow: OverflowPolicy) -> Self {
        Self {
            limits,
            overflow,
            blocs: Vec::new(),
            current: Bloc::new(),
            previous: None,
        }
    }

    fn push_title(&mut self, title: &str) {
        log::trace!("title element: {:?}", title);

        if self.current.line_count() < self.limits.title_capacity() {
            if self.previous == Some(ElementKind::Paragraph) {
                self.current.push(format!("{}{}", ELEMENT_DELIMITER, title));
            } else {
                self.current.push(title);
            }
        } else {
            self.close("no room for a title and its paragraph");
            self.current.push(format!("{}{}", title, ELEMENT_DELIMITER));
        }

        self.previous = Some(ElementKind::Title);
    }

    fn push_paragraph(&mut self, paragraph: &str) {
        let lines = wrap_words(paragraph, self.limits.line_max_chars);
        log::trace!("paragraph element wrapped into {} lines", lines.len());

        for (j, line) in lines.into_iter().enumerate() {
            if self.current.line_count() >= self.limits.bloc_max_lines {
                self.split_overflowing(line);
            } else if j == 0 && self.previous == Some(ElementKind::Paragraph) {
                if self.current.line_count() < self.limits.paragraph_capacity() {
                    self.current.push(format!("{}{}", ELEMENT_DELIMITER, line));
                } else {
                    self.close("no room for a new paragraph");
                    self.current.push(line);
                }
            } else {
                self.current.push(line);
            }
        }

        self.previous = Some(ElementKind::Paragraph);
    }

    /// Close a full bloc on the first period of `line`, else its first comma.
    fn split_overflowing(&mut self, line: String) {
        match line.find('.').or_else(|| line.find(',')) {
            Some(idx) => {
                let (head, tail) = line.split_at(idx + 1);
                self.current.push(head);
                self.close("line limit reached, split at punctuation");

                let tail = tail.strip_prefix(' ').unwrap_or(tail);
                if !tail.is_empty() {
                    self.current.push(tail);
                }
            }
            None => match self.overflow {
                OverflowPolicy::CarryLine => {
                    self.close("line limit reached, line carried over");
                    self.current.push(line);
                }
                OverflowPolicy::Overflow => {
                    log::debug!(
                        "bloc exceeds {} lines with unpunctuated line",
                        self.limits.bloc_max_lines
                    );
                    self.current.push(line);
                }
            },
        }
    }

    fn close(&mut self, reason: &str) {
        let bloc = std::mem::take(&mut self.current);
        if bloc.text().is_empty() {
            return;
        }

        log::debug!(
            "closing bloc {} with {} lines: {}",
            self.blocs.len() + 1,
            bloc.line_count(),
            reason
        );
        self.blocs.push(bloc);
    }

    fn finish(mut self) -> Vec<Bloc> {
        self.close("end of narrative");
        self.blocs
    }
}
