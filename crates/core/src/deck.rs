//! Slide filling against an external presentation service.
//!
//! The service is reached through two narrow contracts: [`SlideRenderer`]
//! writes one bloc into a slide, [`SlideProvisioner`] duplicates a slide.
//! [`SlideFiller`] drives both for a bloc sequence. Report assembly also
//! needs [`TemplateDeck`] to locate template slides and fill placeholders.

use crate::retry::RetryPolicy;
use crate::styles::{parse_inline_styles, tidy_bloc, StyledText};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Writes a bloc of text, under a title, into an existing slide.
///
/// Implementations are responsible for inline emphasis, typically via
/// [`parse_inline_styles`].
pub trait SlideRenderer {
    /// Render `bloc` with `title` into the slide `slide_id`.
    fn render_bloc(&mut self, slide_id: &str, title: &str, bloc: &str) -> Result<()>;
}

/// Provides additional slide surfaces by duplicating a template slide.
pub trait SlideProvisioner {
    /// Duplicate `template_slide_id`, move the copy to `insertion_index`,
    /// and return the new slide's id.
    fn duplicate_and_place(&mut self, template_slide_id: &str, insertion_index: usize)
        -> Result<String>;
}

/// A presentation whose template slides can be located and personalized.
pub trait TemplateDeck: SlideRenderer + SlideProvisioner {
    /// Id of the slide at the 1-based `position`.
    fn slide_id_at(&mut self, position: usize) -> Result<String>;

    /// Replace every occurrence of `placeholder` in the slide with `value`.
    fn replace_placeholder(&mut self, slide_id: &str, placeholder: &str, value: &str)
        -> Result<()>;
}

/// Fills consecutive slides with a bloc sequence.
#[derive(Debug, Clone)]
pub struct SlideFiller {
    retry: RetryPolicy,
    pace: Duration,
}

impl Default for SlideFiller {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            pace: Duration::from_secs(3),
        }
    }
}

impl SlideFiller {
    /// Create a filler with the default retry policy and a 3 second pace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry policy used for every collaborator call.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the pause after each rendered slide.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Render `blocs` starting at `slide_id`, duplicating it as needed.
    ///
    /// Every bloc but the last of a multi-bloc sequence first duplicates the
    /// most recent slide to `cursor`, then fills the slide before the copy.
    /// Blocs of two characters or fewer are skipped. Returns the cursor
    /// advanced by one per rendered bloc.
    pub fn fill<D>(
        &self,
        deck: &mut D,
        slide_id: &str,
        mut cursor: usize,
        title: &str,
        blocs: &[String],
    ) -> Result<usize>
    where
        D: SlideRenderer + SlideProvisioner,
    {
        let mut latest = slide_id.to_string();

        for (j, bloc) in blocs.iter().enumerate() {
            let text = tidy_bloc(bloc);
            if text.chars().count() <= 2 {
                log::debug!("skipping near-empty bloc {} of '{}'", j + 1, title);
                continue;
            }

            let target = if blocs.len() > 1 && j != blocs.len() - 1 {
                let copy = self.retry.run("duplicate_slide", || {
                    deck.duplicate_and_place(&latest, cursor)
                })?;
                log::debug!("duplicated slide {} as {} at {}", latest, copy, cursor);
                std::mem::replace(&mut latest, copy)
            } else {
                latest.clone()
            };

            self.retry
                .run("render_bloc", || deck.render_bloc(&target, title, &text))?;
            log::info!("filled slide {} with bloc {}/{} of '{}'", target, j + 1, blocs.len(), title);

            cursor += 1;
            if !self.pace.is_zero() {
                std::thread::sleep(self.pace);
            }
        }

        Ok(cursor)
    }
}

/// A slide held by [`MemoryDeck`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySlide {
    /// Slide id.
    pub id: String,
    /// Title rendered into the slide, if any.
    pub title: Option<String>,
    /// Styled body rendered into the slide, if any.
    pub body: Option<StyledText>,
    /// Placeholder replacements applied to the slide.
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,
}

impl MemorySlide {
    fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            body: None,
            placeholders: BTreeMap::new(),
        }
    }
}

/// In-memory presentation implementing the collaborator contracts.
///
/// Duplicated slides are placed the way the remote presentation service
/// moves them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDeck {
    slides: Vec<MemorySlide>,
    copies: usize,
}

impl MemoryDeck {
    /// Create a deck holding blank slides with the given ids.
    pub fn new<I, S>(slide_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slides: slide_ids.into_iter().map(MemorySlide::blank).collect(),
            copies: 0,
        }
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[MemorySlide] {
        &self.slides
    }

    /// Position of a slide in the deck.
    pub fn position(&self, slide_id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == slide_id)
    }

    /// Plain-text listing of the deck, one section per slide.
    pub fn describe(&self) -> String {
        let sections: Vec<String> = self
            .slides
            .iter()
            .enumerate()
            .map(|(idx, slide)| {
                let title = slide.title.as_deref().unwrap_or("");
                let body = slide.body.as_ref().map(|b| b.text.as_str()).unwrap_or("");
                let mut section = format!("[{}] {} | {}\n{}", idx + 1, slide.id, title, body);
                for (placeholder, value) in &slide.placeholders {
                    section.push_str(&format!("\n{} -> {}", placeholder, value));
                }
                section
            })
            .collect();

        sections.join("\n\n")
    }
}

impl SlideRenderer for MemoryDeck {
    fn render_bloc(&mut self, slide_id: &str, title: &str, bloc: &str) -> Result<()> {
        let slide = self
            .slides
            .iter_mut()
            .find(|s| s.id == slide_id)
            .ok_or_else(|| Error::Collaborator(format!("Unknown slide: {}", slide_id)))?;

        slide.title = Some(title.to_string());
        slide.body = Some(parse_inline_styles(bloc));
        Ok(())
    }
}

impl SlideProvisioner for MemoryDeck {
    fn duplicate_and_place(
        &mut self,
        template_slide_id: &str,
        insertion_index: usize,
    ) -> Result<String> {
        let template = self
            .position(template_slide_id)
            .ok_or_else(|| Error::Collaborator(format!("Unknown slide: {}", template_slide_id)))?;

        self.copies += 1;
        let mut copy = self.slides[template].clone();
        copy.id = format!("{}_copy{}", template_slide_id, self.copies);
        let id = copy.id.clone();

        // The copy starts right after its template; `insertion_index` counts
        // the deck as it was before the move, copy included.
        let from = template + 1;
        let to = if insertion_index > from {
            insertion_index - 1
        } else {
            insertion_index
        };
        self.slides.insert(to.min(self.slides.len()), copy);
        Ok(id)
    }
}

impl TemplateDeck for MemoryDeck {
    fn slide_id_at(&mut self, position: usize) -> Result<String> {
        position
            .checked_sub(1)
            .and_then(|idx| self.slides.get(idx))
            .map(|slide| slide.id.clone())
            .ok_or_else(|| Error::Collaborator(format!("No slide at position {}", position)))
    }

    fn replace_placeholder(&mut self, slide_id: &str, placeholder: &str, value: &str) -> Result<()> {
        let slide = self
            .slides
            .iter_mut()
            .find(|s| s.id == slide_id)
            .ok_or_else(|| Error::Collaborator(format!("Unknown slide: {}", slide_id)))?;

        slide
            .placeholders
            .insert(placeholder.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler() -> SlideFiller {
        SlideFiller::new()
            .with_retry_policy(RetryPolicy::none())
            .with_pace(Duration::ZERO)
    }

    fn blocs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn bodies(deck: &MemoryDeck) -> Vec<String> {
        deck.slides()
            .iter()
            .map(|s| s.body.as_ref().map(|b| b.text.clone()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_single_bloc_fills_template_slide() {
        let mut deck = MemoryDeck::new(["cover", "content", "closing"]);

        let cursor = filler()
            .fill(&mut deck, "content", 2, "Strengths", &blocs(&["You **shine**."]))
            .unwrap();

        assert_eq!(cursor, 3);
        assert_eq!(deck.slides().len(), 3);
        let slide = &deck.slides()[1];
        assert_eq!(slide.title.as_deref(), Some("Strengths"));
        let body = slide.body.as_ref().unwrap();
        assert_eq!(body.text, "You shine.");
        assert_eq!(body.bold, vec![4..9]);
    }

    #[test]
    fn test_multiple_blocs_duplicate_in_order() {
        let mut deck = MemoryDeck::new(["cover", "content", "closing"]);

        let cursor = filler()
            .fill(
                &mut deck,
                "content",
                2,
                "Growth",
                &blocs(&["First part.", "Second part.", "Third part."]),
            )
            .unwrap();

        assert_eq!(cursor, 5);
        let ids: Vec<&str> = deck.slides().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["cover", "content", "content_copy1", "content_copy1_copy2", "closing"]
        );
        assert_eq!(
            bodies(&deck),
            vec!["", "First part.", "Second part.", "Third part.", ""]
        );
        assert!(deck.slides()[1..4]
            .iter()
            .all(|s| s.title.as_deref() == Some("Growth")));
    }

    #[test]
    fn test_near_empty_blocs_skipped() {
        let mut deck = MemoryDeck::new(["content"]);

        let cursor = filler()
            .fill(&mut deck, "content", 1, "Notes", &blocs(&["ok", "Real text."]))
            .unwrap();

        assert_eq!(cursor, 2);
        assert_eq!(bodies(&deck), vec!["Real text."]);
    }

    #[test]
    fn test_blocs_are_tidied() {
        let mut deck = MemoryDeck::new(["content"]);

        filler()
            .fill(&mut deck, "content", 1, "T", &blocs(&["One. \n\n\nTwo\n \nThree"]))
            .unwrap();

        assert_eq!(bodies(&deck), vec!["One. \n\nTwo\n\nThree"]);
    }

    #[test]
    fn test_unknown_slide_is_an_error() {
        let mut deck = MemoryDeck::new(["content"]);

        let result = filler().fill(&mut deck, "missing", 1, "T", &blocs(&["Some text."]));

        assert!(matches!(result, Err(Error::RetriesExhausted { .. })));
    }

    #[test]
    fn test_empty_sequence_leaves_deck_untouched() {
        let mut deck = MemoryDeck::new(["content"]);

        let cursor = filler().fill(&mut deck, "content", 1, "T", &[]).unwrap();

        assert_eq!(cursor, 1);
        assert_eq!(deck.slides()[0].body, None);
    }

    /// Deck that rate-limits the first render call.
    struct FlakyDeck {
        inner: MemoryDeck,
        refusals: usize,
    }

    impl SlideRenderer for FlakyDeck {
        fn render_bloc(&mut self, slide_id: &str, title: &str, bloc: &str) -> Result<()> {
            if self.refusals > 0 {
                self.refusals -= 1;
                return Err(Error::RateLimited("429 Too Many Requests".into()));
            }
            self.inner.render_bloc(slide_id, title, bloc)
        }
    }

    impl SlideProvisioner for FlakyDeck {
        fn duplicate_and_place(&mut self, template: &str, index: usize) -> Result<String> {
            self.inner.duplicate_and_place(template, index)
        }
    }

    #[test]
    fn test_rate_limited_render_is_retried() {
        let mut deck = FlakyDeck {
            inner: MemoryDeck::new(["content"]),
            refusals: 2,
        };
        let filler = SlideFiller::new()
            .with_retry_policy(RetryPolicy::default().with_delays(Duration::ZERO, Duration::ZERO))
            .with_pace(Duration::ZERO);

        filler
            .fill(&mut deck, "content", 1, "T", &blocs(&["Eventually rendered."]))
            .unwrap();

        assert_eq!(deck.refusals, 0);
        assert_eq!(bodies(&deck.inner), vec!["Eventually rendered."]);
    }

    #[test]
    fn test_describe() {
        let mut deck = MemoryDeck::new(["a", "b"]);
        deck.render_bloc("b", "Title", "Body").unwrap();

        assert_eq!(deck.describe(), "[1] a | \n\n\n[2] b | Title\nBody");
        assert_eq!(deck.position("b"), Some(1));
    }

    #[test]
    fn test_copy_placement_counts_the_copy() {
        let mut deck = MemoryDeck::new(["a", "b", "c", "d"]);

        // Moving forward: the copy lands before the slide that held index 3
        deck.duplicate_and_place("a", 3).unwrap();
        // Moving backward
        deck.duplicate_and_place("d", 1).unwrap();
        // Past the end
        deck.duplicate_and_place("b", 99).unwrap();

        let ids: Vec<&str> = deck.slides().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d_copy2", "b", "a_copy1", "c", "d", "b_copy3"]);
    }

    #[test]
    fn test_template_lookup_is_one_based() {
        let mut deck = MemoryDeck::new(["cover", "title"]);

        assert_eq!(deck.slide_id_at(1).unwrap(), "cover");
        assert_eq!(deck.slide_id_at(2).unwrap(), "title");
        assert!(matches!(deck.slide_id_at(0), Err(Error::Collaborator(_))));
        assert!(matches!(deck.slide_id_at(3), Err(Error::Collaborator(_))));
    }

    #[test]
    fn test_placeholders_recorded_and_described() {
        let mut deck = MemoryDeck::new(["title"]);
        deck.replace_placeholder("title", "{title}", "Strengths").unwrap();
        deck.replace_placeholder("title", "{subtitle}", "What you do best").unwrap();

        assert_eq!(
            deck.describe(),
            "[1] title | \n\n{subtitle} -> What you do best\n{title} -> Strengths"
        );
        assert!(deck.replace_placeholder("missing", "{title}", "x").is_err());
    }
}
