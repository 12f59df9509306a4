//! Report assembly.
//!
//! A client record maps column names to values; generated texts live under
//! `Result <name>` columns. [`ReportPlan`] groups those results into titled
//! sections following the report configuration, and [`ReportBuilder`] lays
//! the plan out in a [`TemplateDeck`]: copies of a title template open each
//! section, copies of a content template carry each result's blocs.

use crate::deck::{SlideFiller, TemplateDeck};
use crate::retry::RetryPolicy;
use crate::segment::BlocSegmenter;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Prefix of the client record columns holding generated results.
pub const RESULT_KEY_PREFIX: &str = "Result ";

/// Client record column holding the client's first name.
pub const FIRST_NAME_KEY: &str = "First name";

/// Client record column holding the link of an already built deck.
pub const SLIDES_LINK_KEY: &str = "Slides link";

/// Prompts sharing this many leading characters feed the same section.
pub const PROMPT_PREFIX_CHARS: usize = 3;

/// Title slide placeholders.
pub const TITLE_PLACEHOLDER: &str = "{title}";
pub const SUBTITLE_PLACEHOLDER: &str = "{subtitle}";
pub const INTRO_PLACEHOLDER: &str = "{intro}";

/// Result value marking a result deliberately left out.
const NULL_RESULT: &str = "NULL";
const FIRST_NAME_PLACEHOLDER: &str = "{first_name}";
/// Paragraph break marker in configured introductions.
const INTRO_BREAK: &str = "&&&";

/// Column name to value, as read from the client sheet.
pub type ClientRecord = HashMap<String, String>;

/// Which slides a report is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFlow {
    /// Each section opens with a title slide, followed by its results.
    #[default]
    Holistic,
    /// Results of the first section only, without title slides.
    Superpowers,
}

/// Report layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// One line per section: the main title, then one title per result,
    /// comma separated.
    #[serde(alias = "slides_titles")]
    pub titles: Vec<String>,

    /// Section subtitles, in section order.
    #[serde(default, alias = "slides_subtitles")]
    pub subtitles: Vec<String>,

    /// Section introductions, in section order.
    #[serde(default, alias = "slides_introductions")]
    pub introductions: Vec<String>,

    /// Prompt names; their first characters assign them to a section.
    #[serde(alias = "intel_prompts_list")]
    pub prompts: Vec<String>,

    /// Results that may appear in the report.
    #[serde(alias = "resultsEnabled", alias = "intel_results_enabled")]
    pub results_enabled: Vec<String>,

    /// 1-based position of the first template slide.
    #[serde(alias = "firstTitlePage", alias = "slides_first_title_page")]
    pub first_title_page: usize,

    /// Couple reports keep the first prompt of each section.
    #[serde(default)]
    pub couple: bool,

    #[serde(default)]
    pub flow: ReportFlow,
}

impl ReportConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Reject a zero template position.
    pub fn validate(&self) -> Result<()> {
        if self.first_title_page == 0 {
            return Err(Error::InvalidConfiguration {
                field: "first_title_page",
                value: 0,
            });
        }
        Ok(())
    }
}

/// Subtitle and introduction shown on a section's title slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarterSlide {
    pub subtitle: String,
    pub intro: String,
}

/// A result to lay out under its slide title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportResult {
    /// Result name, without the column prefix.
    pub name: String,
    pub title: String,
    pub content: String,
}

/// Results sharing a main title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub main_title: String,
    pub results: Vec<ReportResult>,
}

impl ReportSection {
    fn upsert(&mut self, result: ReportResult) {
        match self.results.iter_mut().find(|r| r.name == result.name) {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }
}

/// Group prompt names by their first [`PROMPT_PREFIX_CHARS`] characters,
/// in order of first appearance.
pub fn group_by_prefix<S: AsRef<str>>(names: &[S]) -> Vec<Vec<String>> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for name in names {
        let name = name.as_ref();
        let prefix: String = name.chars().take(PROMPT_PREFIX_CHARS).collect();
        match groups.iter_mut().find(|(p, _)| *p == prefix) {
            Some((_, group)) => group.push(name.to_string()),
            None => groups.push((prefix, vec![name.to_string()])),
        }
    }

    groups.into_iter().map(|(_, group)| group).collect()
}

fn result_value<'a>(client: &'a ClientRecord, name: &str) -> Option<&'a str> {
    client
        .get(&format!("{}{}", RESULT_KEY_PREFIX, name))
        .map(String::as_str)
}

fn is_filled(value: &str) -> bool {
    !value.is_empty() && value != NULL_RESULT
}

/// Enabled results the client has a usable value for.
pub fn enabled_results(client: &ClientRecord, enabled: &[String]) -> Vec<String> {
    enabled
        .iter()
        .filter(|name| result_value(client, name).is_some_and(is_filled))
        .cloned()
        .collect()
}

/// Whether a client's deck can be built now.
///
/// Every enabled result must have been generated (`NULL` counts), at least
/// one must be usable, and no deck may have been linked yet.
pub fn client_ready(client: &ClientRecord, config: &ReportConfig) -> bool {
    let generated = config
        .results_enabled
        .iter()
        .all(|name| result_value(client, name).is_some_and(|v| !v.is_empty()));
    let unlinked = client
        .get(SLIDES_LINK_KEY)
        .map_or(true, |link| link.trim().is_empty());

    generated && unlinked && !enabled_results(client, &config.results_enabled).is_empty()
}

/// Main title and result titles of a configured title line.
fn split_title_line(line: &str) -> (&str, Vec<&str>) {
    let mut parts = line.trim_matches(',').split(',');
    let main_title = parts.next().unwrap_or_default();
    (main_title, parts.collect())
}

/// Subtitle and introduction per main title.
pub fn build_starter_slides(config: &ReportConfig) -> BTreeMap<String, StarterSlide> {
    config
        .titles
        .iter()
        .zip(&config.subtitles)
        .zip(&config.introductions)
        .map(|((line, subtitle), intro)| {
            let (main_title, _) = split_title_line(line);
            (
                main_title.to_string(),
                StarterSlide {
                    subtitle: subtitle.clone(),
                    intro: intro.clone(),
                },
            )
        })
        .collect()
}

/// Sections of usable, enabled results in configuration order.
///
/// The n-th title line pairs with the n-th prompt group. Unless the report
/// is for a couple, a group's first prompt has no slide of its own.
pub fn build_sections(client: &ClientRecord, config: &ReportConfig) -> Vec<ReportSection> {
    let groups = group_by_prefix(&config.prompts);
    let mut sections: Vec<ReportSection> = Vec::new();

    for (line, group) in config.titles.iter().zip(&groups) {
        let (main_title, titles) = split_title_line(line);
        let names = if config.couple {
            &group[..]
        } else {
            group.get(1..).unwrap_or_default()
        };

        for (name, title) in names.iter().zip(titles) {
            if !config.results_enabled.contains(name) {
                continue;
            }
            let Some(content) = result_value(client, name).filter(|v| is_filled(v)) else {
                continue;
            };

            let idx = match sections.iter().position(|s| s.main_title == main_title) {
                Some(idx) => idx,
                None => {
                    sections.push(ReportSection {
                        main_title: main_title.to_string(),
                        results: Vec::new(),
                    });
                    sections.len() - 1
                }
            };
            sections[idx].upsert(ReportResult {
                name: name.clone(),
                title: title.to_string(),
                content: content.to_string(),
            });
        }
    }

    sections
}

/// Everything needed to lay out one client's report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPlan {
    sections: Vec<ReportSection>,
    starters: BTreeMap<String, StarterSlide>,
    first_name: String,
    flow: ReportFlow,
    first_title_page: usize,
}

impl ReportPlan {
    /// Plan the report of `client`.
    pub fn build(client: &ClientRecord, config: &ReportConfig) -> Result<Self> {
        config.validate()?;

        let plan = Self {
            sections: build_sections(client, config),
            starters: build_starter_slides(config),
            first_name: client.get(FIRST_NAME_KEY).cloned().unwrap_or_default(),
            flow: config.flow,
            first_title_page: config.first_title_page,
        };
        log::debug!(
            "planned {} results in {} sections",
            plan.result_count(),
            plan.sections.len()
        );
        Ok(plan)
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    pub fn result_count(&self) -> usize {
        self.sections.iter().map(|s| s.results.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn flow(&self) -> ReportFlow {
        self.flow
    }

    /// Title slide content for a section.
    pub fn starter(&self, main_title: &str) -> Option<&StarterSlide> {
        self.starters.get(main_title)
    }

    /// A section's introduction with the client's first name filled in and
    /// paragraph markers expanded.
    pub fn intro_for(&self, main_title: &str) -> Option<String> {
        self.starter(main_title).map(|starter| {
            starter
                .intro
                .replace(FIRST_NAME_PLACEHOLDER, &self.first_name)
                .replace(INTRO_BREAK, "\n\n")
        })
    }
}

/// Lays a [`ReportPlan`] out in a deck.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    segmenter: BlocSegmenter,
    filler: SlideFiller,
    retry: RetryPolicy,
}

impl ReportBuilder {
    pub fn new(segmenter: BlocSegmenter) -> Self {
        Self {
            segmenter,
            filler: SlideFiller::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the filler used for result slides.
    pub fn with_filler(mut self, filler: SlideFiller) -> Self {
        self.filler = filler;
        self
    }

    /// Set the retry policy for template lookups, copies and placeholders.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Lay out `plan` in `deck` and return the final cursor.
    pub fn build<D: TemplateDeck>(&self, deck: &mut D, plan: &ReportPlan) -> Result<usize> {
        if plan.is_empty() {
            return Err(Error::Report("no usable result to lay out".to_string()));
        }

        match plan.flow {
            ReportFlow::Holistic => self.build_holistic(deck, plan),
            ReportFlow::Superpowers => self.build_superpowers(deck, plan),
        }
    }

    fn build_holistic<D: TemplateDeck>(&self, deck: &mut D, plan: &ReportPlan) -> Result<usize> {
        // Copies always land after both templates, so their positions hold.
        let title_template = self.template_at(deck, plan.first_title_page)?;
        let content_template = self.template_at(deck, plan.first_title_page + 1)?;
        let mut cursor = plan.first_title_page + 2;

        for section in &plan.sections {
            let starter = plan.starter(&section.main_title).ok_or_else(|| {
                Error::Report(format!("no subtitle for section '{}'", section.main_title))
            })?;
            let intro = plan
                .intro_for(&section.main_title)
                .map(|text| self.segmenter.segment(&text).join("\n\n"))
                .unwrap_or_default();

            let slide_id = self.retry.run("duplicate_slide", || {
                deck.duplicate_and_place(&title_template, cursor)
            })?;
            for (placeholder, value) in [
                (TITLE_PLACEHOLDER, section.main_title.trim()),
                (SUBTITLE_PLACEHOLDER, starter.subtitle.trim()),
                (INTRO_PLACEHOLDER, intro.as_str()),
            ] {
                self.retry.run("replace_text", || {
                    deck.replace_placeholder(&slide_id, placeholder, value)
                })?;
            }
            log::info!("opened section '{}' on slide {}", section.main_title, slide_id);
            cursor += 1;

            for result in &section.results {
                cursor = self.fill_result(deck, &content_template, cursor, result)?;
            }
        }

        Ok(cursor)
    }

    fn build_superpowers<D: TemplateDeck>(&self, deck: &mut D, plan: &ReportPlan) -> Result<usize> {
        let content_template = self.template_at(deck, plan.first_title_page)?;
        let mut cursor = plan.first_title_page + 1;

        if let Some(section) = plan.sections.first() {
            for result in &section.results {
                cursor = self.fill_result(deck, &content_template, cursor, result)?;
            }
        }

        Ok(cursor)
    }

    fn template_at<D: TemplateDeck>(&self, deck: &mut D, position: usize) -> Result<String> {
        self.retry.run("refresh_slides", || deck.slide_id_at(position))
    }

    fn fill_result<D: TemplateDeck>(
        &self,
        deck: &mut D,
        template: &str,
        cursor: usize,
        result: &ReportResult,
    ) -> Result<usize> {
        let blocs = self.segmenter.segment(&result.content);
        let slide_id = self.retry.run("duplicate_slide", || {
            deck.duplicate_and_place(template, cursor)
        })?;
        log::debug!("result {} cut into {} blocs", result.name, blocs.len());

        self.filler
            .fill(deck, &slide_id, cursor, result.title.trim(), &blocs)
    }
}
