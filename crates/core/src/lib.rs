//! Core narrative normalization, bloc segmentation, slide filling contracts,
//! and report assembly for personalized slide-deck reports.

pub mod deck;
pub mod error;
pub mod normalize;
pub mod report;
pub mod retry;
pub mod segment;
pub mod styles;
pub mod types;
pub mod wrap;

pub use deck::{
    MemoryDeck, MemorySlide, SlideFiller, SlideProvisioner, SlideRenderer, TemplateDeck,
};
pub use error::{Error, Result};
pub use normalize::NarrativeNormalizer;
pub use report::{
    client_ready, ClientRecord, ReportBuilder, ReportConfig, ReportFlow, ReportPlan,
    ReportResult, ReportSection,
};
pub use retry::RetryPolicy;
pub use segment::{segment, Bloc, BlocSegmenter};
pub use styles::{parse_inline_styles, tidy_bloc, StyledText};
pub use types::{ElementKind, LayoutLimits, OverflowPolicy};
