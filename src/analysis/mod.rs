//! LLM-driven transcript analysis.
//!
//! The [`Analyzer`] produces each part of a [`VideoAnalysis`] from a
//! `[MM:SS] text` transcript: a length-controlled summary, sampled key
//! timestamps, themes and a three-part content breakdown.

mod analyzer;
mod breakdown;
mod models;
mod summary;
mod text;
mod themes;
mod timestamps;
mod word_count;

pub use analyzer::Analyzer;
pub use breakdown::{parse_breakdown, smart_text_extraction, ParseStrategy, ParsedBreakdown};
pub use models::{ContentBreakdown, KeyTimestamp, VideoAnalysis};
pub use summary::trim_summary;
pub use themes::clean_themes;
pub use timestamps::extract_timestamps;
pub use word_count::WordCountRules;
