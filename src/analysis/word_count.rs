//! Summary length selection by video duration.

use crate::config::{AnalysisSettings, WordCountRule, WordRange};
use tracing::debug;

/// Duration thresholds mapped to summary word ranges.
#[derive(Debug, Clone)]
pub struct WordCountRules {
    rules: Vec<WordCountRule>,
    default: WordRange,
    dynamic: bool,
}

impl WordCountRules {
    pub fn new(mut rules: Vec<WordCountRule>, default: WordRange, dynamic: bool) -> Self {
        rules.sort_by(|a, b| a.max_minutes.total_cmp(&b.max_minutes));
        Self {
            rules,
            default,
            dynamic,
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self::new(
            settings.word_count_rules.clone(),
            settings.summary_word_count,
            settings.dynamic_word_count,
        )
    }

    /// Range of the smallest threshold that is at least `duration_minutes`.
    ///
    /// Falls back to the default range when dynamic selection is off or the
    /// video is longer than every threshold.
    pub fn lookup(&self, duration_minutes: f64) -> WordRange {
        if !self.dynamic {
            debug!("Dynamic word count disabled, using default: {}", self.default);
            return self.default;
        }

        match self.rules.iter().find(|r| duration_minutes <= r.max_minutes) {
            Some(rule) => {
                debug!(
                    "Video {:.1} min <= {} min -> {} words",
                    duration_minutes, rule.max_minutes, rule.words
                );
                rule.words
            }
            None => {
                debug!("No matching rule, using default: {}", self.default);
                self.default
            }
        }
    }
}
