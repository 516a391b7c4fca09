//! Analysis steps that call the LLM.

use super::breakdown::{finish_prose, is_high_quality, parse_breakdown, smart_text_extraction, ParseStrategy};
use super::models::{ContentBreakdown, KeyTimestamp};
use super::summary::{needs_expansion, trim_summary};
use super::text::{char_len, head_chars, slice_chars, tail_chars, word_count};
use super::themes::clean_themes;
use super::timestamps::extract_timestamps;
use super::word_count::WordCountRules;
use crate::config::{AnalysisSettings, Prompts, WordRange};
use crate::error::{Result, VidbriefError};
use crate::llm::LlmClient;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Transcript characters shown to the breakdown prompt from each part.
const BREAKDOWN_OPENING_CHARS: usize = 5000;
const BREAKDOWN_MIDDLE_CHARS: usize = 3000;
const BREAKDOWN_ENDING_CHARS: usize = 3000;

/// Transcript characters shown to each prose prompt.
const PROSE_EDGE_CHARS: usize = 3000;
const PROSE_MIDDLE_CHARS: usize = 4000;

/// Runs the analysis prompts against an LLM.
pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
    settings: AnalysisSettings,
    word_counts: WordCountRules,
    prompts: Prompts,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>, settings: AnalysisSettings) -> Self {
        Self {
            llm,
            word_counts: WordCountRules::from_settings(&settings),
            settings,
            prompts: Prompts::default(),
        }
    }

    /// Use custom prompt templates.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Summary length target for a video of `duration_minutes`.
    pub fn target_word_count(&self, duration_minutes: f64) -> WordRange {
        self.word_counts.lookup(duration_minutes)
    }

    fn capped<'a>(&self, transcript_text: &'a str) -> &'a str {
        head_chars(transcript_text, self.settings.max_transcript_length)
    }

    /// Generate a summary within `range` words.
    ///
    /// One expansion request is made when the first reply is far too short;
    /// an overlong reply is trimmed locally.
    #[instrument(skip_all, fields(range = %range))]
    pub async fn generate_summary(&self, transcript_text: &str, range: WordRange) -> Result<String> {
        let system = &self.prompts.summary.system;

        let mut vars = HashMap::new();
        vars.insert("min_words", range.min.to_string());
        vars.insert("max_words", range.max.to_string());
        vars.insert("transcript", self.capped(transcript_text).to_string());

        let mut summary = self
            .llm
            .generate(&Prompts::render(&self.prompts.summary.user, &vars), system)
            .await?;
        let mut actual = word_count(&summary);
        debug!("Initial summary: {} words", actual);

        if needs_expansion(actual, range) {
            debug!("Summary too short ({}/{} min), requesting expansion", actual, range.min);
            vars.insert("actual_words", actual.to_string());
            vars.insert("summary", summary.clone());

            match self
                .llm
                .generate(&Prompts::render(&self.prompts.summary.expand, &vars), system)
                .await
            {
                Ok(expanded) => {
                    summary = expanded;
                    actual = word_count(&summary);
                    debug!("After expansion: {} words", actual);
                }
                Err(e) => warn!("Expansion failed, keeping original summary: {}", e),
            }
        }

        let summary = trim_summary(
            summary.trim(),
            range,
            self.settings.trim_threshold,
            self.settings.min_retention,
        );
        info!("Final summary: {} words (target {})", word_count(&summary), range);
        Ok(summary)
    }

    pub fn extract_timestamps(&self, transcript_text: &str) -> Vec<KeyTimestamp> {
        extract_timestamps(transcript_text)
    }

    #[instrument(skip_all)]
    pub async fn identify_themes(&self, transcript_text: &str) -> Result<Vec<String>> {
        let mut vars = HashMap::new();
        vars.insert("num_themes", self.settings.num_themes.clone());
        vars.insert("transcript", self.capped(transcript_text).to_string());

        let reply = self
            .llm
            .generate(
                &Prompts::render(&self.prompts.themes.user, &vars),
                &self.prompts.themes.system,
            )
            .await?;

        let themes = clean_themes(&reply);
        debug!("Identified {} themes: {:?}", themes.len(), themes);
        Ok(themes)
    }

    /// Build the introduction / main content / conclusion breakdown.
    ///
    /// Degrades from the JSON reply to per-section prose prompts, and from
    /// those to text taken straight from the transcript, so this never fails.
    #[instrument(skip_all)]
    pub async fn create_content_breakdown(&self, transcript_text: &str) -> ContentBreakdown {
        let len = char_len(transcript_text);
        let mut vars = HashMap::new();
        vars.insert("opening", head_chars(transcript_text, BREAKDOWN_OPENING_CHARS).to_string());
        vars.insert(
            "middle",
            slice_chars(transcript_text, len / 2, len / 2 + BREAKDOWN_MIDDLE_CHARS).to_string(),
        );
        vars.insert("ending", tail_chars(transcript_text, BREAKDOWN_ENDING_CHARS).to_string());

        let reply = self
            .llm
            .generate(
                &Prompts::render(&self.prompts.breakdown.user, &vars),
                &self.prompts.breakdown.system,
            )
            .await;

        match reply.and_then(|r| parse_breakdown(&r)) {
            Ok(parsed) if is_high_quality(&parsed.breakdown) => {
                if parsed.strategy == ParseStrategy::Loose {
                    info!("Content breakdown recovered from malformed JSON");
                }
                return parsed.breakdown;
            }
            Ok(_) => debug!("Breakdown parsed but content quality low, trying prose"),
            Err(e) => debug!("Breakdown unusable ({}), trying prose", e),
        }

        match self.prose_breakdown(transcript_text).await {
            Ok(breakdown) => breakdown,
            Err(e) => {
                debug!("Prose generation failed ({}), extracting from transcript", e);
                smart_text_extraction(transcript_text)
            }
        }
    }

    /// Ask for each section separately as plain sentences.
    async fn prose_breakdown(&self, transcript_text: &str) -> Result<ContentBreakdown> {
        let len = char_len(transcript_text);
        let system = &self.prompts.prose.system;
        let prose = &self.prompts.prose;

        let excerpts = [
            (&prose.introduction, head_chars(transcript_text, PROSE_EDGE_CHARS)),
            (
                &prose.main_content,
                head_chars(slice_chars(transcript_text, len / 3, 2 * len / 3), PROSE_MIDDLE_CHARS),
            ),
            (&prose.conclusion, tail_chars(transcript_text, PROSE_EDGE_CHARS)),
        ];

        let mut sections = Vec::with_capacity(excerpts.len());
        for (template, excerpt) in excerpts {
            let mut vars = HashMap::new();
            vars.insert("excerpt", excerpt.to_string());
            let reply = self.llm.generate(&Prompts::render(template, &vars), system).await?;
            sections.push(finish_prose(&reply));
        }

        let [introduction, main_content, conclusion]: [String; 3] = sections
            .try_into()
            .map_err(|_| VidbriefError::Llm("Incomplete prose breakdown".to_string()))?;

        if char_len(&introduction) < 30 || char_len(&main_content) < 50 || char_len(&conclusion) < 30 {
            return Err(VidbriefError::Llm("Generated content too short".to_string()));
        }

        Ok(ContentBreakdown {
            introduction,
            main_content,
            conclusion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order and records every prompt.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn prompt(&self, idx: usize) -> String {
            self.prompts.lock().unwrap()[idx].clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn generate(&self, prompt: &str, _system_prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(VidbriefError::Llm("no scripted reply".to_string())))
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    fn analyzer(llm: Arc<ScriptedLlm>) -> Analyzer {
        Analyzer::new(llm, AnalysisSettings::default())
    }

    const GOOD_SECTION: &str = "This section describes the video in enough detail to pass the check.";

    #[tokio::test]
    async fn test_summary_within_range_single_call() {
        let llm = ScriptedLlm::new(vec![Ok(words(120))]);
        let summary = analyzer(llm.clone())
            .generate_summary("[00:00] hello", WordRange::new(100, 150))
            .await
            .unwrap();

        assert_eq!(word_count(&summary), 120);
        assert_eq!(llm.calls(), 1);
        assert!(llm.prompt(0).contains("between 100 and 150 words"));
    }

    #[tokio::test]
    async fn test_short_summary_is_expanded_once() {
        let llm = ScriptedLlm::new(vec![Ok(words(10)), Ok(words(110))]);
        let summary = analyzer(llm.clone())
            .generate_summary("[00:00] hello", WordRange::new(100, 150))
            .await
            .unwrap();

        assert_eq!(word_count(&summary), 110);
        assert_eq!(llm.calls(), 2);
        assert!(llm.prompt(1).contains("only 10 words"));
    }

    #[tokio::test]
    async fn test_failed_expansion_keeps_original() {
        let llm = ScriptedLlm::new(vec![
            Ok(words(10)),
            Err(VidbriefError::Llm("rate limited".to_string())),
        ]);
        let summary = analyzer(llm)
            .generate_summary("[00:00] hello", WordRange::new(100, 150))
            .await
            .unwrap();

        assert_eq!(summary, words(10));
    }

    #[tokio::test]
    async fn test_long_summary_is_trimmed() {
        let llm = ScriptedLlm::new(vec![Ok(words(300))]);
        let summary = analyzer(llm)
            .generate_summary("[00:00] hello", WordRange::new(100, 150))
            .await
            .unwrap();

        assert_eq!(word_count(&summary), 150);
        assert!(summary.ends_with("word149..."));
    }

    #[tokio::test]
    async fn test_transcript_capped_in_prompt() {
        let llm = ScriptedLlm::new(vec![Ok(words(120))]);
        let settings = AnalysisSettings {
            max_transcript_length: 10,
            ..Default::default()
        };
        let transcript = format!("{}TAIL_MARKER", "a".repeat(10));

        Analyzer::new(llm.clone(), settings)
            .generate_summary(&transcript, WordRange::new(100, 150))
            .await
            .unwrap();

        assert!(!llm.prompt(0).contains("TAIL_MARKER"));
    }

    #[tokio::test]
    async fn test_summary_error_propagates() {
        let llm = ScriptedLlm::new(vec![Err(VidbriefError::Llm("offline".to_string()))]);
        let result = analyzer(llm)
            .generate_summary("[00:00] hello", WordRange::new(100, 150))
            .await;
        assert!(matches!(result, Err(VidbriefError::Llm(_))));
    }

    #[tokio::test]
    async fn test_identify_themes() {
        let llm = ScriptedLlm::new(vec![Ok("Here are the themes: Ownership, Borrowing, Async".to_string())]);
        let themes = analyzer(llm.clone()).identify_themes("[00:00] hello").await.unwrap();

        assert_eq!(themes, vec!["Ownership", "Borrowing", "Async"]);
        assert!(llm.prompt(0).contains("Identify 3-5 main themes"));
    }

    #[tokio::test]
    async fn test_breakdown_from_json() {
        let json = serde_json::json!({
            "introduction": GOOD_SECTION,
            "main_content": GOOD_SECTION,
            "conclusion": GOOD_SECTION,
        })
        .to_string();
        let llm = ScriptedLlm::new(vec![Ok(json)]);

        let breakdown = analyzer(llm.clone()).create_content_breakdown("[00:00] hello").await;
        assert_eq!(breakdown.introduction, GOOD_SECTION);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_low_quality_json_falls_back_to_prose() {
        let json = r#"{"introduction": "Short", "main_content": "Short", "conclusion": "Short"}"#;
        let llm = ScriptedLlm::new(vec![
            Ok(json.to_string()),
            Ok(format!("{} Trailing fragment", GOOD_SECTION)),
            Ok(GOOD_SECTION.to_string()),
            Ok(GOOD_SECTION.to_string()),
        ]);

        let breakdown = analyzer(llm.clone()).create_content_breakdown("[00:00] hello").await;
        assert_eq!(breakdown.introduction, GOOD_SECTION);
        assert_eq!(breakdown.conclusion, GOOD_SECTION);
        assert_eq!(llm.calls(), 4);
    }

    #[tokio::test]
    async fn test_everything_failing_extracts_from_transcript() {
        let llm = ScriptedLlm::new(vec![Ok("not json at all".to_string())]);
        let transcript = (0..40)
            .map(|i| format!("[00:{:02}] This is sentence number {} of the talk.", i, i))
            .collect::<Vec<_>>()
            .join("\n");

        let breakdown = analyzer(llm.clone()).create_content_breakdown(&transcript).await;
        assert!(breakdown.introduction.starts_with("This is sentence number 0"));
        assert_eq!(llm.calls(), 2);
    }

    #[test]
    fn test_target_word_count() {
        let analyzer = analyzer(ScriptedLlm::new(Vec::new()));
        assert_eq!(analyzer.target_word_count(4.5), WordRange::new(100, 150));
        assert_eq!(analyzer.target_word_count(25.0), WordRange::new(400, 500));
    }
}
