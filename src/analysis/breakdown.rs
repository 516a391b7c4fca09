//! Content breakdown parsing and the non-LLM fallback.

use super::models::ContentBreakdown;
use super::text::{char_len, ends_with_sentence, last_sentence_end, slice_chars};
use crate::error::{Result, VidbriefError};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Minimum characters for a section to count as usable.
const MIN_SECTION_CHARS: usize = 50;

const DEFAULT_INTRODUCTION: &str =
    "The video begins by introducing the main topic and setting the context for the discussion.";
const DEFAULT_MAIN_CONTENT: &str =
    "The video covers the main points and key concepts through detailed discussion and examples.";
const DEFAULT_CONCLUSION: &str =
    "The video concludes by summarizing the key takeaways and final thoughts on the topic.";

/// How a breakdown was recovered from a model reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The reply contained a well-formed JSON object.
    Strict,
    /// Fields were pulled out of malformed JSON one by one.
    Loose,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBreakdown {
    pub breakdown: ContentBreakdown,
    pub strategy: ParseStrategy,
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("fence pattern is valid"))
}

fn field_regexes() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        ["introduction", "main_content", "conclusion"].map(|key| {
            Regex::new(&format!(r#""{}"\s*:\s*"((?:[^"\\]|\\.)*)""#, key))
                .expect("field pattern is valid")
        })
    })
}

/// Remove a surrounding markdown code fence, if any.
fn strip_fences(response: &str) -> &str {
    let trimmed = response.trim();
    match fence_regex().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}

fn parse_strict(text: &str) -> Option<ContentBreakdown> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn parse_loose(text: &str) -> Option<ContentBreakdown> {
    let [intro, main, end] = field_regexes();
    let field = |re: &Regex| -> Option<String> {
        let raw = re.captures(text)?.get(1)?.as_str();
        Some(serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string()))
    };

    Some(ContentBreakdown {
        introduction: field(intro)?,
        main_content: field(main)?,
        conclusion: field(end)?,
    })
}

/// Parse the model's JSON breakdown.
///
/// A strict serde parse of the outermost object is tried first, then a single
/// loose pass that extracts each string field on its own.
pub fn parse_breakdown(response: &str) -> Result<ParsedBreakdown> {
    let text = strip_fences(response);

    if let Some(breakdown) = parse_strict(text) {
        return Ok(ParsedBreakdown {
            breakdown,
            strategy: ParseStrategy::Strict,
        });
    }
    debug!("Strict breakdown parse failed, trying loose extraction");

    if let Some(breakdown) = parse_loose(text) {
        return Ok(ParsedBreakdown {
            breakdown,
            strategy: ParseStrategy::Loose,
        });
    }

    Err(VidbriefError::MalformedResponse(format!(
        "no introduction/main_content/conclusion fields in: {}",
        slice_chars(text, 0, 200)
    )))
}

/// Every section is longer than 50 characters and ends a sentence.
pub fn is_high_quality(breakdown: &ContentBreakdown) -> bool {
    breakdown.sections().iter().all(|(_, text)| {
        char_len(text.trim()) > MIN_SECTION_CHARS && ends_with_sentence(text)
    })
}

/// Trim a prose reply and drop a trailing unfinished sentence.
pub fn finish_prose(reply: &str) -> String {
    let text = reply.trim();
    if ends_with_sentence(text) {
        return text.to_string();
    }
    match last_sentence_end(text) {
        Some(pos) if pos > 0 => slice_chars(text, 0, pos + 1).to_string(),
        _ => text.to_string(),
    }
}

/// End `text` on a sentence: cut back to a late sentence end, or add a period.
fn close_sentence(text: String) -> String {
    if text.is_empty() || ends_with_sentence(&text) {
        return text;
    }
    match last_sentence_end(&text) {
        Some(pos) if pos as f64 > char_len(&text) as f64 * 0.6 => slice_chars(&text, 0, pos + 1).to_string(),
        _ => format!("{}.", text),
    }
}

/// Text of transcript lines, without timestamps, skipping short fragments.
fn spoken_lines<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    lines
        .iter()
        .map(|line| match line.split_once(']') {
            Some((_, rest)) => rest.trim(),
            None => line.trim(),
        })
        .filter(|text| char_len(text) > 10)
        .collect()
}

fn fraction(total: usize, share: f64) -> usize {
    (total as f64 * share) as usize
}

/// Build a breakdown straight from the transcript text.
///
/// Takes the opening lines, a sample of the middle fifth and the closing
/// lines. Sections that come out too short get a generic sentence instead.
pub fn smart_text_extraction(transcript_text: &str) -> ContentBreakdown {
    let lines: Vec<&str> = transcript_text.split('\n').collect();
    let total = lines.len();

    let intro_end = fraction(total, 0.03).max(30).min(total);
    let intro_lines = spoken_lines(&lines[..intro_end]);
    let intro = close_sentence(intro_lines.iter().take(15).copied().collect::<Vec<_>>().join(" "));

    let middle_lines = spoken_lines(&lines[fraction(total, 0.4)..fraction(total, 0.6)]);
    let sample_size = middle_lines.len().min(20);
    let sampled: Vec<&str> = if middle_lines.len() > sample_size {
        let step = middle_lines.len() / sample_size;
        middle_lines.iter().step_by(step).take(sample_size).copied().collect()
    } else {
        middle_lines
    };
    let middle = close_sentence(sampled.join(" "));

    let end_lines = spoken_lines(&lines[fraction(total, 0.97)..]);
    let end = close_sentence(end_lines.iter().take(15).copied().collect::<Vec<_>>().join(" "));

    debug!("Used transcript extraction for content breakdown");

    ContentBreakdown {
        introduction: if char_len(&intro) > 50 { intro } else { DEFAULT_INTRODUCTION.to_string() },
        main_content: if char_len(&middle) > 80 { middle } else { DEFAULT_MAIN_CONTENT.to_string() },
        conclusion: if char_len(&end) > 50 { end } else { DEFAULT_CONCLUSION.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse_inside_fences() {
        let reply = "```json\n{\"introduction\": \"Intro.\", \"main_content\": \"Main.\", \"conclusion\": \"End.\"}\n```";
        let parsed = parse_breakdown(reply).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Strict);
        assert_eq!(parsed.breakdown.introduction, "Intro.");
        assert_eq!(parsed.breakdown.main_content, "Main.");
        assert_eq!(parsed.breakdown.conclusion, "End.");
    }

    #[test]
    fn test_strict_parse_with_surrounding_chatter() {
        let reply = "Sure! {\"introduction\": \"A\", \"main_content\": \"B\", \"conclusion\": \"C\"} Hope this helps.";
        let parsed = parse_breakdown(reply).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Strict);
        assert_eq!(parsed.breakdown.conclusion, "C");
    }

    #[test]
    fn test_loose_parse_recovers_malformed_json() {
        let reply = r#"{"introduction": "Intro text.", "main_content": "Main \"quoted\" text.", "conclusion": "End text.",}"#;
        let parsed = parse_breakdown(reply).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Loose);
        assert_eq!(parsed.breakdown.main_content, "Main \"quoted\" text.");
        assert_eq!(parsed.breakdown.conclusion, "End text.");
    }

    #[test]
    fn test_unparseable_reply_is_malformed() {
        let err = parse_breakdown("I cannot summarize this video.").unwrap_err();
        assert!(matches!(err, VidbriefError::MalformedResponse(_)));

        let missing_field = r#"{"introduction": "Intro.", "main_content": "Main."}"#;
        assert!(matches!(
            parse_breakdown(missing_field),
            Err(VidbriefError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_quality_check() {
        let sentence = "This section describes the video in enough detail to pass the check.";
        let good = ContentBreakdown {
            introduction: sentence.to_string(),
            main_content: sentence.to_string(),
            conclusion: sentence.to_string(),
        };
        assert!(is_high_quality(&good));

        let unfinished = ContentBreakdown {
            conclusion: "This section describes the video in enough detail but stops".to_string(),
            ..good.clone()
        };
        assert!(!is_high_quality(&unfinished));

        let short = ContentBreakdown {
            introduction: "Too short.".to_string(),
            ..good
        };
        assert!(!is_high_quality(&short));
    }

    #[test]
    fn test_finish_prose() {
        assert_eq!(finish_prose("  Complete sentence.  "), "Complete sentence.");
        assert_eq!(finish_prose("First one. Second is cut"), "First one.");
        assert_eq!(finish_prose("no punctuation"), "no punctuation");
    }

    #[test]
    fn test_smart_extraction_uses_transcript() {
        let transcript = (0..40)
            .map(|i| format!("[00:{:02}] This is sentence number {} of the talk.", i, i))
            .collect::<Vec<_>>()
            .join("\n");

        let breakdown = smart_text_extraction(&transcript);
        assert!(breakdown.introduction.starts_with("This is sentence number 0 of the talk."));
        assert!(breakdown.main_content.starts_with("This is sentence number 16 of the talk."));
        assert!(breakdown.conclusion.contains("number 39"));
        assert!(is_high_quality(&breakdown));
    }

    #[test]
    fn test_smart_extraction_defaults_for_empty_transcript() {
        let breakdown = smart_text_extraction("");
        assert_eq!(breakdown.introduction, DEFAULT_INTRODUCTION);
        assert_eq!(breakdown.main_content, DEFAULT_MAIN_CONTENT);
        assert_eq!(breakdown.conclusion, DEFAULT_CONCLUSION);
    }
}
