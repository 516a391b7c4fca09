//! Prompt templates for vidbrief.
//!
//! Templates use `{{name}}` placeholders. Any of the prompt groups can be
//! replaced by a TOML file of the same name in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub themes: ThemePrompts,
    pub breakdown: BreakdownPrompts,
    /// Single-section prompts used when the JSON breakdown is unusable.
    pub prose: ProsePrompts,
}

/// Prompts for the length-controlled summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
    pub user: String,
    /// Follow-up request when the first summary came back too short.
    pub expand: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert at summarizing video content.
You MUST follow the exact word count requirement. This is absolutely critical.
Count your words carefully before submitting your response."#
                .to_string(),

            user: r#"Analyze this YouTube video transcript and provide a comprehensive summary.

STRICT REQUIREMENT: Your summary MUST be between {{min_words}} and {{max_words}} words.
This is mandatory. If you write less than {{min_words}} words, you FAIL the task.

The summary should:
- Cover all major topics and key points discussed
- Include important examples, data, and insights
- Maintain clear, flowing narrative structure
- Provide meaningful context and details
- Be EXACTLY within the {{min_words}}-{{max_words}} word range

Transcript:
{{transcript}}

Write your comprehensive {{min_words}}-{{max_words}} word summary now:"#
                .to_string(),

            expand: r#"The previous summary was only {{actual_words}} words but MUST be {{min_words}}-{{max_words}} words.

Expand this summary significantly by:
- Adding more specific details and examples
- Including additional context and background
- Elaborating on key points mentioned
- Providing more comprehensive coverage

Original summary:
{{summary}}

Write expanded summary (MUST be {{min_words}}-{{max_words}} words):"#
                .to_string(),
        }
    }
}

/// Prompts for theme identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemePrompts {
    pub system: String,
    pub user: String,
}

impl Default for ThemePrompts {
    fn default() -> Self {
        Self {
            system: "You are an expert at identifying themes and topics in content.".to_string(),

            user: r#"Identify {{num_themes}} main themes or topics discussed in this video transcript.

CRITICAL: Respond with ONLY a comma-separated list of themes.
Do NOT include:
- Introduction phrases like "Here are the themes:"
- Numbering or bullet points
- Explanations or descriptions
- Any other text

Format: Theme1, Theme2, Theme3, Theme4, Theme5

Transcript:
{{transcript}}

Comma-separated themes only:"#
                .to_string(),
        }
    }
}

/// Prompts for the three-part JSON content breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakdownPrompts {
    pub system: String,
    pub user: String,
}

impl Default for BreakdownPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert video analyst. You MUST respond with ONLY a valid JSON object.
Do NOT include markdown, code blocks, or any other text. Just the raw JSON."#
                .to_string(),

            user: r#"Analyze this video transcript and create a breakdown with three sections.

Respond with ONLY this JSON (no markdown, no ```):
{
  "introduction": "2-3 complete sentences describing the video's opening and main topic",
  "main_content": "3-4 complete sentences covering the key points, discussions, and important moments",
  "conclusion": "2-3 complete sentences about the ending, final thoughts, and takeaways"
}

Make sure all sentences are complete and well-written.

Transcript (first part):
{{opening}}

Middle section:
{{middle}}

End section:
{{ending}}

JSON only:"#
                .to_string(),
        }
    }
}

/// Prompts for generating each breakdown section as plain prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProsePrompts {
    pub system: String,
    pub introduction: String,
    pub main_content: String,
    pub conclusion: String,
}

impl Default for ProsePrompts {
    fn default() -> Self {
        Self {
            system: "You are an expert at analyzing video content. Write clear, complete sentences."
                .to_string(),

            introduction: r#"Based on this video opening, write 2-3 complete sentences describing what the video is about.

Opening transcript:
{{excerpt}}

Write 2-3 complete sentences:"#
                .to_string(),

            main_content: r#"Based on this video middle section, write 3-4 complete sentences describing the main topics and discussions.

Middle transcript:
{{excerpt}}

Write 3-4 complete sentences:"#
                .to_string(),

            conclusion: r#"Based on this video ending, write 2-3 complete sentences describing the conclusion and final takeaways.

Ending transcript:
{{excerpt}}

Write 2-3 complete sentences:"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load the default prompts, replacing groups found in `custom_dir`.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        let Some(dir) = custom_dir else {
            return Ok(prompts);
        };
        let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

        let summary_path = custom_path.join("summary.toml");
        if summary_path.exists() {
            prompts.summary = toml::from_str(&std::fs::read_to_string(&summary_path)?)?;
        }

        let themes_path = custom_path.join("themes.toml");
        if themes_path.exists() {
            prompts.themes = toml::from_str(&std::fs::read_to_string(&themes_path)?)?;
        }

        let breakdown_path = custom_path.join("breakdown.toml");
        if breakdown_path.exists() {
            prompts.breakdown = toml::from_str(&std::fs::read_to_string(&breakdown_path)?)?;
        }

        let prose_path = custom_path.join("prose.toml");
        if prose_path.exists() {
            prompts.prose = toml::from_str(&std::fs::read_to_string(&prose_path)?)?;
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<&str, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.summary.user.contains("{{transcript}}"));
        assert!(prompts.breakdown.user.contains("\"main_content\""));
        assert!(!prompts.prose.system.is_empty());
    }

    #[test]
    fn test_render_template() {
        let mut vars = HashMap::new();
        vars.insert("min_words", "100".to_string());
        vars.insert("max_words", "150".to_string());

        let result = Prompts::render("Write {{min_words}}-{{max_words}} words.", &vars);
        assert_eq!(result, "Write 100-150 words.");
    }

    #[test]
    fn test_custom_dir_overrides_group() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("themes.toml"),
            "system = \"Custom system\"\nuser = \"List {{num_themes}} themes\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str()).unwrap();
        assert_eq!(prompts.themes.system, "Custom system");
        assert_eq!(prompts.summary.system, SummaryPrompts::default().system);
    }
}
