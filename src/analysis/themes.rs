//! Cleanup of the model's theme list.

use regex::Regex;
use std::sync::OnceLock;

pub const MAX_THEMES: usize = 5;

fn intro_regexes() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(?im)^Here are the.*?:\s*\n*",
            r"(?im)^The themes? (?:are|include):\s*\n*",
            r"(?im)^Themes?:\s*\n*",
            r"(?im)^Main topics?:\s*\n*",
            r"(?m)^\d+\.\s*",
            r"(?m)^-\s*",
            r"(?m)^\*\s*",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("theme cleanup pattern is valid"))
        .collect()
    })
}

fn item_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\d+[.)]\s*|[-*]\s*)").expect("item prefix pattern is valid"))
}

/// Turn a free-form model reply into at most five theme names.
///
/// Lead-in phrases, numbering, bullets and quotes are removed. Items of three
/// characters or fewer, or starting with "here", are dropped.
pub fn clean_themes(response: &str) -> Vec<String> {
    let mut text = response.trim().to_string();
    for re in intro_regexes() {
        text = re.replace_all(&text, "").into_owned();
    }

    let separator = if text.contains(',') { ',' } else { '\n' };

    text.split(separator)
        .map(|item| {
            let item = item_prefix_regex().replace(item.trim(), "");
            item.trim().trim_matches(|c| c == '"' || c == '\'').to_string()
        })
        .filter(|item| item.chars().count() > 3 && !item.to_lowercase().starts_with("here"))
        .take(MAX_THEMES)
        .collect()
}
