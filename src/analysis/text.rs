//! Char-boundary safe text helpers.
//!
//! Transcripts are arbitrary UTF-8, so every cut here counts characters
//! rather than bytes.

/// Characters that end a sentence.
pub const SENTENCE_ENDS: [char; 3] = ['.', '!', '?'];

/// First `n` characters of `s`.
pub fn head_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Last `n` characters of `s`.
pub fn tail_chars(s: &str, n: usize) -> &str {
    let total = s.chars().count();
    if total <= n {
        return s;
    }
    slice_chars(s, total - n, total)
}

/// Characters `start..end` of `s`, clamped to its length.
pub fn slice_chars(s: &str, start: usize, end: usize) -> &str {
    let byte_at = |pos: usize| s.char_indices().nth(pos).map(|(i, _)| i).unwrap_or(s.len());
    let start_byte = byte_at(start);
    let end_byte = byte_at(end.max(start));
    &s[start_byte..end_byte]
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

pub fn ends_with_sentence(s: &str) -> bool {
    s.trim_end().ends_with(SENTENCE_ENDS)
}

/// Character position of the last sentence-ending punctuation mark.
pub fn last_sentence_end(s: &str) -> Option<usize> {
    s.chars()
        .enumerate()
        .filter(|(_, c)| SENTENCE_ENDS.contains(c))
        .map(|(i, _)| i)
        .last()
}
