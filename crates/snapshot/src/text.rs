//! Text helpers for labels, summaries and search snippets.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::query::Matcher;

static REF_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[ref=@e\d+\]").expect("ref marker regex is valid")
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("whitespace regex is valid")
});

pub const ELLIPSIS: char = '…';

/// Strip ref markers, collapse whitespace and drop a leading `:` from the
/// free text that trails a role/name on a snapshot line.
pub fn clean_suffix(suffix: &str) -> String {
    if suffix.is_empty() {
        return String::new();
    }
    let without_refs = REF_MARKER.replace_all(suffix, "");
    let collapsed = WHITESPACE_RUN.replace_all(&without_refs, " ");
    let trimmed = collapsed.trim();
    match trimmed.strip_prefix(':') {
        Some(rest) => rest.trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Cut `text` to at most `limit` characters, marking the cut with `…`.
pub fn truncate_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((end, _)) => {
            let mut out = String::with_capacity(end + ELLIPSIS.len_utf8());
            out.push_str(&text[..end]);
            out.push(ELLIPSIS);
            out
        }
    }
}

/// A window of `text` around the first match of `matcher`, at least 8
/// characters (or a third of `limit`) on each side, then truncated to
/// `limit`. Falls back to the truncated text when nothing matches.
pub fn match_snippet(text: &str, matcher: &Matcher, limit: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    let Some(span) = matcher.find(text) else {
        return truncate_text(text, limit);
    };

    let chars: Vec<char> = text.chars().collect();
    let start = text[..span.start].chars().count();
    let end = start + text[span.start..span.end].chars().count();

    let context = (limit / 3).max(8);
    let left = start.saturating_sub(context);
    let right = (end + context).min(chars.len());

    let mut snippet = String::new();
    if left > 0 {
        snippet.push(ELLIPSIS);
    }
    snippet.extend(&chars[left..right]);
    if right < chars.len() {
        snippet.push(ELLIPSIS);
    }
    truncate_text(&snippet, limit)
}
