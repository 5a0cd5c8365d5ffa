//! Substring/regex search over a snapshot tree.
//!
//! Results are ordered shallowest-first and pruned so that only the top
//! match of each matching subtree survives.

use snapref_core::Result;
use tracing::debug;

use crate::paths::{is_within, path_depth};
use crate::query::{Matcher, SearchMode};
use crate::text::{clean_suffix, match_snippet};
use crate::tree::SnapshotTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub limit: usize,
    pub text_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Fuzzy,
            limit: 20,
            text_limit: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: String,
    pub role: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn line(&self) -> String {
        if self.snippet.is_empty() {
            format!("- {} [path={}]", self.role, self.path)
        } else {
            format!("- {} \"{}\" [path={}]", self.role, self.snippet, self.path)
        }
    }
}

pub fn search_header(query: &str, mode: SearchMode, limit: usize) -> String {
    format!("search (query=\"{}\", mode={}, limit={})", query, mode, limit)
}

/// Matching nodes, pruned to one per subtree and capped at `limit`.
pub fn find_matches(tree: &SnapshotTree, matcher: &Matcher, options: &SearchOptions) -> Vec<SearchHit> {
    let budget = options.limit.saturating_mul(4);
    let mut candidates: Vec<SearchHit> = Vec::new();

    for node in tree.nodes() {
        if candidates.len() >= budget {
            break;
        }
        let text_value = node.text_value();
        let suffix = clean_suffix(&node.raw_suffix);
        let haystack = [node.role.as_str(), text_value.as_str(), suffix.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if haystack.is_empty() || !matcher.is_match(&haystack) {
            continue;
        }

        let source = if !text_value.is_empty() {
            &text_value
        } else if !suffix.is_empty() {
            &suffix
        } else {
            &haystack
        };
        candidates.push(SearchHit {
            path: node.path.clone(),
            role: node.role.clone(),
            snippet: match_snippet(source, matcher, options.text_limit),
        });
    }

    candidates.sort_by(|a, b| {
        path_depth(&a.path)
            .cmp(&path_depth(&b.path))
            .then_with(|| a.path.cmp(&b.path))
    });

    let mut kept: Vec<SearchHit> = Vec::new();
    for hit in candidates {
        if kept.len() >= options.limit {
            break;
        }
        if kept.iter().any(|k| is_within(&hit.path, &k.path)) {
            continue;
        }
        kept.push(hit);
    }
    kept
}

/// Render search results over `tree`.
///
/// Fails with `InvalidQuery` on a malformed regex.
pub fn search(tree: &SnapshotTree, query: &str, options: &SearchOptions) -> Result<String> {
    if query.is_empty() {
        return Ok("(empty)".to_string());
    }
    let matcher = Matcher::new(query, options.mode)?;
    if tree.is_empty() {
        return Ok("(empty)".to_string());
    }

    let hits = find_matches(tree, &matcher, options);
    debug!(query = %query, mode = %options.mode, hits = hits.len(), "Searched snapshot");

    let header = search_header(query, options.mode, options.limit);
    if hits.is_empty() {
        return Ok(format!("{}\n(empty)", header));
    }
    let mut lines = vec![header];
    lines.extend(hits.iter().map(SearchHit::line));
    Ok(lines.join("\n"))
}

/// Parse `text` and search it.
pub fn search_snapshot(text: &str, query: &str, options: &SearchOptions) -> Result<String> {
    search(&SnapshotTree::parse(text), query, options)
}
