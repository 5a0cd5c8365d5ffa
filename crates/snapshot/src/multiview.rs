//! Multi-view index over page-extracted content.
//!
//! Instead of one accessibility tree the page is summarised as four flat
//! views: heading structure, scored content blocks, interactive controls
//! and overlays. Items are addressed as `v:<view>/<letter><index>`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use snapref_core::{Error, Result};
use tracing::debug;

use crate::query::Matcher;
use crate::search::{search_header, SearchOptions};
use crate::text::{match_snippet, truncate_text};

static VIEW_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v:(structure/s|content/b|interact/i|overlay/o)(\d+)$").expect("view path regex is valid")
});

const MAX_HEADING_LEVEL: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiviewData {
    pub title: String,
    pub lang: String,
    pub sections: Vec<Section>,
    pub blocks: Vec<Block>,
    pub interactions: Vec<Interaction>,
    pub overlays: Vec<Overlay>,
}

impl MultiviewData {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.blocks.is_empty() && self.interactions.is_empty() && self.overlays.is_empty()
    }
}

/// A heading and the text that follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub title: String,
    /// Heading level, 1 to 6. Zero is read as 1.
    pub level: usize,
    pub summary: String,
    pub selector: String,
    pub anchor: String,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            title: String::new(),
            level: 1,
            summary: String::new(),
            selector: String::new(),
            anchor: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    pub text: String,
    pub score: f64,
    pub selector: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    /// Control kind such as `button` or `link`.
    pub kind: String,
    pub label: String,
    pub selector: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overlay {
    pub label: String,
    pub selector: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Structure,
    Content,
    Interact,
    Overlay,
}

impl View {
    pub const ALL: [View; 4] = [View::Structure, View::Content, View::Interact, View::Overlay];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Structure => "structure",
            View::Content => "content",
            View::Interact => "interact",
            View::Overlay => "overlay",
        }
    }

    fn item_path(&self, index: usize) -> String {
        let letter = match self {
            View::Structure => 's',
            View::Content => 'b',
            View::Interact => 'i',
            View::Overlay => 'o',
        };
        format!("v:{}/{}{}", self.as_str(), letter, index)
    }
}

/// A view path split into its view and item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewPath {
    pub view: View,
    pub index: usize,
}

impl ViewPath {
    pub fn parse(path: &str) -> Result<Self> {
        let caps = VIEW_PATH
            .captures(path)
            .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        let view = match &caps[1] {
            "structure/s" => View::Structure,
            "content/b" => View::Content,
            "interact/i" => View::Interact,
            _ => View::Overlay,
        };
        let index = caps[2]
            .parse()
            .map_err(|_| Error::PathNotFound(path.to_string()))?;
        Ok(Self { view, index })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ViewItem {
    view: View,
    path: String,
    label: String,
    summary: String,
    level: usize,
    haystack: String,
}

struct Collected {
    items: Vec<ViewItem>,
    selectors: HashMap<String, String>,
}

impl Collected {
    fn push(&mut self, item: ViewItem, selector: &str) {
        if !selector.is_empty() {
            self.selectors.insert(item.path.clone(), selector.to_string());
        }
        self.items.push(item);
    }
}

/// Indices of `data` to visit in each view, honouring an optional scope.
fn view_indices(data: &MultiviewData, scope: Option<ViewPath>, view: View) -> Result<Vec<usize>> {
    let len = match view {
        View::Structure => data.sections.len(),
        View::Content => data.blocks.len(),
        View::Interact => data.interactions.len(),
        View::Overlay => data.overlays.len(),
    };
    let Some(scope) = scope else {
        return Ok((0..len).collect());
    };
    if scope.view != view {
        return Ok(Vec::new());
    }
    if scope.index >= len {
        return Err(Error::PathNotFound(view.item_path(scope.index)));
    }
    if view != View::Structure {
        return Ok(vec![scope.index]);
    }

    // A section scope also covers the deeper sections that follow it.
    let base = section_level(&data.sections[scope.index]);
    let mut indices = vec![scope.index];
    indices.extend(
        (scope.index + 1..len).take_while(|&idx| section_level(&data.sections[idx]) > base),
    );
    Ok(indices)
}

fn section_level(section: &Section) -> usize {
    section.level.max(1)
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_items(
    data: &MultiviewData,
    scope: Option<ViewPath>,
    depth: usize,
    max_nodes: usize,
    text_limit: usize,
) -> Result<Collected> {
    let max_level = (depth + 1).clamp(1, MAX_HEADING_LEVEL);
    let mut out = Collected {
        items: Vec::new(),
        selectors: HashMap::new(),
    };

    for idx in view_indices(data, scope, View::Structure)?.into_iter().take(max_nodes) {
        let section = &data.sections[idx];
        let level = section_level(section);
        let title = truncate_text(&section.title, text_limit);
        if level > max_level || title.is_empty() {
            continue;
        }
        let summary = truncate_text(&section.summary, text_limit);
        let item = ViewItem {
            view: View::Structure,
            path: View::Structure.item_path(idx),
            haystack: join_nonempty(&[&title, &summary, &section.anchor]),
            label: format!("heading \"{}\"", title),
            summary,
            level,
        };
        out.push(item, &section.selector);
    }

    for idx in view_indices(data, scope, View::Content)?.into_iter().take(max_nodes) {
        let block = &data.blocks[idx];
        let text = truncate_text(&block.text, text_limit);
        if text.is_empty() {
            continue;
        }
        let item = ViewItem {
            view: View::Content,
            path: View::Content.item_path(idx),
            label: format!("block \"{}\"", text),
            summary: String::new(),
            level: 0,
            haystack: text,
        };
        out.push(item, &block.selector);
    }

    for idx in view_indices(data, scope, View::Interact)?.into_iter().take(max_nodes) {
        let control = &data.interactions[idx];
        let label = truncate_text(&control.label, text_limit);
        if label.is_empty() {
            continue;
        }
        let kind = if control.kind.is_empty() { "control" } else { control.kind.as_str() };
        let item = ViewItem {
            view: View::Interact,
            path: View::Interact.item_path(idx),
            haystack: format!("{} {}", kind, label),
            label: format!("{} \"{}\"", kind, label),
            summary: String::new(),
            level: 0,
        };
        out.push(item, &control.selector);
    }

    for idx in view_indices(data, scope, View::Overlay)?.into_iter().take(max_nodes) {
        let overlay = &data.overlays[idx];
        let label = truncate_text(&overlay.label, text_limit);
        if label.is_empty() {
            continue;
        }
        let item = ViewItem {
            view: View::Overlay,
            path: View::Overlay.item_path(idx),
            label: format!("dialog \"{}\"", label),
            summary: String::new(),
            level: 0,
            haystack: label,
        };
        out.push(item, &overlay.selector);
    }

    Ok(out)
}

/// Render the multi-view index and the `path -> selector` map of every
/// listed item that carries a selector.
///
/// A `path` restricts output to that item's view; an unknown path fails
/// with `PathNotFound`.
pub fn build_multiview_index(
    data: &MultiviewData,
    path: Option<&str>,
    depth: usize,
    max_nodes: usize,
    text_limit: usize,
) -> Result<(String, HashMap<String, String>)> {
    let scope = path.map(ViewPath::parse).transpose()?;
    let Collected { items, selectors } = collect_items(data, scope, depth, max_nodes, text_limit)?;
    if items.is_empty() {
        return Ok(("(empty)".to_string(), selectors));
    }

    let mut sections: Vec<String> = Vec::new();
    for view in View::ALL {
        let view_items: Vec<&ViewItem> = items.iter().filter(|item| item.view == view).collect();
        if view_items.is_empty() {
            continue;
        }
        let mut lines = vec![format!(
            "index (view={}, path={}, depth={}, max_nodes={})",
            view.as_str(),
            path.unwrap_or("root"),
            depth,
            max_nodes
        )];
        let min_level = view_items.iter().map(|item| item.level).min().unwrap_or(0);
        for item in view_items {
            let indent = "  ".repeat(item.level - min_level);
            let mut line = format!("{}- {} [path={}]", indent, item.label, item.path);
            if !item.summary.is_empty() {
                line.push_str(&format!(" :: {}", item.summary));
            }
            lines.push(line);
        }
        sections.push(lines.join("\n"));
    }

    debug!(items = items.len(), selectors = selectors.len(), "Built multiview index");
    Ok((sections.join("\n\n"), selectors))
}

/// Search every view. Results are sorted by path and capped at `limit`.
pub fn search_multiview(data: &MultiviewData, query: &str, options: &SearchOptions) -> Result<String> {
    if query.is_empty() || data.is_empty() {
        return Ok("(empty)".to_string());
    }
    let matcher = Matcher::new(query, options.mode)?;
    let Collected { items, .. } = collect_items(
        data,
        None,
        MAX_HEADING_LEVEL,
        options.limit.saturating_mul(10).max(200),
        options.text_limit,
    )?;

    let budget = options.limit.saturating_mul(4);
    let mut hits: Vec<(String, String)> = Vec::new();
    for item in &items {
        if hits.len() >= budget {
            break;
        }
        if item.haystack.is_empty() || !matcher.is_match(&item.haystack) {
            continue;
        }
        let snippet = match_snippet(&item.haystack, &matcher, options.text_limit);
        let label = if !snippet.is_empty() && !item.label.contains(&snippet) {
            format!("{} :: {}", item.label, snippet)
        } else {
            item.label.clone()
        };
        hits.push((item.path.clone(), format!("- {} [path={}]", label, item.path)));
    }
    hits.sort_by(|a, b| a.0.cmp(&b.0));
    hits.dedup_by(|a, b| a.0 == b.0);
    hits.truncate(options.limit);

    debug!(query = %query, hits = hits.len(), "Searched multiview index");
    let header = search_header(query, options.mode, options.limit);
    if hits.is_empty() {
        return Ok(format!("{}\n(empty)", header));
    }
    let mut lines = vec![header];
    lines.extend(hits.into_iter().map(|(_, line)| line));
    Ok(lines.join("\n"))
}
