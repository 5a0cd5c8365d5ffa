//! Hierarchical, path-addressed index listing of a snapshot tree.
//!
//! Unscoped calls expand only the roots' direct children; anything deeper
//! is shown as a bounded preview and must be requested by path.

use std::collections::{HashSet, VecDeque};

use snapref_core::Result;
use tracing::debug;

use crate::parser::{NodeId, ParsedNode};
use crate::roles::is_summary_role;
use crate::text::truncate_text;
use crate::tree::SnapshotTree;

/// Text pieces collected per collapsed-subtree summary.
const SUMMARY_ITEMS: usize = 6;
/// Children previewed on an unexpanded node.
const PREVIEW_CHILDREN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Start at this path instead of the roots.
    pub path: Option<String>,
    pub depth: usize,
    pub max_nodes: usize,
    pub text_limit: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            path: None,
            depth: 1,
            max_nodes: 200,
            text_limit: 80,
        }
    }
}

/// `role "text"`, with the text truncated to `text_limit`.
pub fn format_node_label(node: &ParsedNode, text_limit: usize) -> String {
    let hint = truncate_text(&node.text_value(), text_limit);
    if hint.is_empty() {
        node.role.clone()
    } else {
        format!("{} \"{}\"", node.role, hint)
    }
}

/// Breadth-first texts of summary-role nodes in the subtree at `id`
/// (itself included), de-duplicated case-insensitively.
pub fn collect_summary(tree: &SnapshotTree, id: NodeId, max_items: usize, text_limit: usize) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut summary: Vec<String> = Vec::new();
    let mut queue: VecDeque<NodeId> = VecDeque::from([id]);

    while summary.len() < max_items {
        let Some(current) = queue.pop_front() else {
            break;
        };
        let node = tree.node(current);
        if is_summary_role(&node.role) {
            let hint = truncate_text(&node.text_value(), text_limit);
            if !hint.is_empty() && seen.insert(hint.to_lowercase()) {
                summary.push(hint);
            }
        }
        queue.extend(node.children.iter().copied());
    }

    summary.join(" | ")
}

fn format_preview_item(tree: &SnapshotTree, node: &ParsedNode, text_limit: usize) -> String {
    let label = format_node_label(node, text_limit);
    let summary = collect_summary(tree, node.id, SUMMARY_ITEMS, text_limit);
    if summary.is_empty() {
        format!("{} [path={}]", label, node.path)
    } else {
        format!("{} [path={}] :: {}", label, node.path, summary)
    }
}

struct IndexWriter<'a> {
    tree: &'a SnapshotTree,
    options: &'a IndexOptions,
    scoped: bool,
    emitted: usize,
    lines: Vec<String>,
}

impl IndexWriter<'_> {
    fn render(&mut self, id: NodeId, current_depth: usize, indent: &str) {
        if self.emitted >= self.options.max_nodes {
            return;
        }
        self.emitted += 1;

        let node = self.tree.node(id);
        let mut line = format!(
            "{}- {} [path={}]",
            indent,
            format_node_label(node, self.options.text_limit),
            node.path
        );

        let expand = current_depth < self.options.depth && (self.scoped || current_depth == 0);
        if !expand && !node.children.is_empty() {
            let mut previews: Vec<String> = node
                .children
                .iter()
                .take(PREVIEW_CHILDREN)
                .map(|&child| format_preview_item(self.tree, self.tree.node(child), self.options.text_limit))
                .collect();
            let extra = node.children.len().saturating_sub(PREVIEW_CHILDREN);
            if extra > 0 {
                previews.push(format!("+{} more", extra));
            }
            line.push_str(&format!(" (grandchildren: {})", previews.join("; ")));
        }
        self.lines.push(line);

        if expand {
            let child_indent = format!("{}  ", indent);
            for &child in &node.children {
                self.render(child, current_depth + 1, &child_indent);
            }
        }
    }
}

/// Render the index listing for `tree`.
///
/// Fails with `PathNotFound` when `options.path` is not in the tree.
pub fn build_index(tree: &SnapshotTree, options: &IndexOptions) -> Result<String> {
    if tree.is_empty() {
        return Ok("(empty)".to_string());
    }

    let starts: Vec<NodeId> = match options.path.as_deref() {
        Some(path) => vec![tree.require(path)?.id],
        None => tree.roots().to_vec(),
    };

    let mut writer = IndexWriter {
        tree,
        options,
        scoped: options.path.is_some(),
        emitted: 0,
        lines: vec![format!(
            "index (path={}, depth={}, max_nodes={})",
            options.path.as_deref().unwrap_or("root"),
            options.depth,
            options.max_nodes
        )],
    };
    for id in starts {
        writer.render(id, 0, "");
    }

    let emitted = writer.emitted;
    let mut lines = writer.lines;
    if emitted >= options.max_nodes && emitted < tree.len() {
        lines.push(format!("... (truncated: returned {} of {})", emitted, tree.len()));
    }
    debug!(emitted, total = tree.len(), "Built snapshot index");
    Ok(lines.join("\n"))
}

/// Parse `text` and render its index.
pub fn build_snapshot_index(text: &str, options: &IndexOptions) -> Result<String> {
    build_index(&SnapshotTree::parse(text), options)
}
