//! Indentation-based parsing of accessibility snapshot text.
//!
//! Each element line looks like `  - role "name" suffix`. Indentation is
//! measured in 2-space units and gives the node's depth; the tree is
//! rebuilt with a depth stack into an index-addressed arena.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::roles::TEXT_ROLE;
use crate::text::clean_suffix;

static ELEMENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\s*-\s*)(\w+)(?:\s+"([^"]*)")?(.*)$"#).expect("element line regex is valid")
});

pub type NodeId = usize;

/// One accessibility-tree element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedNode {
    /// Sequential id in parse order (pre-order).
    pub id: NodeId,
    /// Lowercase role token.
    pub role: String,
    /// Quoted accessible name. An empty quoted name is treated as absent.
    pub name: Option<String>,
    /// Everything after the role and name on the source line.
    pub raw_suffix: String,
    pub depth: usize,
    pub children: Vec<NodeId>,
    /// Non-owning back-reference into the arena.
    pub parent: Option<NodeId>,
    /// Slash-delimited sibling indices from a root, e.g. `0/2/1`.
    pub path: String,
}

impl ParsedNode {
    /// The name if present, else the cleaned suffix.
    pub fn text_value(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => clean_suffix(&self.raw_suffix),
        }
    }

    /// An unnamed text wrapper cannot be targeted on its own.
    pub fn is_anonymous_text(&self) -> bool {
        self.role == TEXT_ROLE && self.name.is_none()
    }
}

/// The pieces of one matched element line, borrowed from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementLine<'a> {
    /// Indentation plus the dash, kept verbatim for re-rendering.
    pub prefix: &'a str,
    /// Role token as written (not lowercased).
    pub role: &'a str,
    pub name: Option<&'a str>,
    pub suffix: &'a str,
    pub depth: usize,
}

/// Indentation level of a line in 2-space units.
pub fn indent_level(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count() / 2
}

/// Match one snapshot line. Returns `None` for passthrough lines and for
/// closing markers (role tokens starting with `/`).
pub fn parse_element_line(line: &str) -> Option<ElementLine<'_>> {
    let caps = ELEMENT_LINE.captures(line)?;
    let role = caps.get(2)?.as_str();
    if role.starts_with('/') {
        return None;
    }
    Some(ElementLine {
        prefix: caps.get(1).map_or("", |m| m.as_str()),
        role,
        name: caps.get(3).map(|m| m.as_str()).filter(|n| !n.is_empty()),
        suffix: caps.get(4).map_or("", |m| m.as_str()),
        depth: indent_level(line),
    })
}

/// Parse snapshot text into a node arena and its root ids. Paths are left
/// empty; see [`crate::paths::assign_paths`].
///
/// Empty or unrecognisable input yields an empty tree.
pub fn parse(text: &str) -> (Vec<ParsedNode>, Vec<NodeId>) {
    let mut nodes: Vec<ParsedNode> = Vec::new();
    let mut roots: Vec<NodeId> = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();

    for line in text.lines() {
        let Some(element) = parse_element_line(line) else {
            continue;
        };

        while let Some(&top) = stack.last() {
            if nodes[top].depth >= element.depth {
                stack.pop();
            } else {
                break;
            }
        }

        let id = nodes.len();
        let parent = stack.last().copied();
        match parent {
            Some(parent_id) => nodes[parent_id].children.push(id),
            None => roots.push(id),
        }

        nodes.push(ParsedNode {
            id,
            role: element.role.to_lowercase(),
            name: element.name.map(str::to_string),
            raw_suffix: element.suffix.to_string(),
            depth: element.depth,
            children: Vec::new(),
            parent,
            path: String::new(),
        });
        stack.push(id);
    }

    debug!(nodes = nodes.len(), roots = roots.len(), "Parsed snapshot");
    (nodes, roots)
}
