//! The parsed snapshot arena with its path index.

use std::collections::HashMap;

use snapref_core::{Error, Result};

use crate::parser::{self, NodeId, ParsedNode};
use crate::paths::assign_paths;

/// A parsed snapshot with paths assigned. Built fresh per call and never
/// mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct SnapshotTree {
    nodes: Vec<ParsedNode>,
    roots: Vec<NodeId>,
    path_index: HashMap<String, NodeId>,
}

impl SnapshotTree {
    pub fn parse(text: &str) -> Self {
        let (mut nodes, roots) = parser::parse(text);
        let path_index = assign_paths(&mut nodes, &roots);
        Self {
            nodes,
            roots,
            path_index,
        }
    }

    pub fn nodes(&self) -> &[ParsedNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &ParsedNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.path_index.get(path).copied()
    }

    pub fn require(&self, path: &str) -> Result<&ParsedNode> {
        self.lookup(path)
            .map(|id| &self.nodes[id])
            .ok_or_else(|| Error::PathNotFound(path.to_string()))
    }

    pub fn parent(&self, id: NodeId) -> Option<&ParsedNode> {
        self.nodes[id].parent.map(|p| &self.nodes[p])
    }
}
