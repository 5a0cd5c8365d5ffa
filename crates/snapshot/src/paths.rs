//! Stable tree-order path assignment.

use std::collections::HashMap;

use crate::parser::{NodeId, ParsedNode};

/// Give every node a path of sibling indices from its root and return the
/// path lookup. Roots get their root index; each child appends its own
/// sibling index to its parent's path.
pub fn assign_paths(nodes: &mut [ParsedNode], roots: &[NodeId]) -> HashMap<String, NodeId> {
    let mut path_index = HashMap::with_capacity(nodes.len());
    let mut pending: Vec<(NodeId, String)> = roots
        .iter()
        .enumerate()
        .rev()
        .map(|(idx, &id)| (id, idx.to_string()))
        .collect();

    while let Some((id, path)) = pending.pop() {
        for (idx, &child) in nodes[id].children.iter().enumerate().rev() {
            pending.push((child, format!("{}/{}", path, idx)));
        }
        path_index.insert(path.clone(), id);
        nodes[id].path = path;
    }

    path_index
}

/// Number of segments below the root segment.
pub fn path_depth(path: &str) -> usize {
    path.matches('/').count()
}

/// True when `path` equals `ancestor` or lies in its subtree.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    match path.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_assign_paths() {
        let (mut nodes, roots) = parse("- a\n  - b\n  - c\n    - d\n- e");
        let index = assign_paths(&mut nodes, &roots);
        let paths: Vec<&str> = nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["0", "0/0", "0/1", "0/1/0", "1"]);
        assert_eq!(index.len(), 5);
        assert_eq!(index["0/1/0"], 3);
        assert_eq!(index["1"], 4);
    }

    #[test]
    fn test_path_depth() {
        assert_eq!(path_depth("3"), 0);
        assert_eq!(path_depth("0/2/1"), 2);
    }

    #[test]
    fn test_is_within_is_segment_aligned() {
        assert!(is_within("0/1", "0/1"));
        assert!(is_within("0/1/4", "0/1"));
        assert!(!is_within("0/10", "0/1"));
        assert!(!is_within("0", "0/1"));
    }
}
