//! Maps an index path back to a `(role, name, nth)` locator descriptor.
//!
//! `nth` here is counted over the whole, unfiltered tree. It can differ
//! from the `nth` that ref assignment computes over a filtered rendering.

use snapref_core::{Error, Result};
use tracing::debug;

use crate::parser::NodeId;
use crate::refs::RefTarget;
use crate::roles::TEXT_ROLE;
use crate::tree::SnapshotTree;

/// The node that stands in for `id` when targeting it: `id` itself unless
/// it is an anonymous text wrapper, in which case the closest ancestor that
/// is named or not a text wrapper.
pub fn nearest_nameable_ancestor(tree: &SnapshotTree, id: NodeId) -> Result<NodeId> {
    let node = tree.node(id);
    if !node.is_anonymous_text() {
        return Ok(id);
    }
    let mut current = node.parent;
    while let Some(parent_id) = current {
        let parent = tree.node(parent_id);
        if parent.name.is_some() || parent.role != TEXT_ROLE {
            return Ok(parent_id);
        }
        current = parent.parent;
    }
    Err(Error::Unresolvable(node.path.clone()))
}

/// Resolve `path` to a locator descriptor.
///
/// `nth` counts earlier nodes sharing the exact `(role, name)` pair and is
/// omitted when the pair is unique in the tree. An unnamed target becomes a
/// bare role locator, so it is counted against every node of its role.
pub fn resolve_path(tree: &SnapshotTree, path: &str) -> Result<RefTarget> {
    let requested = tree.require(path)?.id;
    let target = tree.node(nearest_nameable_ancestor(tree, requested)?);

    let mut before = 0usize;
    let mut total = 0usize;
    for candidate in tree.nodes() {
        let same_name = target.name.is_none() || candidate.name == target.name;
        if candidate.role == target.role && same_name {
            total += 1;
            if candidate.id < target.id {
                before += 1;
            }
        }
    }

    if target.id != requested {
        debug!(path = %path, target = %target.path, "Resolved anonymous text to ancestor");
    }
    Ok(RefTarget {
        role: target.role.clone(),
        name: target.name.clone(),
        nth: (total > 1).then_some(before),
    })
}

/// Parse `text` and resolve `path` in it.
pub fn resolve_snapshot_path(text: &str, path: &str) -> Result<RefTarget> {
    resolve_path(&SnapshotTree::parse(text), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{build_index, IndexOptions};

    const BUTTONS: &str = "- heading \"Title\"\n  - button \"Save\"\n  - button \"Save\"";

    #[test]
    fn test_duplicate_buttons() {
        let first = resolve_snapshot_path(BUTTONS, "0/0").unwrap();
        assert_eq!(first.role, "button");
        assert_eq!(first.name.as_deref(), Some("Save"));
        assert_eq!(first.nth, Some(0));

        let second = resolve_snapshot_path(BUTTONS, "0/1").unwrap();
        assert_eq!(second.nth, Some(1));
    }

    #[test]
    fn test_unique_pair_has_no_nth() {
        let heading = resolve_snapshot_path(BUTTONS, "0").unwrap();
        assert_eq!(heading.role, "heading");
        assert_eq!(heading.nth, None);
    }

    #[test]
    fn test_name_comparison_is_exact() {
        let text = "- button \"Save\"\n- button \"Save draft\"\n- button \"save\"";
        for path in ["0", "1", "2"] {
            assert_eq!(resolve_snapshot_path(text, path).unwrap().nth, None);
        }
    }

    #[test]
    fn test_unnamed_target_counts_every_node_of_its_role() {
        let text = "- textbox\n- textbox \"Email\"\n- textbox";
        assert_eq!(resolve_snapshot_path(text, "0").unwrap().nth, Some(0));
        assert_eq!(resolve_snapshot_path(text, "1").unwrap().nth, None);
        let last = resolve_snapshot_path(text, "2").unwrap();
        assert_eq!(last.name, None);
        assert_eq!(last.nth, Some(2));
        assert_eq!(last.selector(), r#"getByRole("textbox")"#);

        let first = resolve_snapshot_path("- textbox\n- textbox \"Email\"", "0").unwrap();
        assert_eq!(first.nth, Some(0));
    }

    #[test]
    fn test_anonymous_text_climbs_to_named_ancestor() {
        let text = "- link \"Docs\"\n  - text\n    - text: Read the docs\n- link \"Docs\"";
        let tree = SnapshotTree::parse(text);
        assert_eq!(nearest_nameable_ancestor(&tree, 2).unwrap(), 0);
        let target = resolve_path(&tree, "0/0/0").unwrap();
        assert_eq!(target.role, "link");
        assert_eq!(target.name.as_deref(), Some("Docs"));
        assert_eq!(target.nth, Some(0));
    }

    #[test]
    fn test_anonymous_text_climbs_to_unnamed_container() {
        let text = "- paragraph\n  - text: hello";
        let target = resolve_snapshot_path(text, "0/0").unwrap();
        assert_eq!(target.role, "paragraph");
        assert_eq!(target.name, None);
        assert_eq!(target.nth, None);
    }

    #[test]
    fn test_named_text_resolves_to_itself() {
        let text = "- generic\n  - text \"Hello\"";
        let target = resolve_snapshot_path(text, "0/0").unwrap();
        assert_eq!(target.role, "text");
        assert_eq!(target.name.as_deref(), Some("Hello"));
        assert_eq!(target.selector(), r#"getByText("Hello", { exact: true })"#);
    }

    #[test]
    fn test_text_chain_without_anchor_is_unresolvable() {
        let text = "- text: top\n  - text: inner";
        let err = resolve_snapshot_path(text, "0/0").unwrap_err();
        assert!(matches!(err, Error::Unresolvable(_)));
        let err = resolve_snapshot_path(text, "0").unwrap_err();
        assert!(matches!(err, Error::Unresolvable(_)));
    }

    #[test]
    fn test_unknown_path() {
        let err = resolve_snapshot_path(BUTTONS, "0/5").unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
        let err = resolve_snapshot_path("", "0").unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
    }

    #[test]
    fn test_every_indexed_path_resolves() {
        let text = r#"- banner
  - link "Home"
  - navigation
    - list
      - listitem
        - link "Docs"
      - listitem
        - link "Docs"
- main
  - text: stray
  - paragraph
    - text: hi
  - button "Go"
    - text: Go"#;
        let tree = SnapshotTree::parse(text);
        let options = IndexOptions {
            path: None,
            depth: usize::MAX,
            max_nodes: usize::MAX,
            text_limit: 80,
        };
        let index = build_index(&tree, &options).unwrap();
        let path_marker = regex::Regex::new(r"\[path=([0-9/]+)\]").unwrap();
        let mut resolved = 0;
        for caps in path_marker.captures_iter(&index) {
            match resolve_path(&tree, &caps[1]) {
                Err(Error::PathNotFound(p)) => panic!("indexed path {} did not resolve", p),
                _ => resolved += 1,
            }
        }
        assert!(resolved >= 3);
    }

    #[test]
    fn test_full_tree_nth_differs_from_filtered_refs() {
        use crate::refs::{assign_refs, SnapshotOptions};
        let text = "- button \"Go\"\n- group\n  - button \"Go\"";
        let shallow = assign_refs(
            text,
            &SnapshotOptions {
                max_depth: Some(0),
                ..Default::default()
            },
        );
        assert_eq!(shallow.refs["e1"].nth, None);
        assert_eq!(resolve_snapshot_path(text, "0").unwrap().nth, Some(0));
    }
}
