//! Ref annotation: assigns `@eN` references to actionable and content lines.
//!
//! Filtering works line by line on the flat dump. A dropped container's
//! descendants stay in the output at their original indentation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::parser::{parse_element_line, ElementLine};
use crate::roles::{RoleClass, TEXT_ROLE};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Keep only interactive lines.
    pub interactive: bool,
    /// Drop lines deeper than this.
    pub max_depth: Option<usize>,
    /// Drop unnamed structural lines.
    pub compact: bool,
}

/// What a ref points at: enough for the interaction layer to build a
/// role locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefTarget {
    pub role: String,
    pub name: Option<String>,
    /// Zero-based index among targets sharing `(role, name)`; absent when
    /// the pair is unique.
    pub nth: Option<usize>,
}

impl RefTarget {
    /// Role selector in the interaction layer's syntax.
    pub fn selector(&self) -> String {
        build_selector(&self.role, self.name.as_deref())
    }
}

/// Named text wrappers have no ARIA role, so they are located by text.
pub fn build_selector(role: &str, name: Option<&str>) -> String {
    match name {
        Some(name) if role == TEXT_ROLE => format!(
            "getByText(\"{}\", {{ exact: true }})",
            name.replace('"', "\\\"")
        ),
        Some(name) => format!(
            "getByRole(\"{}\", {{ name: \"{}\", exact: true }})",
            role,
            name.replace('"', "\\\"")
        ),
        None => format!("getByRole(\"{}\")", role),
    }
}

/// Snapshot text annotated with `[ref=@eN]` and the ref map it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotatedSnapshot {
    pub tree: String,
    pub refs: BTreeMap<String, RefTarget>,
}

/// Accept `@e3` as well as `e3`.
pub fn normalize_ref_id(raw: &str) -> &str {
    raw.trim().trim_start_matches('@')
}

enum Retained<'a> {
    Passthrough(&'a str),
    Element(ElementLine<'a>, (String, String)),
}

/// Annotate a raw snapshot and build its ref map.
///
/// A line gets a ref when its role is interactive, or a content role with
/// a name. Duplicated `(role, name)` keys among the retained lines get a
/// zero-based `nth` in document order.
pub fn assign_refs(text: &str, options: &SnapshotOptions) -> AnnotatedSnapshot {
    if text.trim().is_empty() {
        return AnnotatedSnapshot {
            tree: "(empty)".to_string(),
            refs: BTreeMap::new(),
        };
    }

    // Pass 1: filter and count keys.
    let mut counts: HashMap<(String, String), usize> = HashMap::new();
    let mut retained: Vec<Retained<'_>> = Vec::new();
    for line in text.lines() {
        let Some(element) = parse_element_line(line) else {
            retained.push(Retained::Passthrough(line));
            continue;
        };
        if options.max_depth.is_some_and(|max| element.depth > max) {
            continue;
        }
        let role = element.role.to_lowercase();
        let class = RoleClass::of(&role);
        if options.interactive && class != RoleClass::Interactive {
            continue;
        }
        if options.compact && class == RoleClass::Structural && element.name.is_none() {
            continue;
        }
        let key = (role, element.name.unwrap_or_default().to_string());
        *counts.entry(key.clone()).or_insert(0) += 1;
        retained.push(Retained::Element(element, key));
    }

    // Pass 2: render and number.
    let mut refs = BTreeMap::new();
    let mut lines = Vec::with_capacity(retained.len());
    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    for entry in retained {
        let (element, key) = match entry {
            Retained::Passthrough(line) => {
                lines.push(line.to_string());
                continue;
            }
            Retained::Element(element, key) => (element, key),
        };

        let mut line = format!("{}{}", element.prefix, element.role);
        if let Some(name) = element.name {
            line.push_str(&format!(" \"{}\"", name));
        }

        let class = RoleClass::of(&key.0);
        let wants_ref = class == RoleClass::Interactive
            || (class == RoleClass::Content && element.name.is_some());
        if wants_ref {
            let ref_id = format!("e{}", refs.len() + 1);
            let nth = if counts.get(&key).copied().unwrap_or(0) > 1 {
                let slot = seen.entry(key.clone()).or_insert(0);
                let nth = *slot;
                *slot += 1;
                Some(nth)
            } else {
                None
            };
            line.push_str(&format!(" [ref=@{}]", ref_id));
            refs.insert(
                ref_id,
                RefTarget {
                    role: key.0,
                    name: element.name.map(str::to_string),
                    nth,
                },
            );
        }

        line.push_str(element.suffix);
        lines.push(line);
    }

    debug!(refs = refs.len(), lines = lines.len(), "Assigned snapshot refs");
    AnnotatedSnapshot {
        tree: lines.join("\n"),
        refs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const PAGE: &str = r#"- banner
  - link "Home"
  - navigation "Main"
    - list
      - listitem
        - link "Docs"
      - listitem
        - link "Docs"
- main
  - heading "Welcome" [level=1]
  - heading [level=2]
  - generic
    - button "Save"
    - button "Save"
    - button "Cancel"
  - textbox "Email": me@example.com
  - link "Terms"
    - /url: /terms"#;

    fn target<'a>(snap: &'a AnnotatedSnapshot, id: &str) -> &'a RefTarget {
        snap.refs.get(id).unwrap()
    }

    #[test]
    fn test_assign_refs_full() {
        let snap = assign_refs(PAGE, &SnapshotOptions::default());
        // link Home, navigation Main, link Docs x2, heading Welcome, button Save x2,
        // button Cancel, textbox Email, link Terms
        assert_eq!(snap.refs.len(), 10);
        assert!(snap.tree.contains(r#"  - link "Home" [ref=@e1]"#));
        assert!(snap.tree.contains(r#"  - navigation "Main" [ref=@e2]"#));
        assert!(snap.tree.contains(r#"  - heading "Welcome" [ref=@e5] [level=1]"#));
        assert!(snap.tree.contains("  - heading [level=2]"));
        assert!(snap.tree.contains(r#"  - textbox "Email" [ref=@e9]: me@example.com"#));
        assert!(snap.tree.contains("    - /url: /terms"));

        assert_eq!(target(&snap, "e1").nth, None);
        assert_eq!(target(&snap, "e3").nth, Some(0));
        assert_eq!(target(&snap, "e4").nth, Some(1));
        assert_eq!(target(&snap, "e6").name.as_deref(), Some("Save"));
        assert_eq!(target(&snap, "e6").nth, Some(0));
        assert_eq!(target(&snap, "e7").nth, Some(1));
        assert_eq!(target(&snap, "e8").nth, None);
    }

    fn assert_dense_nth(snap: &AnnotatedSnapshot) {
        let mut by_key: HashMap<(String, Option<String>), Vec<Option<usize>>> = HashMap::new();
        for target in snap.refs.values() {
            by_key
                .entry((target.role.clone(), target.name.clone()))
                .or_default()
                .push(target.nth);
        }
        for (key, nths) in by_key {
            if nths.len() == 1 {
                assert_eq!(nths[0], None, "unique key {:?} got an nth", key);
                continue;
            }
            let got: HashSet<usize> = nths.iter().map(|n| n.unwrap()).collect();
            let expected: HashSet<usize> = (0..nths.len()).collect();
            assert_eq!(got, expected, "key {:?}", key);
        }
    }

    #[test]
    fn test_nth_values_are_dense_per_key() {
        let variants = [
            SnapshotOptions::default(),
            SnapshotOptions {
                interactive: true,
                ..Default::default()
            },
            SnapshotOptions {
                compact: true,
                ..Default::default()
            },
            SnapshotOptions {
                max_depth: Some(1),
                ..Default::default()
            },
            SnapshotOptions {
                interactive: true,
                compact: true,
                max_depth: Some(2),
            },
        ];
        for options in &variants {
            assert_dense_nth(&assign_refs(PAGE, options));
        }
    }

    #[test]
    fn test_nth_stays_dense_when_filter_drops_a_duplicate() {
        let options = SnapshotOptions {
            max_depth: Some(2),
            ..Default::default()
        };
        let snap = assign_refs(PAGE, &options);
        // Both "Docs" links sit at depth 4 and are dropped. The Save pair survives.
        assert!(snap.refs.values().all(|t| t.name.as_deref() != Some("Docs")));
        assert_dense_nth(&snap);
    }

    #[test]
    fn test_interactive_only_keeps_children_at_original_depth() {
        let options = SnapshotOptions {
            interactive: true,
            ..Default::default()
        };
        let snap = assign_refs(PAGE, &options);
        assert!(!snap.tree.contains("banner"));
        assert!(!snap.tree.contains("heading"));
        assert!(snap.tree.contains(r#"        - link "Docs" [ref=@e2]"#));
        // passthrough lines survive filtering
        assert!(snap.tree.contains("/url: /terms"));
        assert_eq!(snap.refs.len(), 8);
    }

    #[test]
    fn test_compact_drops_unnamed_structure() {
        let options = SnapshotOptions {
            compact: true,
            ..Default::default()
        };
        let snap = assign_refs(PAGE, &options);
        assert!(!snap.tree.contains("- list\n"));
        assert!(!snap.tree.contains("- generic"));
        // banner is not a structural role
        assert!(snap.tree.contains("- banner"));
        assert!(snap.tree.contains("- main"));
        assert!(snap.tree.contains(r#"    - button "Cancel""#));
    }

    #[test]
    fn test_max_depth() {
        let options = SnapshotOptions {
            max_depth: Some(1),
            ..Default::default()
        };
        let snap = assign_refs(PAGE, &options);
        assert!(!snap.tree.contains("Docs"));
        assert!(!snap.tree.contains("Save"));
        assert!(snap.tree.contains("Welcome"));
    }

    #[test]
    fn test_filtering_changes_nth() {
        // the nested duplicate is filtered out, so the first one becomes unique
        let text = "- button \"Go\"\n- group\n  - button \"Go\"";
        let full = assign_refs(text, &SnapshotOptions::default());
        assert_eq!(full.refs["e1"].nth, Some(0));
        let shallow = assign_refs(
            text,
            &SnapshotOptions {
                max_depth: Some(0),
                ..Default::default()
            },
        );
        assert_eq!(shallow.refs["e1"].nth, None);
    }

    #[test]
    fn test_original_role_case_preserved_in_tree() {
        let snap = assign_refs("- Button \"OK\"", &SnapshotOptions::default());
        assert_eq!(snap.tree, r#"- Button "OK" [ref=@e1]"#);
        assert_eq!(snap.refs["e1"].role, "button");
    }

    #[test]
    fn test_empty_input() {
        let snap = assign_refs("", &SnapshotOptions::default());
        assert_eq!(snap.tree, "(empty)");
        assert!(snap.refs.is_empty());
    }

    #[test]
    fn test_selector() {
        let named = RefTarget {
            role: "button".to_string(),
            name: Some("Say \"hi\"".to_string()),
            nth: None,
        };
        assert_eq!(
            named.selector(),
            r#"getByRole("button", { name: "Say \"hi\"", exact: true })"#
        );
        let unnamed = RefTarget {
            role: "textbox".to_string(),
            name: None,
            nth: Some(1),
        };
        assert_eq!(unnamed.selector(), r#"getByRole("textbox")"#);
        let text = RefTarget {
            role: "text".to_string(),
            name: Some("Say \"hi\"".to_string()),
            nth: None,
        };
        assert_eq!(text.selector(), r#"getByText("Say \"hi\"", { exact: true })"#);
    }

    #[test]
    fn test_normalize_ref_id() {
        assert_eq!(normalize_ref_id("@e3"), "e3");
        assert_eq!(normalize_ref_id("e3"), "e3");
        assert_eq!(normalize_ref_id(" @e12 "), "e12");
    }
}
