//! Role classification for accessibility snapshot nodes.

/// Roles a user can act on directly.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "textbox", "checkbox", "radio", "combobox", "listbox",
    "menuitem", "menuitemcheckbox", "menuitemradio", "option", "searchbox",
    "slider", "spinbutton", "switch", "tab", "treeitem",
];

/// Roles that carry content worth a ref when they are named.
pub const CONTENT_ROLES: &[&str] = &[
    "heading", "cell", "gridcell", "columnheader", "rowheader", "listitem",
    "article", "region", "main", "navigation",
];

/// Pure containers (dropped in compact mode when unnamed).
pub const STRUCTURAL_ROLES: &[&str] = &[
    "generic", "group", "list", "table", "row", "rowgroup", "grid", "treegrid",
    "menu", "menubar", "toolbar", "tablist", "tree", "directory", "document",
    "application", "presentation", "none",
];

/// Roles whose text is collected into collapsed-subtree summaries.
pub const SUMMARY_ROLES: &[&str] = &[
    "heading", "button", "link", "textbox", "combobox", "listbox", "checkbox",
    "radio", "menuitem", "tab", "option", "searchbox", "switch",
];

/// The anonymous text-wrapper role.
pub const TEXT_ROLE: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleClass {
    Interactive,
    Content,
    Structural,
    Other,
}

impl RoleClass {
    /// Classify a lowercase role token.
    pub fn of(role: &str) -> Self {
        if INTERACTIVE_ROLES.contains(&role) {
            Self::Interactive
        } else if CONTENT_ROLES.contains(&role) {
            Self::Content
        } else if STRUCTURAL_ROLES.contains(&role) {
            Self::Structural
        } else {
            Self::Other
        }
    }
}

pub fn is_summary_role(role: &str) -> bool {
    SUMMARY_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(RoleClass::of("button"), RoleClass::Interactive);
        assert_eq!(RoleClass::of("menuitemradio"), RoleClass::Interactive);
        assert_eq!(RoleClass::of("heading"), RoleClass::Content);
        assert_eq!(RoleClass::of("navigation"), RoleClass::Content);
        assert_eq!(RoleClass::of("generic"), RoleClass::Structural);
        assert_eq!(RoleClass::of("none"), RoleClass::Structural);
        assert_eq!(RoleClass::of("text"), RoleClass::Other);
        assert_eq!(RoleClass::of("img"), RoleClass::Other);
    }

    #[test]
    fn test_role_sets_are_disjoint() {
        for role in INTERACTIVE_ROLES {
            assert!(!CONTENT_ROLES.contains(role), "{} in two sets", role);
            assert!(!STRUCTURAL_ROLES.contains(role), "{} in two sets", role);
        }
        for role in CONTENT_ROLES {
            assert!(!STRUCTURAL_ROLES.contains(role), "{} in two sets", role);
        }
    }

    #[test]
    fn test_summary_roles() {
        assert!(is_summary_role("heading"));
        assert!(is_summary_role("switch"));
        assert!(!is_summary_role("generic"));
        assert!(!is_summary_role("slider"));
    }
}
