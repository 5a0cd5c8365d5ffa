//! Indexing and reference resolution for accessibility snapshots.
//!
//! A snapshot is the indented `- role "name" suffix` text dump of a page's
//! accessibility tree. This crate parses it into a path-addressed tree and
//! offers four views over it: ref-annotated snapshots (`@eN`), a bounded
//! hierarchical index, prefix-pruned search, and path-to-locator resolution.

pub mod index;
pub mod locator;
pub mod multiview;
pub mod parser;
pub mod paths;
pub mod query;
pub mod refs;
pub mod roles;
pub mod search;
pub mod text;
pub mod tree;

pub use index::{build_index, build_snapshot_index, IndexOptions};
pub use locator::{resolve_path, resolve_snapshot_path};
pub use multiview::{build_multiview_index, search_multiview, MultiviewData};
pub use parser::{NodeId, ParsedNode};
pub use query::{Matcher, SearchMode};
pub use refs::{assign_refs, normalize_ref_id, AnnotatedSnapshot, RefTarget, SnapshotOptions};
pub use search::{search, search_snapshot, SearchOptions};
pub use tree::SnapshotTree;
