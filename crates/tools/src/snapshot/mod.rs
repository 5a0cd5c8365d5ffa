//! The `snapshot` tool: ref annotation, indexing, search and locator
//! resolution over accessibility snapshots, plus the per-page ref store.

pub mod store;
pub mod tool;

pub use store::{RefMap, RefStore};
pub use tool::SnapshotTool;
