//! Versioned ref maps, one per page.
//!
//! Each `snapshot` replaces the page's map wholesale under a fresh
//! generation taken from a store-wide counter. A ref presented together
//! with an older generation is rejected instead of silently resolving to
//! whatever now carries that id.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use snapref_core::{Error, Result};
use snapref_snapshot::RefTarget;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefMap {
    pub generation: u64,
    pub refs: BTreeMap<String, RefTarget>,
}

#[derive(Debug, Default)]
pub struct RefStore {
    pages: HashMap<String, RefMap>,
    last_generation: u64,
}

impl RefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `refs` as the page's current map and return its generation.
    pub fn replace(&mut self, page: &str, refs: BTreeMap<String, RefTarget>) -> u64 {
        self.last_generation += 1;
        let generation = self.last_generation;
        info!(page = %page, generation, refs = refs.len(), "Replaced ref map");
        self.pages.insert(page.to_string(), RefMap { generation, refs });
        generation
    }

    pub fn current(&self, page: &str) -> Option<&RefMap> {
        self.pages.get(page)
    }

    /// Look up `ref_id` in the page's current map. When `generation` is
    /// given it must be the current one.
    pub fn resolve(&self, page: &str, ref_id: &str, generation: Option<u64>) -> Result<(&RefTarget, u64)> {
        let map = self
            .pages
            .get(page)
            .ok_or_else(|| Error::RefNotFound(ref_id.to_string()))?;

        if let Some(expected) = generation {
            if expected != map.generation {
                warn!(page = %page, ref_id = %ref_id, expected, current = map.generation, "Stale ref");
                return Err(Error::StaleRef {
                    ref_id: ref_id.to_string(),
                    expected,
                    current: map.generation,
                });
            }
        }

        map.refs
            .get(ref_id)
            .map(|target| (target, map.generation))
            .ok_or_else(|| Error::RefNotFound(ref_id.to_string()))
    }
}
