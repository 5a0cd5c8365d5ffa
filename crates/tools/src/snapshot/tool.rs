//! SnapshotTool: JSON front end over the snapshot crate.

use async_trait::async_trait;
use serde_json::{json, Value};
use snapref_core::{Error, Result};
use snapref_snapshot::multiview::{build_multiview_index, search_multiview, MultiviewData};
use snapref_snapshot::{
    assign_refs, build_snapshot_index, normalize_ref_id, resolve_snapshot_path, search_snapshot, IndexOptions,
    RefTarget, SearchMode, SearchOptions, SnapshotOptions,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::store::RefStore;
use crate::{Tool, ToolContext, ToolSchema};

const ACTIONS: &[&str] = &[
    "snapshot",
    "index",
    "search",
    "resolve_path",
    "resolve_ref",
    "multiview_index",
    "multiview_search",
];

const DEFAULT_PAGE: &str = "default";

pub struct SnapshotTool {
    store: Arc<Mutex<RefStore>>,
}

impl SnapshotTool {
    pub fn new() -> Self {
        Self::with_store(Arc::new(Mutex::new(RefStore::new())))
    }

    /// Share one ref store between several tool instances.
    pub fn with_store(store: Arc<Mutex<RefStore>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<Mutex<RefStore>> {
        self.store.clone()
    }
}

impl Default for SnapshotTool {
    fn default() -> Self {
        Self::new()
    }
}

fn require_str<'a>(params: &'a Value, key: &str, action: &str) -> Result<&'a str> {
    params[key]
        .as_str()
        .ok_or_else(|| Error::Validation(format!("{} requires '{}'", action, key)))
}

fn usize_or(params: &Value, key: &str, default: usize) -> usize {
    params[key].as_u64().map_or(default, |v| v as usize)
}

fn page_of(params: &Value) -> &str {
    params["page"].as_str().unwrap_or(DEFAULT_PAGE)
}

fn target_json(target: &RefTarget) -> Value {
    json!({
        "role": target.role,
        "name": target.name,
        "nth": target.nth,
        "selector": target.selector(),
    })
}

fn search_options(ctx: &ToolContext, params: &Value) -> Result<SearchOptions> {
    let mode = params["mode"].as_str().unwrap_or(&ctx.config.search.mode);
    Ok(SearchOptions {
        mode: SearchMode::parse(mode)?,
        limit: usize_or(params, "limit", ctx.config.search.limit),
        text_limit: usize_or(params, "text_limit", ctx.config.search.text_limit),
    })
}

fn multiview_data(params: &Value) -> Result<MultiviewData> {
    Ok(serde_json::from_value(params["data"].clone())?)
}

#[async_trait]
impl Tool for SnapshotTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "snapshot",
            description: "Work with accessibility snapshots of a page. 'snapshot' annotates the tree with element refs (@e1, @e2...) and stores them per page; 'index' lists the tree level by level with [path=...] addresses; 'search' finds nodes by text or regex; 'resolve_path' turns a path into a role locator; 'resolve_ref' looks up a stored ref. 'multiview_index'/'multiview_search' work on page-extracted sections, blocks, controls and overlays instead of a tree.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ACTIONS,
                        "description": "'snapshot'=annotate refs (requires snapshot); 'index'=hierarchical listing (requires snapshot); 'search'=find nodes (requires snapshot + query); 'resolve_path'=path to locator (requires snapshot + path); 'resolve_ref'=look up a ref from the last snapshot (requires ref); 'multiview_index'=list views (requires data); 'multiview_search'=search views (requires data + query)."
                    },
                    "page": {
                        "type": "string",
                        "description": "Page the refs belong to (default: 'default')"
                    },
                    "snapshot": {
                        "type": "string",
                        "description": "Accessibility snapshot text, one '- role \"name\"' element per line"
                    },
                    "data": {
                        "type": "object",
                        "description": "Page-extracted content: title, lang, sections, blocks, interactions, overlays"
                    },
                    "interactive": {
                        "type": "boolean",
                        "description": "Keep only interactive elements (for 'snapshot')"
                    },
                    "compact": {
                        "type": "boolean",
                        "description": "Drop unnamed structural elements (for 'snapshot')"
                    },
                    "max_depth": {
                        "type": "integer",
                        "description": "Drop elements deeper than this (for 'snapshot')"
                    },
                    "path": {
                        "type": "string",
                        "description": "Start path for 'index' and 'multiview_index', target for 'resolve_path'"
                    },
                    "depth": {
                        "type": "integer",
                        "description": "Levels to expand below the start node"
                    },
                    "max_nodes": {
                        "type": "integer",
                        "description": "Maximum number of index lines"
                    },
                    "text_limit": {
                        "type": "integer",
                        "description": "Maximum characters of text per label or snippet"
                    },
                    "query": {
                        "type": "string",
                        "description": "Search text or regex"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["fuzzy", "regex"],
                        "description": "Search mode (default: fuzzy, case-insensitive substring)"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of search results"
                    },
                    "ref": {
                        "type": "string",
                        "description": "Element ref such as '@e3' or 'e3' (for 'resolve_ref')"
                    },
                    "generation": {
                        "type": "integer",
                        "description": "Snapshot generation the ref came from; rejected if no longer current"
                    }
                },
                "required": ["action"]
            }),
        }
    }

    fn validate(&self, params: &Value) -> Result<()> {
        let action = require_str(params, "action", "snapshot tool")?;
        match action {
            "snapshot" | "index" => {
                require_str(params, "snapshot", action)?;
            }
            "search" => {
                require_str(params, "snapshot", action)?;
                require_str(params, "query", action)?;
            }
            "resolve_path" => {
                require_str(params, "snapshot", action)?;
                require_str(params, "path", action)?;
            }
            "resolve_ref" => {
                require_str(params, "ref", action)?;
            }
            "multiview_index" => {
                if !params["data"].is_object() {
                    return Err(Error::Validation("multiview_index requires 'data'".into()));
                }
            }
            "multiview_search" => {
                if !params["data"].is_object() {
                    return Err(Error::Validation("multiview_search requires 'data'".into()));
                }
                require_str(params, "query", action)?;
            }
            _ => {
                return Err(Error::Validation(format!("Unknown snapshot action: {}", action)));
            }
        }
        if let Some(mode) = params["mode"].as_str() {
            SearchMode::parse(mode)?;
        }
        Ok(())
    }

    async fn execute(&self, ctx: ToolContext, params: Value) -> Result<Value> {
        let action = require_str(&params, "action", "snapshot tool")?;
        debug!(action = %action, "Snapshot tool call");
        match action {
            "snapshot" => self.action_snapshot(&ctx, &params).await,
            "index" => action_index(&ctx, &params),
            "search" => action_search(&ctx, &params),
            "resolve_path" => action_resolve_path(&params),
            "resolve_ref" => self.action_resolve_ref(&params).await,
            "multiview_index" => action_multiview_index(&ctx, &params),
            "multiview_search" => action_multiview_search(&ctx, &params),
            _ => Err(Error::Validation(format!("Unknown snapshot action: {}", action))),
        }
    }
}

impl SnapshotTool {
    async fn action_snapshot(&self, ctx: &ToolContext, params: &Value) -> Result<Value> {
        let text = require_str(params, "snapshot", "snapshot")?;
        let page = page_of(params);
        let defaults = &ctx.config.snapshot;
        let options = SnapshotOptions {
            interactive: params["interactive"].as_bool().unwrap_or(defaults.interactive),
            compact: params["compact"].as_bool().unwrap_or(defaults.compact),
            max_depth: params["max_depth"]
                .as_u64()
                .map(|d| d as usize)
                .or(defaults.max_depth),
        };

        let annotated = assign_refs(text, &options);
        let refs = serde_json::to_value(&annotated.refs)?;
        let ref_count = annotated.refs.len();
        let generation = self.store.lock().await.replace(page, annotated.refs);

        Ok(json!({
            "page": page,
            "tree": annotated.tree,
            "refs": refs,
            "ref_count": ref_count,
            "generation": generation,
        }))
    }

    async fn action_resolve_ref(&self, params: &Value) -> Result<Value> {
        let raw = require_str(params, "ref", "resolve_ref")?;
        let ref_id = normalize_ref_id(raw);
        let page = page_of(params);

        let store = self.store.lock().await;
        let (target, generation) = store.resolve(page, ref_id, params["generation"].as_u64())?;
        let mut out = target_json(target);
        out["ref"] = json!(ref_id);
        out["generation"] = json!(generation);
        Ok(out)
    }
}

fn action_index(ctx: &ToolContext, params: &Value) -> Result<Value> {
    let text = require_str(params, "snapshot", "index")?;
    let defaults = &ctx.config.index;
    let options = IndexOptions {
        path: params["path"].as_str().map(str::to_string),
        depth: usize_or(params, "depth", defaults.depth),
        max_nodes: usize_or(params, "max_nodes", defaults.max_nodes),
        text_limit: usize_or(params, "text_limit", defaults.text_limit),
    };
    let index = build_snapshot_index(text, &options)?;
    Ok(json!({ "index": index }))
}

fn action_search(ctx: &ToolContext, params: &Value) -> Result<Value> {
    let text = require_str(params, "snapshot", "search")?;
    let query = require_str(params, "query", "search")?;
    let results = search_snapshot(text, query, &search_options(ctx, params)?)?;
    Ok(json!({ "results": results }))
}

fn action_resolve_path(params: &Value) -> Result<Value> {
    let text = require_str(params, "snapshot", "resolve_path")?;
    let path = require_str(params, "path", "resolve_path")?;
    let target = resolve_snapshot_path(text, path)?;
    let mut out = target_json(&target);
    out["path"] = json!(path);
    Ok(out)
}

fn action_multiview_index(ctx: &ToolContext, params: &Value) -> Result<Value> {
    let data = multiview_data(params)?;
    let defaults = &ctx.config.multiview;
    let (index, paths) = build_multiview_index(
        &data,
        params["path"].as_str(),
        usize_or(params, "depth", defaults.depth),
        usize_or(params, "max_nodes", defaults.max_nodes),
        usize_or(params, "text_limit", defaults.text_limit),
    )?;
    Ok(json!({ "index": index, "paths": paths }))
}

fn action_multiview_search(ctx: &ToolContext, params: &Value) -> Result<Value> {
    let data = multiview_data(params)?;
    let query = require_str(params, "query", "multiview_search")?;
    let results = search_multiview(&data, query, &search_options(ctx, params)?)?;
    Ok(json!({ "results": results }))
}
