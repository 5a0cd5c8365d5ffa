//! Query compilation shared by the tree search and the multi-view search.

use regex::{Regex, RegexBuilder};
use snapref_core::{Error, Result};
use std::fmt;
use std::ops::Range;
use tracing::warn;

/// How a search query is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Case-insensitive substring containment.
    #[default]
    Fuzzy,
    /// Case-insensitive regular expression.
    Regex,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fuzzy => "fuzzy",
            Self::Regex => "regex",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fuzzy" => Ok(Self::Fuzzy),
            "regex" => Ok(Self::Regex),
            other => Err(Error::Validation(format!(
                "unknown search mode \"{}\" (expected \"fuzzy\" or \"regex\")",
                other
            ))),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled query. Fuzzy queries are compiled as escaped literals so both
/// modes report match spans the same way.
#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: Regex,
}

impl Matcher {
    pub fn new(query: &str, mode: SearchMode) -> Result<Self> {
        let source = match mode {
            SearchMode::Fuzzy => regex::escape(query),
            SearchMode::Regex => query.to_string(),
        };
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                warn!(query = %query, error = %e, "Rejected search query");
                Error::InvalidQuery(format!("invalid regex \"{}\": {}", query, e))
            })?;
        Ok(Self { pattern })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Byte range of the first match.
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        self.pattern.find(text).map(|m| m.range())
    }
}
