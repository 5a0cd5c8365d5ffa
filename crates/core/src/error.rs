use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown path: {0}")]
    PathNotFound(String),

    #[error("Path points at an anonymous text node with no nameable ancestor: {0}")]
    Unresolvable(String),

    #[error("Unknown ref: {0}. Take a snapshot first.")]
    RefNotFound(String),

    #[error("Ref {ref_id} belongs to snapshot generation {expected}, current generation is {current}. Take a new snapshot.")]
    StaleRef {
        ref_id: String,
        expected: u64,
        current: u64,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
