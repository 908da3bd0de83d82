use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A posting block referenced by the catalog is not resident on local disk.
    #[error("posting block {block} not found at {}", .path.display())]
    MissingBlock { block: String, path: PathBuf },

    /// Fewer bytes than `df * TUPLE_SIZE` came back for a term; the index is corrupt.
    #[error("corrupt posting list for term {term:?}: expected {expected} bytes, read {actual}")]
    CorruptPostings { term: String, expected: usize, actual: usize },

    #[error("fusion got {lists} ranked lists but {weights} weights")]
    WeightMismatch { lists: usize, weights: usize },

    #[error("query exceeded its deadline after {elapsed:?}")]
    Timeout { elapsed: Duration },

    #[error("failed to fetch block {block}: {reason}")]
    Fetch { block: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    pub fn is_missing_block(&self) -> bool {
        matches!(self, SearchError::MissingBlock { .. })
    }
}
