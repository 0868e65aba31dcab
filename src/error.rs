use thiserror::Error;

/// Panel-wide error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Query execution failed; the previous results stay on screen.
    #[error("Query failed: {0}")]
    Query(String),

    /// Saving or deleting a document failed.
    #[error("Update failed: {0}")]
    Update(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed user input (row limit, page size, filter), rejected before dispatch.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// An edition operation does not apply to the selected node.
    #[error("Edition error: {0}")]
    Edit(String),

    #[error("Start index {index} is out of range for {len} documents")]
    Index { index: usize, len: usize },

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl Error {
    /// Wrap any error raised while loading documents as a query failure.
    pub fn into_query(self) -> Self {
        match self {
            Error::Query(_) | Error::Validation(_) => self,
            other => Error::Query(other.to_string()),
        }
    }

    /// Wrap any error raised while writing a document as an update failure.
    pub fn into_update(self) -> Self {
        match self {
            Error::Update(_) => self,
            other => Error::Update(other.to_string()),
        }
    }
}

/// Convenience Result type using our Error
pub type Result<T> = std::result::Result<T, Error>;
