use thiserror::Error;

/// Errors surfaced by retrieval operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The query string was empty or blank.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("document '{0}' not found")]
    NotFound(String),

    /// The document store failed. Never retried.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        Error::StoreUnavailable(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::StoreUnavailable(format!("corrupt record: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reject queries with no visible characters.
pub(crate) fn ensure_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::InvalidQuery("query is empty".to_string()));
    }
    Ok(())
}
