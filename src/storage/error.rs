use thiserror::Error;

/// Errors produced by the storage layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Creating the directory that holds the database file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record is not valid JSON for its type.
    #[error("Malformed record `{key}`: {source}")]
    Decode {
        key: &'static str,
        source: serde_json::Error,
    },

    #[error("Failed to encode record `{key}`: {source}")]
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
