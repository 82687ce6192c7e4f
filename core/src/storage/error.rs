use std::path::PathBuf;

/// Errors raised while reading or writing persisted documents
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("rejected document {path:?}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("no storage directory available")]
    NoStorageDirectory,
}
