use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the object cache
///
/// Only the write path surfaces these to callers. `Read` and `Corrupt`
/// are produced while loading and are handled inside the store.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to create cache directory {path}: {source}")]
    CacheDirCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] bincode::Error),

    #[error("Compression error: {0}")]
    Compress(#[source] io::Error),

    #[error("Failed to write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read cache file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt cache file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl CacheError {
    /// Whether the error means the file on disk is unusable and should be purged
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}
