use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::constants::UNKNOWN_PROGRAM_NAME;
use crate::fingerprint::Fingerprint;

/// Key for cache entries
///
/// The same fingerprint under two different programs maps to two files.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize)]
pub struct CacheKey {
    pub program_name: String,
    pub fingerprint: Fingerprint,
}

impl CacheKey {
    pub fn new(identity: Option<&Path>, fingerprint: Fingerprint) -> Self {
        let program_name = identity
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNKNOWN_PROGRAM_NAME.to_string());

        Self {
            program_name,
            fingerprint,
        }
    }

    /// File name of the entry inside the cache directory
    pub fn file_name(&self) -> String {
        format!("{}-{}", self.program_name, self.fingerprint)
    }
}

/// What a call to `save` ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new entry was written
    Written(PathBuf),
    /// An entry already existed for this key and was left untouched
    AlreadyCached(PathBuf),
    /// No usable program identity, nothing was written
    Skipped,
}

/// Snapshot of the cache state for one program
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub identity: Option<PathBuf>,
    pub identity_exists: bool,
    pub file_count: usize,
    pub key: CacheKey,
    pub cache_path: PathBuf,
    pub entry_present: bool,
    pub entry_size: Option<u64>,
    pub entry_modified: Option<DateTime<Utc>>,
}

impl CacheStatus {
    /// Format cache status for display
    pub fn format(&self) -> String {
        let identity = match &self.identity {
            Some(path) if self.identity_exists => path.display().to_string(),
            Some(path) => format!("{} (missing)", path.display()),
            None => "(none)".to_string(),
        };
        let entry = match (self.entry_present, self.entry_size, self.entry_modified) {
            (true, Some(size), Some(modified)) => format!(
                "present ({} bytes, written {})",
                size,
                modified.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            (true, Some(size), None) => format!("present ({} bytes)", size),
            (true, None, _) => "present".to_string(),
            (false, _, _) => "absent".to_string(),
        };

        format!(
            "Cache Status:\n\
            Program: {}\n\
            Hashed paths: {}\n\
            Fingerprint: {}\n\
            Cache file: {}\n\
            Entry: {}",
            identity,
            self.file_count,
            self.key.fingerprint,
            self.cache_path.display(),
            entry
        )
    }
}
