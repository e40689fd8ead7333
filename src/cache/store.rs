use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::envelope;
use super::types::{CacheKey, SaveOutcome};
use crate::utils::CacheError;

/// Flat directory of write-once cache entries
///
/// Entries live at `<cache_dir>/<program>-<fingerprint>`. An entry is never
/// overwritten, and an entry that cannot be decoded is deleted on load.
#[derive(Debug)]
pub struct CacheStore {
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `cache_dir`; the directory is created on first save
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Generate cache file path for a key
    pub fn cache_path(&self, key: &CacheKey) -> PathBuf {
        self.cache_dir.join(key.file_name())
    }

    /// Create the cache directory if it is missing
    ///
    /// Checked on every save: the directory may be removed out from under a
    /// long-running process (tmp cleaners, manual cleanup).
    fn ensure_dir(&self) -> Result<(), CacheError> {
        if self.cache_dir.is_dir() {
            return Ok(());
        }

        debug!("Creating cache directory {}", self.cache_dir.display());
        fs::create_dir_all(&self.cache_dir).map_err(|e| CacheError::CacheDirCreate {
            path: self.cache_dir.clone(),
            source: e,
        })
    }

    /// Save a payload under `key` unless an entry is already there
    pub fn save<T>(&self, key: &CacheKey, payload: &T) -> Result<SaveOutcome, CacheError>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_dir()?;

        let cache_path = self.cache_path(key);
        if cache_path.exists() {
            debug!("Cache entry {} already exists", cache_path.display());
            return Ok(SaveOutcome::AlreadyCached(cache_path));
        }

        let bytes = envelope::encode(payload)?;

        // create_new: a concurrent writer that got there first wins
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&cache_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Lost race writing {}", cache_path.display());
                return Ok(SaveOutcome::AlreadyCached(cache_path));
            }
            Err(e) => {
                return Err(CacheError::Write {
                    path: cache_path,
                    source: e,
                })
            }
        };

        if let Err(e) = file.write_all(&bytes).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&cache_path);
            return Err(CacheError::Write {
                path: cache_path,
                source: e,
            });
        }

        debug!("Wrote cache entry {} ({} bytes)", cache_path.display(), bytes.len());
        Ok(SaveOutcome::Written(cache_path))
    }

    /// Load the payload stored under `key`
    ///
    /// Returns `None` when there is no entry. An entry that fails to decode
    /// is deleted so the next save starts clean; a read error leaves the
    /// file in place.
    pub fn load<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let cache_path = self.cache_path(key);
        if !cache_path.is_file() {
            debug!("No cache entry at {}", cache_path.display());
            return None;
        }

        self.load_from(&cache_path, fs::read(&cache_path))
    }

    /// Decode the result of reading `cache_path`
    ///
    /// Corrupt data is purged from disk. A failed read is only logged.
    fn load_from<T>(&self, cache_path: &Path, read: io::Result<Vec<u8>>) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match Self::decode_entry(cache_path, read) {
            Ok(payload) => {
                debug!("Cache hit for {}", cache_path.display());
                Some(payload)
            }
            Err(e) if e.is_corruption() => {
                warn!("{}; removing it", e);
                if let Err(remove_err) = fs::remove_file(cache_path) {
                    if remove_err.kind() != io::ErrorKind::NotFound {
                        warn!(
                            "Failed to remove corrupt cache file {}: {}",
                            cache_path.display(),
                            remove_err
                        );
                    }
                }
                None
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn decode_entry<T>(path: &Path, read: io::Result<Vec<u8>>) -> Result<T, CacheError>
    where
        T: DeserializeOwned,
    {
        let bytes = read.map_err(|e| CacheError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        envelope::decode(&bytes).map_err(|e| CacheError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Metadata of the entry for `key`, if it exists
    pub fn entry_metadata(&self, key: &CacheKey) -> Option<fs::Metadata> {
        fs::metadata(self.cache_path(key))
            .ok()
            .filter(|metadata| metadata.is_file())
    }
}
