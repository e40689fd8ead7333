use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::store::CacheStore;
use super::types::{CacheKey, CacheStatus, SaveOutcome};
use crate::app::Config;
use crate::fingerprint::{expand_paths, ExpandedFileSet, Fingerprint};
use crate::program::ProgramSource;
use crate::utils::CacheError;

/// Object cache keyed on a program and the source files it depends on
///
/// Ties a `ProgramSource` to a `CacheStore`. Every call recomputes the
/// fingerprint, so edits to the hashed tree are picked up immediately.
#[derive(Debug)]
pub struct ObjectCache<P: ProgramSource> {
    program: P,
    store: CacheStore,
    source_extension: String,
}

impl<P: ProgramSource> ObjectCache<P> {
    /// Create a cache for `program` using the configured directory and extension
    pub fn new(program: P, config: &Config) -> Self {
        Self::with_store(
            program,
            CacheStore::new(config.cache_dir.clone()),
            config.source_extension.clone(),
        )
    }

    pub fn with_store(program: P, store: CacheStore, source_extension: impl Into<String>) -> Self {
        Self {
            program,
            store,
            source_extension: source_extension.into(),
        }
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Expand the program's hashed paths into the full file set
    ///
    /// Relative paths resolve against the directory holding the program's
    /// main file; without an identity they resolve against the current
    /// directory.
    pub fn expanded_files(&self) -> ExpandedFileSet {
        let identity = self.program.identity();
        let base_dir = identity.as_deref().and_then(Path::parent);
        expand_paths(base_dir, self.program.paths_to_hash(), &self.source_extension)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.expanded_files().fingerprint()
    }

    pub fn cache_key(&self) -> CacheKey {
        self.key_for(self.fingerprint())
    }

    /// Path the entry for the current source state lives at
    pub fn cache_path(&self) -> PathBuf {
        self.store.cache_path(&self.cache_key())
    }

    fn key_for(&self, fingerprint: Fingerprint) -> CacheKey {
        CacheKey::new(self.program.identity().as_deref(), fingerprint)
    }

    /// Save a payload for the current source state
    ///
    /// Refuses (with a warning) when the program identity cannot be found,
    /// since unrelated callers would otherwise share one key. Never
    /// replaces an existing entry.
    pub fn save<T>(&self, payload: &T) -> Result<SaveOutcome, CacheError>
    where
        T: Serialize + ?Sized,
    {
        if !self.program.identity_exists() {
            warn!("Refusing to cache: cannot find the main program file");
            return Ok(SaveOutcome::Skipped);
        }

        let key = self.cache_key();
        self.store.save(&key, payload)
    }

    /// Load the payload for the current source state, if there is one
    pub fn load<T>(&self) -> Option<T>
    where
        T: DeserializeOwned,
    {
        if !self.program.identity_exists() {
            debug!("No program identity, skipping cache lookup");
            return None;
        }

        self.store.load(&self.cache_key())
    }

    /// Describe the cache state without modifying anything
    pub fn status(&self) -> CacheStatus {
        let files = self.expanded_files();
        let key = self.key_for(files.fingerprint());
        let cache_path = self.store.cache_path(&key);
        let metadata = self.store.entry_metadata(&key);

        CacheStatus {
            identity: self.program.identity(),
            identity_exists: self.program.identity_exists(),
            file_count: files.len(),
            entry_present: metadata.is_some(),
            entry_size: metadata.as_ref().map(|m| m.len()),
            entry_modified: metadata
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
            key,
            cache_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::compute_fingerprint;
    use crate::program::{MockProgramSource, Program};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    type Payload = (i64, String, f64);

    /// Lay out `<tmp>/bin/myprog` next to `<tmp>/bin/pluginsA/{x.py,sub/y.py}`
    fn scenario() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let bin = temp_dir.path().join("bin");
        let plugins = bin.join("pluginsA");
        fs::create_dir_all(plugins.join("sub")).unwrap();
        fs::write(bin.join("myprog"), "#!/usr/bin/env python\n").unwrap();
        fs::write(plugins.join("x.py"), "").unwrap();
        fs::write(plugins.join("sub").join("y.py"), "").unwrap();
        let main_file = bin.join("myprog");
        (temp_dir, main_file)
    }

    fn open_cache(temp_dir: &TempDir, main_file: &Path) -> ObjectCache<Program> {
        let program = Program::new(main_file).hash_path("pluginsA");
        ObjectCache::with_store(program, CacheStore::new(temp_dir.path().join("cache")), "py")
    }

    #[test]
    fn test_scenario_round_trip_across_instances() {
        let (temp_dir, main_file) = scenario();
        let expected_fp =
            compute_fingerprint(["pluginsA", "pluginsA/x.py", "pluginsA/sub/y.py"]);

        let cache = open_cache(&temp_dir, &main_file);
        assert_eq!(cache.fingerprint(), expected_fp);

        let payload: Payload = (1, "two".to_string(), 3.0);
        let outcome = cache.save(&payload).unwrap();
        let expected_path = temp_dir
            .path()
            .join("cache")
            .join(format!("myprog-{}", expected_fp));
        assert_eq!(outcome, SaveOutcome::Written(expected_path.clone()));
        assert!(expected_path.is_file());

        // A fresh instance stands in for a new process
        let reopened = open_cache(&temp_dir, &main_file);
        assert_eq!(reopened.load::<Payload>(), Some(payload));
    }

    #[test]
    fn test_removed_source_invalidates_by_absence() {
        let (temp_dir, main_file) = scenario();
        let cache = open_cache(&temp_dir, &main_file);
        cache.save(&(1i64, "two".to_string(), 3.0f64)).unwrap();
        let old_path = cache.cache_path();

        fs::remove_file(temp_dir.path().join("bin/pluginsA/sub/y.py")).unwrap();

        assert_ne!(cache.cache_path(), old_path);
        assert_eq!(cache.load::<Payload>(), None);
        // The old entry is orphaned, not deleted
        assert!(old_path.exists());
    }

    #[test]
    fn test_paths_resolve_against_program_dir() {
        let (temp_dir, main_file) = scenario();
        let cache = open_cache(&temp_dir, &main_file);

        // The working directory of the test process plays no part
        let files = cache.expanded_files();
        assert!(files.contains("pluginsA/x.py"));
        assert!(files.contains("pluginsA/sub/y.py"));
    }

    #[test]
    fn test_second_save_is_discarded() {
        let (temp_dir, main_file) = scenario();
        let cache = open_cache(&temp_dir, &main_file);
        let first: Payload = (1, "first".to_string(), 1.0);
        let second: Payload = (2, "second".to_string(), 2.0);

        cache.save(&first).unwrap();
        assert!(matches!(
            cache.save(&second).unwrap(),
            SaveOutcome::AlreadyCached(_)
        ));
        assert_eq!(cache.load::<Payload>(), Some(first));
    }

    #[test]
    fn test_corrupt_entry_heals() {
        let (temp_dir, main_file) = scenario();
        let cache = open_cache(&temp_dir, &main_file);
        cache.save(&(1i64, "two".to_string(), 3.0f64)).unwrap();

        let path = cache.cache_path();
        fs::write(&path, b"garbage").unwrap();

        assert_eq!(cache.load::<Payload>(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_no_identity_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("cache");

        let mut program = MockProgramSource::new();
        program.expect_identity_exists().return_const(false);
        program.expect_identity().return_const(None::<PathBuf>);
        program.expect_paths_to_hash().never();

        let cache = ObjectCache::with_store(program, CacheStore::new(&cache_dir), "py");
        assert_eq!(cache.save(&(1i64, "two".to_string(), 3.0f64)).unwrap(), SaveOutcome::Skipped);
        assert_eq!(cache.load::<Payload>(), None);
        assert!(!cache_dir.exists());
    }

    #[test]
    fn test_missing_main_file_refuses_save() {
        let temp_dir = TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("cache");
        let program = Program::new(temp_dir.path().join("gone")).hash_path("lib");

        let cache = ObjectCache::with_store(program, CacheStore::new(&cache_dir), "py");
        assert_eq!(cache.save("payload").unwrap(), SaveOutcome::Skipped);
        assert!(!cache_dir.exists());
    }

    #[test]
    fn test_status_reports_entry() {
        let (temp_dir, main_file) = scenario();
        let cache = open_cache(&temp_dir, &main_file);

        let before = cache.status();
        assert!(before.identity_exists);
        assert_eq!(before.file_count, 3);
        assert!(!before.entry_present);

        cache.save(&(1i64, "two".to_string(), 3.0f64)).unwrap();
        let after = cache.status();
        assert!(after.entry_present);
        assert!(after.entry_size.unwrap() > 0);
        assert_eq!(after.cache_path, cache.cache_path());
        assert!(after.format().contains("present"));
    }

    #[test]
    fn test_new_uses_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            cache_dir: temp_dir.path().join("from-config"),
            source_extension: "rb".to_string(),
        };
        let cache = ObjectCache::new(Program::unidentified(), &config);
        assert_eq!(cache.store().cache_dir(), config.cache_dir.as_path());
        assert!(cache
            .cache_path()
            .starts_with(temp_dir.path().join("from-config")));
    }
}
