use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The program a cache entry belongs to, and what its output depends on
///
/// The cache never decides these itself. Whoever owns the cached data
/// describes the main artifact and the paths that influence it.
#[cfg_attr(test, mockall::automock)]
pub trait ProgramSource {
    /// Absolute path of the main artifact, if one could be resolved
    fn identity(&self) -> Option<PathBuf>;

    /// Whether the identity currently points at a real file
    fn identity_exists(&self) -> bool {
        self.identity().map_or(false, |path| path.is_file())
    }

    /// Paths whose state should influence the fingerprint
    fn paths_to_hash(&self) -> BTreeSet<PathBuf>;
}

/// Stock `ProgramSource` built from an explicit main file and path list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    main_file: Option<PathBuf>,
    hashed_paths: BTreeSet<PathBuf>,
}

impl Program {
    /// Program identified by its main file
    pub fn new(main_file: impl Into<PathBuf>) -> Self {
        Self {
            main_file: Some(absolutize(main_file.into())),
            hashed_paths: BTreeSet::new(),
        }
    }

    /// Program with no known identity; saves are refused and loads miss
    pub fn unidentified() -> Self {
        Self::default()
    }

    /// Resolve a program by name
    ///
    /// Anything containing a path separator is treated as a path. Bare
    /// names are looked up on `PATH`; an unresolved name leaves the
    /// identity unset.
    pub fn from_command(command: &str) -> Self {
        if Path::new(command).components().count() > 1 {
            return Self::new(command);
        }

        match which::which(command) {
            Ok(path) => Self::new(path),
            Err(e) => {
                debug!("Could not resolve program '{}' on PATH: {}", command, e);
                Self::unidentified()
            }
        }
    }

    /// Add one path to hash
    pub fn hash_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hashed_paths.insert(path.into());
        self
    }

    /// Add several paths to hash
    pub fn hash_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.hashed_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn main_file(&self) -> Option<&Path> {
        self.main_file.as_deref()
    }
}

impl ProgramSource for Program {
    fn identity(&self) -> Option<PathBuf> {
        self.main_file.clone()
    }

    fn paths_to_hash(&self) -> BTreeSet<PathBuf> {
        self.hashed_paths.clone()
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
