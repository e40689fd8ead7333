use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::digest::{compute_fingerprint, Fingerprint};

/// Paths whose state decides whether a cache entry is still usable
///
/// Holds every requested path verbatim plus each source file found beneath
/// it. Backed by an ordered set, so iteration is already canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedFileSet {
    entries: BTreeSet<String>,
}

impl ExpandedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        self.entries.insert(entry.into())
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Hash the set into its fingerprint
    pub fn fingerprint(&self) -> Fingerprint {
        compute_fingerprint(self.iter())
    }
}

impl<S: Into<String>> FromIterator<S> for ExpandedFileSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Expand a path set into every file that should influence the fingerprint
///
/// Relative paths are resolved against `base_dir` when given, otherwise
/// against the current directory. Recorded entries keep the spelling the
/// caller used (`plugins/sub/x.py`, not an absolute path).
pub fn expand_paths<I, P>(base_dir: Option<&Path>, paths: I, source_extension: &str) -> ExpandedFileSet
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut fileset = ExpandedFileSet::new();

    for path in paths {
        let path = path.as_ref();
        fileset.insert(path.to_string_lossy().into_owned());

        let root = match base_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        };
        if !root.is_dir() {
            continue;
        }

        for matched in collect_sources(&root, source_extension) {
            fileset.insert(path.join(matched).to_string_lossy().into_owned());
        }
    }

    fileset
}

/// Find every `*.<ext>` file below `root`, returned relative to `root`
fn collect_sources(root: &Path, source_extension: &str) -> Vec<PathBuf> {
    let mut matches = Vec::new();

    // Behave like a recursive shell glob: no ignore files, skip dotfiles
    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .hidden(true)
        .follow_links(true);

    for result in walker.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        let is_file = entry.file_type().map_or(false, |ft| ft.is_file());
        if !is_file || entry.path().extension() != Some(OsStr::new(source_extension)) {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(root) {
            matches.push(relative.to_path_buf());
        }
    }

    matches
}
