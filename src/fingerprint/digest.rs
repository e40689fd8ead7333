use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Lowercase hex MD5 digest of a canonicalized path set
///
/// MD5 is only used for change detection here, never for security.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a set of path strings
///
/// Entries are deduplicated, sorted, and concatenated with no separator
/// before hashing, so insertion order and repeats never matter.
pub fn compute_fingerprint<I, S>(entries: I) -> Fingerprint
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let canonical: BTreeSet<String> = entries
        .into_iter()
        .map(|entry| entry.as_ref().to_owned())
        .collect();

    let mut packed = String::new();
    for entry in &canonical {
        packed.push_str(entry);
    }

    Fingerprint(format!("{:x}", md5::compute(packed.as_bytes())))
}
