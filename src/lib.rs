pub mod app;
pub mod cache;
pub mod cli;
pub mod constants;
pub mod fingerprint;
pub mod program;
pub mod utils;

pub use app::{load_config, Config};
pub use cache::{CacheStore, ObjectCache, SaveOutcome};
pub use fingerprint::{compute_fingerprint, expand_paths, ExpandedFileSet, Fingerprint};
pub use program::{Program, ProgramSource};
pub use utils::CacheError;
