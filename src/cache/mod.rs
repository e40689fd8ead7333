mod envelope;
mod object_cache;
mod store;
mod types;

pub use envelope::EnvelopeError;
pub use object_cache::ObjectCache;
pub use store::CacheStore;
pub use types::{CacheKey, CacheStatus, SaveOutcome};

use crate::app::Config;
use crate::program::ProgramSource;

/// Open the object cache for a program with the given configuration
pub fn init<P: ProgramSource>(program: P, config: &Config) -> ObjectCache<P> {
    ObjectCache::new(program, config)
}
