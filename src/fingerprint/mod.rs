// Gateway module for fingerprint - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod digest;
mod resolver;

// Public re-exports - the ONLY way to access fingerprint functionality
pub use digest::{compute_fingerprint, Fingerprint};
pub use resolver::{expand_paths, ExpandedFileSet};
