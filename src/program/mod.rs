// Gateway module for program - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod source;

// Public re-exports - the ONLY way to access program functionality
pub use source::{Program, ProgramSource};

#[cfg(test)]
pub use source::MockProgramSource;
