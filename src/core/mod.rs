// Public modules
pub mod build;
pub mod defaults;
pub mod error;
pub mod gcloud;
pub mod invocation;
pub mod pins;
pub mod regions;
pub mod state;
pub mod substitution;

// Internal modules - not part of public API
pub(crate) mod paths;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
