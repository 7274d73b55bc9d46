pub mod clock;
pub mod config;
pub mod discovery;
pub mod error;
pub mod scan;
pub mod summary;

// Internal modules - not part of public API
pub(crate) mod progress;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
