pub mod asset_index;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod identity;
pub mod manifest;
pub mod rename;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
