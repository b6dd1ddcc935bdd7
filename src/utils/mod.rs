//! Utility modules shared by the frontend and the symbol table:
//! - Error types
//! - Source location tracking

pub mod errors;
pub mod location;

// Re-exports
pub use errors::*;
pub use location::{SourceLocation, SourceMap, Span};
