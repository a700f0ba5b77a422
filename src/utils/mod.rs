//! Generic utility primitives with zero domain knowledge.
//!
//! - `io` - File I/O with consistent error handling
//! - `parser` - Locating and splicing top-level JSON string values
//! - `validation` - Input validation helpers

pub mod io;
pub mod parser;
pub mod validation;
