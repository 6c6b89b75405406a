//! Utility functions module
//!
//! Terminal prompts and output formatting shared by the commands.

pub mod format;
pub mod interactive;

pub use format::*;
