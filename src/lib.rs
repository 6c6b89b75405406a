//! template - layered configuration CLI scaffold
//!
//! Commands read settings resolved from flags, `TEMPLATE_*` environment
//! variables, a per-profile config file and built-in defaults.

pub mod cli;
pub mod config;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, TemplateError};
