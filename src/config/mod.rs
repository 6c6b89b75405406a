//! Configuration management module
//!
//! This module resolves configuration from command-line flags, `TEMPLATE_*`
//! environment variables, a per-profile config file and built-in defaults,
//! and persists changes made by `config set` and the setup flow.

pub mod context;
pub mod env;
pub mod init;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod store;

pub use context::AppContext;
pub use registry::{OptionKey, OptionValue};
pub use settings::Settings;
pub use store::{ConfigStore, Source};
