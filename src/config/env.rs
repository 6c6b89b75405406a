//! Environment variable binding
//!
//! Every option can be overridden through a `TEMPLATE_`-prefixed variable:
//!
//! - `base-url` → `TEMPLATE_BASE_URL`
//! - `access-token` → `TEMPLATE_ACCESS_TOKEN`
//!
//! The process environment is scanned once at startup and each prefixed
//! entry is mapped back to the option it overrides.

use crate::error::{Result, TemplateError};
use tracing::debug;

pub const ENV_PREFIX: &str = "TEMPLATE";
pub const ENV_CONFIG_FILE: &str = "TEMPLATE_CONFIG_FILE";
pub const ENV_PROFILE: &str = "TEMPLATE_PROFILE";
pub const ENV_XDG_CONFIG_HOME: &str = "XDG_CONFIG_HOME";

/// Abstraction over the process environment so tests never touch real state.
pub trait EnvSource {
    /// Value of a single variable
    fn get(&self, name: &str) -> Option<String>;

    /// Every variable as a raw `NAME=VALUE` entry
    fn entries(&self) -> Vec<String>;
}

/// Reads from the actual process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnv;

impl EnvSource for StdEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn entries(&self) -> Vec<String> {
        std::env::vars_os()
            .filter_map(|(name, value)| {
                let name = name.to_str()?;
                let value = value.to_str()?;
                Some(format!("{name}={value}"))
            })
            .collect()
    }
}

/// Environment backed by a list of raw entries.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    entries: Vec<String>,
}

impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| format!("{}={}", k.into(), v.into()))
                .collect(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let prefix = format!("{name}=");
        self.entries.retain(|entry| !entry.starts_with(&prefix));
        self.entries.push(format!("{}{}", prefix, value.into()));
    }

    /// Add an entry verbatim, even one that is not `NAME=VALUE` shaped
    pub fn push_raw(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }
}

impl EnvSource for MockEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.entries.iter().find_map(|entry| {
            let (key, value) = entry.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    fn entries(&self) -> Vec<String> {
        self.entries.clone()
    }
}

/// An option override found in the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    /// Option name, e.g. `base-url`
    pub key: String,
    /// Variable it came from, e.g. `TEMPLATE_BASE_URL`
    pub var: String,
    pub value: String,
}

/// Environment variable name for an option
pub fn flag_to_env(flag: &str) -> String {
    format!("{}_{}", ENV_PREFIX, flag.replace('-', "_").to_uppercase())
}

/// Option name for a raw `TEMPLATE_NAME=VALUE` entry
pub fn env_to_flag(entry: &str) -> Result<String> {
    let prefix = format!("{ENV_PREFIX}_");
    let rest = entry.strip_prefix(&prefix).ok_or_else(|| {
        TemplateError::invalid_argument(format!("'{entry}' does not start with {prefix}"))
    })?;

    let parts: Vec<&str> = rest.split('=').collect();
    if parts.len() != 2 {
        return Err(TemplateError::malformed_env(entry));
    }

    Ok(parts[0].to_lowercase().replace('_', "-"))
}

/// Collect every prefixed variable as an option override.
///
/// Unprefixed entries are ignored. Entries that are not exactly
/// `NAME=VALUE` are skipped without failing.
pub fn bind_env(source: &dyn EnvSource) -> Vec<EnvBinding> {
    let prefix = format!("{ENV_PREFIX}_");
    let mut bindings = Vec::new();

    for entry in source.entries() {
        if !entry.starts_with(&prefix) {
            continue;
        }

        match env_to_flag(&entry) {
            Ok(key) => {
                let (var, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
                debug!("Binding {} to option '{}'", var, key);
                bindings.push(EnvBinding {
                    key,
                    var: var.to_string(),
                    value: value.to_string(),
                });
            }
            Err(e) => {
                debug!("Skipping environment entry: {}", e);
            }
        }
    }

    bindings
}
