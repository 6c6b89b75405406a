//! Option registry
//!
//! Declares every option the CLI recognizes, its default and scope, and the
//! closed set of keys that live in configuration files. Each config key
//! carries its own converter, so `config get`/`config set` never dispatch
//! through a string-keyed table.

use crate::error::{Result, TemplateError};
use std::fmt;
use std::str::FromStr;

pub const OPT_ACCESS_TOKEN: &str = "access-token";
pub const OPT_ACCOUNT: &str = "account";
pub const OPT_BASE_URL: &str = "base-url";
pub const OPT_SANDBOX: &str = "sandbox";
pub const OPT_PROFILE: &str = "profile";
pub const OPT_CONFIG_FILE: &str = "config-file";
pub const OPT_OUTPUT: &str = "output";
pub const OPT_QUERY: &str = "query";

pub const DEFAULT_PROFILE: &str = "default";

/// Where an option can be passed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Accepted by every command
    Global,
    /// Accepted only by the named command
    Command(&'static str),
}

/// Declaration of a single command-line option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub default: Option<&'static str>,
    pub description: &'static str,
    pub scope: Scope,
}

/// Every option the CLI registers, global options first.
pub const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: OPT_SANDBOX,
        default: Some("false"),
        description: "Sandbox environment",
        scope: Scope::Global,
    },
    OptionSpec {
        name: OPT_ACCESS_TOKEN,
        default: None,
        description: "Access token",
        scope: Scope::Global,
    },
    OptionSpec {
        name: OPT_ACCOUNT,
        default: None,
        description: "Account",
        scope: Scope::Global,
    },
    OptionSpec {
        name: OPT_BASE_URL,
        default: None,
        description: "Base URL",
        scope: Scope::Global,
    },
    OptionSpec {
        name: OPT_PROFILE,
        default: Some(DEFAULT_PROFILE),
        description: "Profile",
        scope: Scope::Global,
    },
    OptionSpec {
        name: OPT_CONFIG_FILE,
        default: None,
        description: "Configuration file",
        scope: Scope::Global,
    },
    OptionSpec {
        name: OPT_OUTPUT,
        default: Some("table"),
        description: "Output format",
        scope: Scope::Command("foo"),
    },
    OptionSpec {
        name: OPT_QUERY,
        default: None,
        description: "Print a single setting",
        scope: Scope::Command("foo"),
    },
    OptionSpec {
        name: OPT_OUTPUT,
        default: Some("table"),
        description: "Output format",
        scope: Scope::Command("bar"),
    },
];

/// Keys that can be read from and written to configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    Account,
    AccessToken,
    BaseUrl,
    Sandbox,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [
        OptionKey::Account,
        OptionKey::AccessToken,
        OptionKey::BaseUrl,
        OptionKey::Sandbox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::Account => OPT_ACCOUNT,
            OptionKey::AccessToken => OPT_ACCESS_TOKEN,
            OptionKey::BaseUrl => OPT_BASE_URL,
            OptionKey::Sandbox => OPT_SANDBOX,
        }
    }

    /// Registry entry backing this key
    pub fn spec(&self) -> &'static OptionSpec {
        // Indices follow the declaration order of OPTIONS.
        match self {
            OptionKey::Sandbox => &OPTIONS[0],
            OptionKey::AccessToken => &OPTIONS[1],
            OptionKey::Account => &OPTIONS[2],
            OptionKey::BaseUrl => &OPTIONS[3],
        }
    }

    /// Built-in default from the registry, if the key has one
    pub fn default_value(&self) -> Option<OptionValue> {
        self.spec().default.and_then(|raw| self.parse(raw).ok())
    }

    /// Convert a raw string into this key's typed value
    pub fn parse(&self, raw: &str) -> Result<OptionValue> {
        match self {
            OptionKey::Sandbox => parse_bool(raw)
                .map(OptionValue::Bool)
                .ok_or_else(|| TemplateError::invalid_value(self.as_str(), raw, "expected a boolean")),
            OptionKey::Account => raw
                .parse::<i64>()
                .map(OptionValue::Int)
                .map_err(|e| TemplateError::invalid_value(self.as_str(), raw, e.to_string())),
            OptionKey::BaseUrl | OptionKey::AccessToken => Ok(OptionValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        OptionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| TemplateError::key_not_found(s))
    }
}

/// Typed value of a config key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Value as it is written to configuration files
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OptionValue::Bool(b) => serde_json::Value::Bool(*b),
            OptionValue::Int(i) => serde_json::Value::from(*i),
            OptionValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

/// Boolean spellings accepted for flags, env vars and `config set`
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
