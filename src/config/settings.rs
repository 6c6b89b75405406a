//! Resolved settings
//!
//! Typed view over the layered store used by the commands that talk to the
//! API, plus validation of the settings those commands require.

use crate::config::registry::OptionKey;
use crate::config::store::ConfigStore;
use crate::error::{Result, TemplateError};
use crate::utils::format::FormattableOutput;
use serde::Serialize;
use tabled::Tabled;

pub const PROD_BASE_URL: &str = "https://api.dnsimple.com";
pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.dnsimple.com";
pub const API_VERSION: &str = "v1";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Tabled)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    #[tabled(rename = "Account", display_with = "display_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<i64>,
    #[tabled(rename = "Access Token", display_with = "display_secret")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[tabled(rename = "Base URL", display_with = "display_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[tabled(rename = "Sandbox")]
    pub sandbox: bool,
}

impl FormattableOutput for Settings {}

impl Settings {
    pub fn from_store(store: &ConfigStore) -> Self {
        Self {
            account: store.value(OptionKey::Account).and_then(|v| v.as_int()),
            access_token: store
                .value(OptionKey::AccessToken)
                .and_then(|v| v.as_text())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            base_url: store
                .value(OptionKey::BaseUrl)
                .and_then(|v| v.as_text())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            sandbox: store
                .value(OptionKey::Sandbox)
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        }
    }

    /// Settings required before calling the API
    pub fn validate(&self) -> Result<()> {
        if self.account.is_none() {
            return Err(TemplateError::config(
                "Account is required. Use --account, TEMPLATE_ACCOUNT or 'template config'",
            ));
        }

        if self.access_token.is_none() {
            return Err(TemplateError::config(
                "Access token is required. Use --access-token, TEMPLATE_ACCESS_TOKEN or 'template config'",
            ));
        }

        Ok(())
    }

    /// API endpoint: explicit base URL, else sandbox or production
    pub fn endpoint(&self) -> &str {
        match (&self.base_url, self.sandbox) {
            (Some(url), _) => url,
            (None, true) => SANDBOX_BASE_URL,
            (None, false) => PROD_BASE_URL,
        }
    }

    /// Value of a single config key as displayed by `foo --query`
    pub fn query(&self, name: &str) -> Result<String> {
        let key: OptionKey = name.parse()?;
        let value = match key {
            OptionKey::Account => self.account.map(|a| a.to_string()),
            OptionKey::AccessToken => self.access_token.clone(),
            OptionKey::BaseUrl => self.base_url.clone(),
            OptionKey::Sandbox => Some(self.sandbox.to_string()),
        };
        Ok(value.unwrap_or_default())
    }
}

fn display_option<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn display_secret(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(mask_secret)
        .unwrap_or_else(|| "<not set>".to_string())
}

/// Keep the last four characters of a secret visible
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }

    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), visible)
}
