//! Interactive configuration setup
//!
//! Collects credentials, the target environment and a file format, then
//! writes a fresh config file for the active profile once the user confirms.

use crate::config::registry::{OptionKey, OPT_ACCESS_TOKEN, OPT_ACCOUNT, OPT_BASE_URL, OPT_SANDBOX};
use crate::config::resolver::{FileFormat, APP_DIR};
use crate::config::settings::{Settings, PROD_BASE_URL};
use crate::config::store::write_document;
use crate::error::{Result, TemplateError};
use crate::utils::interactive::Prompter;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// API environment chosen during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEnvironment {
    Prod,
    Sandbox,
    Dev,
}

impl TargetEnvironment {
    pub const ALL: [TargetEnvironment; 3] = [
        TargetEnvironment::Prod,
        TargetEnvironment::Sandbox,
        TargetEnvironment::Dev,
    ];
}

impl fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetEnvironment::Prod => "PROD",
            TargetEnvironment::Sandbox => "SANDBOX",
            TargetEnvironment::Dev => "DEV",
        };
        f.write_str(name)
    }
}

const FILE_FORMATS: [FileFormat; 3] = [FileFormat::Json, FileFormat::Yaml, FileFormat::Toml];

/// Answers collected during setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitConfig {
    pub account: Option<i64>,
    pub access_token: Option<String>,
    pub environment: TargetEnvironment,
    pub base_url: Option<String>,
    pub format: FileFormat,
}

impl InitConfig {
    /// Entries written to the new config file
    pub fn to_document(&self) -> Map<String, Value> {
        let mut document = Map::new();

        if let Some(account) = self.account {
            document.insert(OPT_ACCOUNT.to_string(), Value::from(account));
        }
        if let Some(token) = &self.access_token {
            document.insert(OPT_ACCESS_TOKEN.to_string(), Value::String(token.clone()));
        }

        match self.environment {
            TargetEnvironment::Prod => {}
            TargetEnvironment::Sandbox => {
                document.insert(OPT_SANDBOX.to_string(), Value::Bool(true));
            }
            TargetEnvironment::Dev => {
                if let Some(url) = &self.base_url {
                    document.insert(OPT_BASE_URL.to_string(), Value::String(url.clone()));
                }
            }
        }

        document
    }
}

/// Interactive configuration initialization
pub struct ConfigInitializer<'a> {
    prompt: &'a dyn Prompter,
}

impl<'a> ConfigInitializer<'a> {
    pub fn new(prompt: &'a dyn Prompter) -> Self {
        Self { prompt }
    }

    /// Run the setup flow and return the path of the written file.
    ///
    /// Nothing is written unless the final confirmation is accepted.
    pub fn run_interactive_setup(
        &self,
        profile: &str,
        current: &Settings,
        config_home: &Path,
    ) -> Result<PathBuf> {
        println!("Configuring profile '{profile}'");

        let init_config = self.collect(current)?;
        let path = output_path(config_home, profile, init_config.format);

        write_document(&path, init_config.format, &init_config.to_document())?;
        info!("Wrote profile '{}' to {}", profile, path.display());

        Ok(path)
    }

    /// Ask every setup question, ending with the save confirmation
    pub fn collect(&self, current: &Settings) -> Result<InitConfig> {
        let account = self.prompt.input_validated(
            "Account ID",
            current.account.map(|a| a.to_string()),
            validate_account,
        )?;
        let account = match account.trim() {
            "" => None,
            raw => OptionKey::Account.parse(raw)?.as_int(),
        };

        let access_token = self
            .prompt
            .input("Access Token", current.access_token.clone())?;
        let access_token = Some(access_token.trim().to_string()).filter(|t| !t.is_empty());

        let environments: Vec<String> = TargetEnvironment::ALL.iter().map(|e| e.to_string()).collect();
        let selected = self.prompt.select("Environment", &environments, 0)?;
        let environment = *TargetEnvironment::ALL
            .get(selected)
            .ok_or_else(|| TemplateError::prompt(format!("Invalid environment selection: {selected}")))?;

        let base_url = match environment {
            TargetEnvironment::Dev => {
                let url = self
                    .prompt
                    .input("Base URL", Some(PROD_BASE_URL.to_string()))?;
                Some(url.trim().to_string()).filter(|u| !u.is_empty())
            }
            _ => None,
        };

        let formats: Vec<String> = FILE_FORMATS.iter().map(|f| f.to_string()).collect();
        let selected = self.prompt.select("File format", &formats, 0)?;
        let format = *FILE_FORMATS
            .get(selected)
            .ok_or_else(|| TemplateError::prompt(format!("Invalid format selection: {selected}")))?;

        if !self.prompt.confirm("Do you want to save?", true)? {
            return Err(TemplateError::NotConfirmed);
        }

        Ok(InitConfig {
            account,
            access_token,
            environment,
            base_url,
            format,
        })
    }
}

/// `<config-home>/template/<profile>.<ext>`
pub fn output_path(config_home: &Path, profile: &str, format: FileFormat) -> PathBuf {
    config_home
        .join(APP_DIR)
        .join(format!("{}.{}", profile, format.extension()))
}

fn validate_account(raw: &str) -> std::result::Result<(), String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(());
    }

    OptionKey::Account
        .parse(raw)
        .map(|_| ())
        .map_err(|e| e.to_string())
}
