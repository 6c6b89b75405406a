//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, subcommands, and their arguments.

use crate::config::init::ConfigInitializer;
use crate::config::registry::{OptionKey, OPT_BASE_URL, OPT_SANDBOX};
use crate::config::resolver::ResolveOptions;
use crate::config::settings::{mask_secret, API_VERSION, PROD_BASE_URL};
use crate::config::AppContext;
use crate::error::{Result, TemplateError};
use crate::utils::format::{no_color, DisplayUtils, FormattableOutput, OutputFormat, TableFormatter};
use crate::utils::interactive::InteractivePrompt;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Get the full version string with build information
fn get_version() -> &'static str {
    env!("VERSION_WITH_GIT")
}

/// Get build information for display
pub fn get_build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("GIT_HASH"),
        build_time: env!("BUILD_TIME"),
        full_version: env!("VERSION_WITH_GIT"),
    }
}

#[derive(Debug)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_time: &'static str,
    pub full_version: &'static str,
}

#[derive(Parser, Debug)]
#[command(name = "template")]
#[command(about = "Template CLI")]
#[command(version = get_version())]
pub struct Cli {
    /// Sandbox environment
    #[arg(long, global = true)]
    pub sandbox: bool,

    /// Access token
    #[arg(long, global = true, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Account
    #[arg(long, global = true, value_name = "ID", allow_negative_numbers = true)]
    pub account: Option<String>,

    /// Base URL
    #[arg(long, global = true, value_name = "URL", conflicts_with = "sandbox")]
    pub base_url: Option<String>,

    /// Profile [default: $TEMPLATE_PROFILE or "default"]
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Configuration file
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List accounts
    Foo {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
        /// Print a single setting
        #[arg(short, long, value_name = "KEY")]
        query: Option<String>,
    },
    /// Show where each setting was resolved from
    Bar {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
    /// Manage configurations
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Check version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print a configuration value
    Get {
        /// Setting name
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Setting name
        key: String,
        /// Setting value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

impl Cli {
    /// Reject flag combinations that cannot be used together
    pub fn check_conflicts(&self) -> Result<()> {
        if self.sandbox && self.base_url.is_some() {
            return Err(TemplateError::invalid_argument(format!(
                "--{OPT_BASE_URL} and --{OPT_SANDBOX} cannot be used together"
            )));
        }
        Ok(())
    }

    /// Config keys passed explicitly on the command line
    pub fn flag_overrides(&self) -> Vec<(OptionKey, String)> {
        let mut flags = Vec::new();

        if self.sandbox {
            flags.push((OptionKey::Sandbox, "true".to_string()));
        }
        if let Some(token) = &self.access_token {
            flags.push((OptionKey::AccessToken, token.clone()));
        }
        if let Some(account) = &self.account {
            flags.push((OptionKey::Account, account.clone()));
        }
        if let Some(url) = &self.base_url {
            flags.push((OptionKey::BaseUrl, url.clone()));
        }

        flags
    }

    pub fn resolve_options(&self) -> ResolveOptions<'_> {
        ResolveOptions {
            config_file: self.config_file.as_deref(),
            profile: self.profile.as_deref(),
        }
    }

    pub fn execute(self, context: AppContext) -> Result<()> {
        match self.command {
            Commands::Foo { output, query } => execute_foo(output, query.as_deref(), &context),
            Commands::Bar { output } => execute_bar(output, &context),
            Commands::Config { command } => execute_config_command(command, context),
            Commands::Version => execute_version_command(),
        }
    }
}

fn execute_foo(output: OutputFormat, query: Option<&str>, context: &AppContext) -> Result<()> {
    let settings = context.settings();
    settings.validate()?;

    if let Some(key) = query {
        println!("{}", settings.query(key)?);
        return Ok(());
    }

    println!("{}", settings.render(output, no_color())?);
    Ok(())
}

#[derive(Debug, Serialize, Tabled)]
struct SettingSource {
    #[tabled(rename = "Setting")]
    setting: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

fn execute_bar(output: OutputFormat, context: &AppContext) -> Result<()> {
    context.settings().validate()?;

    let masked = matches!(output, OutputFormat::Table | OutputFormat::Text);
    let items: Vec<SettingSource> = context
        .store
        .entries()
        .into_iter()
        .map(|(key, resolved)| {
            let (value, source) = match resolved {
                Some((value, source)) => (value.to_string(), source.to_string()),
                None => (String::new(), "unset".to_string()),
            };
            let value = if masked && key == OptionKey::AccessToken {
                mask_secret(&value)
            } else {
                value
            };

            SettingSource {
                setting: key.to_string(),
                value,
                source,
            }
        })
        .collect();

    println!("{}", TableFormatter::new(output, no_color()).format_table(&items)?);

    if output == OutputFormat::Table {
        let location = context.store.location();
        println!("Endpoint: {}", context.settings().endpoint());

        if location.exists {
            println!("Config file: {} ({})", location.file.display(), location.origin);
        } else if location.search_paths.is_empty() {
            DisplayUtils::new(no_color())
                .print_warning(&format!("Config file {} not found", location.file.display()));
        } else {
            let searched: Vec<String> = location
                .search_paths
                .iter()
                .map(|dir| dir.display().to_string())
                .collect();
            DisplayUtils::new(no_color()).print_warning(&format!(
                "No config file for profile '{}' (searched {})",
                location.profile,
                searched.join(", ")
            ));
        }
    }

    Ok(())
}

fn execute_config_command(command: Option<ConfigCommands>, mut context: AppContext) -> Result<()> {
    match command {
        None => execute_config_setup(&context),
        Some(ConfigCommands::Get { key }) => {
            println!("{}", context.store.get_string(&key)?);
            Ok(())
        }
        Some(ConfigCommands::Set { key, value }) => {
            let value = context.store.set(&key, &value)?;
            DisplayUtils::new(no_color()).print_success(&format!(
                "Configuration updated: {key} = {value} ({})",
                context.store.location().file.display()
            ));
            Ok(())
        }
    }
}

fn execute_config_setup(context: &AppContext) -> Result<()> {
    let prompt = InteractivePrompt::new();
    let initializer = ConfigInitializer::new(&prompt);

    let path = initializer.run_interactive_setup(
        context.profile(),
        &context.settings(),
        context.config_home()?,
    )?;

    DisplayUtils::new(no_color()).print_success(&format!("Configuration saved to {}", path.display()));
    Ok(())
}

fn execute_version_command() -> Result<()> {
    let build_info = get_build_info();
    let os_arch = format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH);

    let pairs = [
        ("Template CLI version", build_info.full_version),
        ("Template API endpoint", PROD_BASE_URL),
        ("Template API version", API_VERSION),
        ("OS/Arch", os_arch.as_str()),
        ("Built", build_info.build_time),
    ];

    println!("{}", DisplayUtils::new(true).format_key_value_pairs(&pairs));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_registered_options_are_exposed() {
        use crate::config::registry::{Scope, OPTIONS};

        let command = Cli::command();
        for spec in OPTIONS {
            let owner = match spec.scope {
                Scope::Global => &command,
                Scope::Command(name) => command.find_subcommand(name).unwrap(),
            };
            let arg = owner
                .get_arguments()
                .find(|arg| arg.get_long() == Some(spec.name))
                .unwrap_or_else(|| panic!("--{} is not registered", spec.name));
            assert_eq!(arg.is_global_set(), spec.scope == Scope::Global, "{}", spec.name);

            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            assert!(
                help.starts_with(spec.description),
                "--{}: help {:?} does not match {:?}",
                spec.name,
                help,
                spec.description
            );

            if let Some(default) = arg.get_default_values().first() {
                assert_eq!(default.to_str(), spec.default, "--{}", spec.name);
            }
        }
    }

    #[test]
    fn test_negative_account_flag() {
        let cli = Cli::try_parse_from(["template", "--account", "-5", "config", "get", "account"]).unwrap();
        assert_eq!(cli.account.as_deref(), Some("-5"));
        assert_eq!(cli.flag_overrides(), vec![(OptionKey::Account, "-5".to_string())]);

        let cli = Cli::try_parse_from(["template", "config", "get", "account", "--account", "-5"]).unwrap();
        assert_eq!(cli.account.as_deref(), Some("-5"));
    }

    #[test]
    fn test_sandbox_and_base_url_conflict() {
        let result = Cli::try_parse_from(["template", "--sandbox", "--base-url", "http://x", "foo"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_conflicts() {
        let mut cli = Cli::try_parse_from(["template", "--sandbox", "version"]).unwrap();
        assert!(cli.check_conflicts().is_ok());

        cli.base_url = Some("http://x".to_string());
        assert!(matches!(cli.check_conflicts(), Err(TemplateError::InvalidArgument(_))));
    }

    #[test]
    fn test_flag_overrides() {
        let cli = Cli::try_parse_from([
            "template",
            "config",
            "get",
            "account",
            "--account",
            "42",
            "--access-token",
            "tok",
        ])
        .unwrap();

        let flags = cli.flag_overrides();
        assert_eq!(
            flags,
            vec![
                (OptionKey::AccessToken, "tok".to_string()),
                (OptionKey::Account, "42".to_string()),
            ]
        );
    }

    #[test]
    fn test_unset_sandbox_is_not_an_override() {
        let cli = Cli::try_parse_from(["template", "version"]).unwrap();
        assert!(cli.flag_overrides().is_empty());
        assert!(cli.resolve_options().profile.is_none());
        assert!(cli.resolve_options().config_file.is_none());
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["template", "-c", "/tmp/a.json", "config", "set", "account", "-5"]).unwrap();
        assert_eq!(cli.config_file, Some(PathBuf::from("/tmp/a.json")));
        match cli.command {
            Commands::Config {
                command: Some(ConfigCommands::Set { key, value }),
            } => {
                assert_eq!(key, "account");
                assert_eq!(value, "-5");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["template", "config"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { command: None }));
    }

    #[test]
    fn test_foo_flags() {
        let cli = Cli::try_parse_from(["template", "foo", "-o", "json", "-q", "account"]).unwrap();
        match cli.command {
            Commands::Foo { output, query } => {
                assert_eq!(output, OutputFormat::Json);
                assert_eq!(query.as_deref(), Some("account"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
