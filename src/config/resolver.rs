//! Config file resolution
//!
//! Decides, once per invocation, which profile is active and which file (if
//! any) backs the file layer of the store. The first matching branch wins:
//!
//! 1. `--config-file` flag
//! 2. `TEMPLATE_CONFIG_FILE`
//! 3. Discovery of `<profile>` in `$XDG_CONFIG_HOME/template` (or the
//!    platform config directory), then in `/etc/template`

use crate::config::env::{EnvSource, ENV_CONFIG_FILE, ENV_PROFILE, ENV_XDG_CONFIG_HOME};
use crate::config::registry::{DEFAULT_PROFILE, OPT_CONFIG_FILE};
use crate::error::{Result, TemplateError};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_DIR: &str = "template";
pub const SYSTEM_CONFIG_DIR: &str = "/etc/template";

/// On-disk format of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    /// Format implied by a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(FileFormat::from_extension)
            .ok_or_else(|| {
                TemplateError::invalid_argument(format!(
                    "unsupported config file type: {} (expected .yaml, .yml, .json or .toml)",
                    path.display()
                ))
            })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Yaml => "yaml",
            FileFormat::Json => "json",
            FileFormat::Toml => "toml",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl From<FileFormat> for config::FileFormat {
    fn from(format: FileFormat) -> Self {
        match format {
            FileFormat::Yaml => config::FileFormat::Yaml,
            FileFormat::Json => config::FileFormat::Json,
            FileFormat::Toml => config::FileFormat::Toml,
        }
    }
}

/// Which resolution branch produced the location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Flag,
    Env,
    Discovered,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Flag => write!(f, "--{OPT_CONFIG_FILE}"),
            ConfigOrigin::Env => f.write_str(ENV_CONFIG_FILE),
            ConfigOrigin::Discovered => f.write_str("discovered"),
        }
    }
}

/// Outcome of config file resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub profile: String,
    pub origin: ConfigOrigin,
    /// Directories searched during discovery (empty for explicit paths)
    pub search_paths: Vec<PathBuf>,
    /// File that was loaded, or the one `config set` will create
    pub file: PathBuf,
    /// Whether `file` existed at resolution time
    pub exists: bool,
    /// `None` when an explicit path has an unsupported extension
    pub format: Option<FileFormat>,
}

impl ConfigLocation {
    /// Path of the file backing the file layer, if one was found
    pub fn loaded_file(&self) -> Option<&Path> {
        self.exists.then_some(self.file.as_path())
    }
}

/// Command-line inputs to resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    pub config_file: Option<&'a Path>,
    pub profile: Option<&'a str>,
}

/// Profile selection: flag, then `TEMPLATE_PROFILE`, then `default`
pub fn resolve_profile(flag: Option<&str>, env: &dyn EnvSource) -> String {
    if let Some(profile) = flag.filter(|p| !p.is_empty()) {
        return profile.to_string();
    }

    env.get(ENV_PROFILE)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// User config home: `XDG_CONFIG_HOME` if set, else the platform directory
pub fn config_home(env: &dyn EnvSource) -> Result<PathBuf> {
    if let Some(dir) = env.get(ENV_XDG_CONFIG_HOME).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    dirs::config_dir()
        .ok_or_else(|| TemplateError::config("Unable to determine config directory"))
}

/// Resolves config locations against a system-wide directory.
#[derive(Debug, Clone)]
pub struct Resolver {
    system_dir: PathBuf,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            system_dir: PathBuf::from(SYSTEM_CONFIG_DIR),
        }
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_dir(system_dir: impl Into<PathBuf>) -> Self {
        Self {
            system_dir: system_dir.into(),
        }
    }

    pub fn resolve(&self, opts: ResolveOptions<'_>, env: &dyn EnvSource) -> Result<ConfigLocation> {
        let profile = resolve_profile(opts.profile, env);

        if let Some(path) = opts.config_file.filter(|p| !p.as_os_str().is_empty()) {
            debug!("Using config file from --config-file: {}", path.display());
            return Ok(explicit_location(profile, ConfigOrigin::Flag, path));
        }

        if let Some(path) = env.get(ENV_CONFIG_FILE).filter(|p| !p.is_empty()) {
            debug!("Using config file from {}: {}", ENV_CONFIG_FILE, path);
            return Ok(explicit_location(profile, ConfigOrigin::Env, Path::new(&path)));
        }

        let user_dir = config_home(env)?.join(APP_DIR);
        let search_paths = vec![user_dir.clone(), self.system_dir.clone()];

        let found = search_paths.iter().find_map(|dir| {
            candidates(&profile)
                .into_iter()
                .map(|(name, format)| (dir.join(name), format))
                .find(|(path, _)| path.is_file())
        });

        if let Some((file, format)) = found {
            debug!("Discovered config file {}", file.display());
            return Ok(ConfigLocation {
                profile,
                origin: ConfigOrigin::Discovered,
                search_paths,
                file,
                exists: true,
                format: Some(format),
            });
        }

        debug!("No config file found for profile '{}'", profile);
        let file = user_dir.join(format!("{}.{}", profile, FileFormat::Yaml.extension()));
        Ok(ConfigLocation {
            profile,
            origin: ConfigOrigin::Discovered,
            search_paths,
            file,
            exists: false,
            format: Some(FileFormat::Yaml),
        })
    }
}

fn explicit_location(profile: String, origin: ConfigOrigin, path: &Path) -> ConfigLocation {
    ConfigLocation {
        profile,
        origin,
        search_paths: Vec::new(),
        file: path.to_path_buf(),
        exists: path.is_file(),
        format: FileFormat::from_path(path).ok(),
    }
}

// Extensionless files are read as YAML.
fn candidates(profile: &str) -> [(String, FileFormat); 5] {
    [
        (format!("{profile}.yaml"), FileFormat::Yaml),
        (format!("{profile}.yml"), FileFormat::Yaml),
        (format!("{profile}.json"), FileFormat::Json),
        (format!("{profile}.toml"), FileFormat::Toml),
        (profile.to_string(), FileFormat::Yaml),
    ]
}
