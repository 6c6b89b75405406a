//! Invocation context
//!
//! Everything a command needs about configuration, built once before the
//! command runs and passed to its handler.

use crate::config::env::{bind_env, EnvSource};
use crate::config::registry::OptionKey;
use crate::config::resolver::{config_home, ResolveOptions, Resolver};
use crate::config::settings::Settings;
use crate::config::store::ConfigStore;
use crate::error::{Result, TemplateError};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub store: ConfigStore,
    config_home: Option<PathBuf>,
}

impl AppContext {
    /// Scan the environment, resolve the config file and build the store
    pub fn load(
        resolver: &Resolver,
        opts: ResolveOptions<'_>,
        flags: &[(OptionKey, String)],
        env: &dyn EnvSource,
    ) -> Result<Self> {
        let bindings = bind_env(env);
        debug!("Found {} environment override(s)", bindings.len());

        let location = resolver.resolve(opts, env)?;
        let store = ConfigStore::load(location, &bindings, flags)?;

        Ok(Self {
            store,
            config_home: config_home(env).ok(),
        })
    }

    pub fn profile(&self) -> &str {
        &self.store.location().profile
    }

    pub fn settings(&self) -> Settings {
        Settings::from_store(&self.store)
    }

    /// Directory that holds the `template` config folder
    pub fn config_home(&self) -> Result<&Path> {
        self.config_home
            .as_deref()
            .ok_or_else(|| TemplateError::config("Unable to determine config directory"))
    }
}
