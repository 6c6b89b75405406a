//! Layered configuration store
//!
//! Values are resolved per key with the precedence
//! `flag > environment > file > built-in default`. Only the file layer is
//! ever written back to disk.

use crate::config::env::EnvBinding;
use crate::config::registry::{OptionKey, OptionValue};
use crate::config::resolver::{ConfigLocation, FileFormat};
use crate::error::{Result, TemplateError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Layer a resolved value came from, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    Default,
    File,
    Env,
    Flag,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Default => "default",
            Source::File => "file",
            Source::Env => "env",
            Source::Flag => "flag",
        };
        f.write_str(name)
    }
}

/// Contents of the backing config file
#[derive(Debug, Clone, Default)]
struct FileLayer {
    /// Every top-level entry of the file, keys exactly as written
    document: Map<String, Value>,
    values: BTreeMap<OptionKey, OptionValue>,
    /// Why an existing file could not be read; it must not be overwritten
    unreadable: Option<String>,
}

impl FileLayer {
    fn read(path: &Path, format: FileFormat) -> Result<Self> {
        let document = read_document(path, format)?;
        let entries = read_entries(path, format)?;

        let mut values = BTreeMap::new();
        for (name, raw) in &entries {
            let Ok(key) = name.parse::<OptionKey>() else {
                debug!("Keeping unrecognized config entry '{}'", name);
                continue;
            };

            let Some(raw) = scalar_to_string(raw) else {
                warn!("Ignoring non-scalar value for '{}' in config file", name);
                continue;
            };

            match key.parse(&raw) {
                Ok(value) => {
                    values.insert(key, value);
                }
                Err(e) => warn!("Ignoring config file entry: {}", e),
            }
        }

        Ok(Self {
            document,
            values,
            unreadable: None,
        })
    }

    fn unreadable(reason: String) -> Self {
        Self {
            unreadable: Some(reason),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    location: ConfigLocation,
    defaults: BTreeMap<OptionKey, OptionValue>,
    file: FileLayer,
    env: BTreeMap<OptionKey, OptionValue>,
    flags: BTreeMap<OptionKey, OptionValue>,
}

impl ConfigStore {
    /// Store with built-in defaults only
    pub fn new(location: ConfigLocation) -> Self {
        let defaults = OptionKey::ALL
            .into_iter()
            .filter_map(|key| key.default_value().map(|value| (key, value)))
            .collect();

        Self {
            location,
            defaults,
            file: FileLayer::default(),
            env: BTreeMap::new(),
            flags: BTreeMap::new(),
        }
    }

    /// Build every layer for an invocation.
    ///
    /// A missing file is silently skipped. An unreadable file, or an
    /// environment value its key rejects, is logged and skipped. Flag
    /// values that fail conversion are usage errors.
    pub fn load(
        location: ConfigLocation,
        bindings: &[EnvBinding],
        flags: &[(OptionKey, String)],
    ) -> Result<Self> {
        let mut store = Self::new(location);

        if let Some(path) = store.location.loaded_file().map(Path::to_path_buf) {
            store.file = match store.location.format {
                Some(format) => match FileLayer::read(&path, format) {
                    Ok(layer) => {
                        debug!("Loaded config file {}", path.display());
                        layer
                    }
                    Err(e) => {
                        warn!("Failed to read config file {}: {}", path.display(), e);
                        FileLayer::unreadable(e.to_string())
                    }
                },
                None => {
                    warn!("Unsupported config file type: {}", path.display());
                    FileLayer::unreadable("unsupported file type".to_string())
                }
            };
        }

        for binding in bindings {
            let Ok(key) = binding.key.parse::<OptionKey>() else {
                continue;
            };

            match key.parse(&binding.value) {
                Ok(value) => {
                    store.env.insert(key, value);
                }
                Err(e) => warn!("Ignoring {}: {}", binding.var, e),
            }
        }

        for (key, raw) in flags {
            let value = key.parse(raw)?;
            store.flags.insert(*key, value);
        }

        Ok(store)
    }

    pub fn location(&self) -> &ConfigLocation {
        &self.location
    }

    /// Highest-precedence value for a key and the layer it came from
    pub fn get(&self, key: OptionKey) -> Option<(&OptionValue, Source)> {
        self.flags
            .get(&key)
            .map(|v| (v, Source::Flag))
            .or_else(|| self.env.get(&key).map(|v| (v, Source::Env)))
            .or_else(|| self.file.values.get(&key).map(|v| (v, Source::File)))
            .or_else(|| self.defaults.get(&key).map(|v| (v, Source::Default)))
    }

    pub fn value(&self, key: OptionKey) -> Option<&OptionValue> {
        self.get(key).map(|(value, _)| value)
    }

    /// Canonical string of a key's resolved value, empty when unset
    pub fn get_string(&self, name: &str) -> Result<String> {
        let key: OptionKey = name.parse()?;
        Ok(self
            .value(key)
            .map(|value| value.to_string())
            .unwrap_or_default())
    }

    /// Validate and persist a value to the backing file.
    ///
    /// Other entries already in the file are written back unchanged. A file
    /// that exists but could not be read is never overwritten. The store is
    /// left untouched when validation or the write fails.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<OptionValue> {
        let key: OptionKey = name.parse()?;
        let value = key.parse(raw)?;

        if let Some(reason) = &self.file.unreadable {
            return Err(TemplateError::config(format!(
                "cannot update {}: it could not be read ({})",
                self.location.file.display(),
                reason
            )));
        }

        let format = match self.location.format {
            Some(format) => format,
            None => FileFormat::from_path(&self.location.file)?,
        };

        let mut document = self.file.document.clone();
        document.insert(key.as_str().to_string(), value.to_json());
        write_document(&self.location.file, format, &document)?;

        info!("Set {} in {}", key, self.location.file.display());
        self.file.document = document;
        self.file.values.insert(key, value.clone());
        self.location.exists = true;

        Ok(value)
    }

    /// Every config key with its resolved value and source
    pub fn entries(&self) -> Vec<(OptionKey, Option<(&OptionValue, Source)>)> {
        OptionKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key)))
            .collect()
    }
}

/// Parse a config file into its top-level entries, keys exactly as written
pub fn read_document(path: &Path, format: FileFormat) -> Result<Map<String, Value>> {
    let contents = std::fs::read_to_string(path)?;

    let document = match format {
        FileFormat::Json => serde_json::from_str::<Option<Map<String, Value>>>(&contents)?,
        FileFormat::Yaml => serde_yaml::from_str::<Option<Map<String, Value>>>(&contents)
            .map_err(|e| TemplateError::serialization(format!("Failed to parse YAML: {e}")))?,
        FileFormat::Toml => Some(
            toml::from_str::<Map<String, Value>>(&contents)
                .map_err(|e| TemplateError::serialization(format!("Failed to parse TOML: {e}")))?,
        ),
    };

    Ok(document.unwrap_or_default())
}

/// Entries as seen by the `config` crate, used for value lookup
fn read_entries(path: &Path, format: FileFormat) -> Result<Map<String, Value>> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(format.into()).required(true))
        .build()?;

    Ok(settings.try_deserialize::<Map<String, Value>>()?)
}

/// Serialize entries to `path`, creating parent directories
pub fn write_document(path: &Path, format: FileFormat, document: &Map<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let contents = match format {
        FileFormat::Json => {
            let mut json = serde_json::to_string_pretty(document)?;
            json.push('\n');
            json
        }
        FileFormat::Yaml => serde_yaml::to_string(document)
            .map_err(|e| TemplateError::serialization(format!("Failed to write YAML: {e}")))?,
        FileFormat::Toml => toml::to_string_pretty(document)
            .map_err(|e| TemplateError::serialization(format!("Failed to write TOML: {e}")))?,
    };

    std::fs::write(path, contents)?;
    debug!("Wrote {} config to {}", format, path.display());

    Ok(())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolver::ConfigOrigin;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn location(file: PathBuf, format: Option<FileFormat>) -> ConfigLocation {
        ConfigLocation {
            profile: "default".to_string(),
            origin: ConfigOrigin::Flag,
            search_paths: Vec::new(),
            exists: file.is_file(),
            file,
            format,
        }
    }

    fn binding(key: &str, value: &str) -> EnvBinding {
        EnvBinding {
            key: key.to_string(),
            var: format!("TEMPLATE_{}", key.replace('-', "_").to_uppercase()),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_defaults_only() {
        let store = ConfigStore::new(location(PathBuf::from("missing.yaml"), Some(FileFormat::Yaml)));

        assert_eq!(store.get_string("sandbox").unwrap(), "false");
        assert_eq!(store.get_string("account").unwrap(), "");
        assert_eq!(store.get(OptionKey::Sandbox).unwrap().1, Source::Default);
        assert!(matches!(
            store.get_string("profile"),
            Err(TemplateError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_precedence_flag_env_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.yaml");
        fs::write(&path, "base-url: https://file.test\naccount: 1\n").unwrap();

        let bindings = vec![binding("base-url", "https://env.test"), binding("account", "2")];
        let flags = vec![(OptionKey::BaseUrl, "https://flag.test".to_string())];

        let store = ConfigStore::load(location(path.clone(), Some(FileFormat::Yaml)), &bindings, &flags).unwrap();
        assert_eq!(store.get_string("base-url").unwrap(), "https://flag.test");
        assert_eq!(store.get(OptionKey::BaseUrl).unwrap().1, Source::Flag);
        assert_eq!(store.get_string("account").unwrap(), "2");
        assert_eq!(store.get(OptionKey::Account).unwrap().1, Source::Env);

        let store = ConfigStore::load(location(path, Some(FileFormat::Yaml)), &[], &[]).unwrap();
        assert_eq!(store.get_string("base-url").unwrap(), "https://file.test");
        assert_eq!(store.value(OptionKey::Account), Some(&OptionValue::Int(1)));
    }

    #[test]
    fn test_invalid_flag_value_is_an_error() {
        let flags = vec![(OptionKey::Account, "abc".to_string())];
        let result = ConfigStore::load(location(PathBuf::from("x.yaml"), Some(FileFormat::Yaml)), &[], &flags);

        assert!(matches!(result, Err(TemplateError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_env_value_is_skipped() {
        let bindings = vec![binding("sandbox", "maybe"), binding("output", "json")];
        let store = ConfigStore::load(location(PathBuf::from("x.yaml"), Some(FileFormat::Yaml)), &bindings, &[]).unwrap();

        assert_eq!(store.get(OptionKey::Sandbox), Some((&OptionValue::Bool(false), Source::Default)));
    }

    #[test]
    fn test_malformed_file_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.yaml");
        fs::write(&path, "account: [unclosed\n").unwrap();

        let bindings = vec![binding("account", "7")];
        let store = ConfigStore::load(location(path, Some(FileFormat::Yaml)), &bindings, &[]).unwrap();

        assert_eq!(store.get_string("account").unwrap(), "7");
    }

    #[test]
    fn test_file_values_are_converted_per_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cfg.json");
        fs::write(
            &path,
            r#"{"account": "42", "sandbox": "true", "access-token": "tok", "base-url": 5}"#,
        )
        .unwrap();

        let store = ConfigStore::load(location(path, Some(FileFormat::Json)), &[], &[]).unwrap();
        assert_eq!(store.value(OptionKey::Account), Some(&OptionValue::Int(42)));
        assert_eq!(store.value(OptionKey::Sandbox), Some(&OptionValue::Bool(true)));
        assert_eq!(store.value(OptionKey::BaseUrl), Some(&OptionValue::Text("5".to_string())));
        assert_eq!(store.get(OptionKey::AccessToken).unwrap().1, Source::File);
    }

    #[test]
    fn test_set_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("default.yaml");
        let mut store = ConfigStore::new(location(path.clone(), Some(FileFormat::Yaml)));

        assert_eq!(store.set("account", "42").unwrap(), OptionValue::Int(42));
        assert_eq!(store.get_string("account").unwrap(), "42");
        assert_eq!(store.set("sandbox", "1").unwrap(), OptionValue::Bool(true));
        assert_eq!(store.get_string("sandbox").unwrap(), "true");
        assert_eq!(store.set("base-url", "http://localhost").unwrap().to_string(), "http://localhost");

        assert!(path.is_file());
        assert!(store.location().exists);
        let document = read_document(&path, FileFormat::Yaml).unwrap();
        assert_eq!(document["account"], Value::from(42));
        assert_eq!(document["sandbox"], Value::Bool(true));
    }

    #[test]
    fn test_set_rejects_without_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.yaml");
        let mut store = ConfigStore::new(location(path.clone(), Some(FileFormat::Yaml)));

        assert!(matches!(store.set("colour", "blue"), Err(TemplateError::KeyNotFound { .. })));
        assert!(matches!(store.set("sandbox", "notabool"), Err(TemplateError::InvalidValue { .. })));
        assert!(matches!(store.set("account", "abc"), Err(TemplateError::InvalidValue { .. })));

        assert!(!path.exists());
        assert_eq!(store.get_string("account").unwrap(), "");
        assert_eq!(store.get_string("sandbox").unwrap(), "false");
    }

    #[test]
    fn test_set_preserves_other_entries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.toml");
        fs::write(&path, "account = 1\nregion = \"eu\"\n").unwrap();

        let mut store = ConfigStore::load(location(path.clone(), Some(FileFormat::Toml)), &[], &[]).unwrap();
        store.set("access-token", "secret").unwrap();

        let document = read_document(&path, FileFormat::Toml).unwrap();
        assert_eq!(document["account"], Value::from(1));
        assert_eq!(document["region"], Value::String("eu".to_string()));
        assert_eq!(document["access-token"], Value::String("secret".to_string()));
    }

    #[test]
    fn test_set_refuses_to_overwrite_unreadable_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.yaml");
        let original = "access-token: keep-me\nbase-url: http://x\nregion: [oops\n";
        fs::write(&path, original).unwrap();

        let mut store = ConfigStore::load(location(path.clone(), Some(FileFormat::Yaml)), &[], &[]).unwrap();
        let err = store.set("account", "1").unwrap_err();

        assert!(matches!(err, TemplateError::ConfigError(_)));
        assert!(err.to_string().contains("could not be read"));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        assert_eq!(store.get_string("account").unwrap(), "");
    }

    #[test]
    fn test_set_keeps_unknown_keys_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("default.yaml");
        fs::write(&path, "Region: eu\nmy.setting: 1\n").unwrap();

        let mut store = ConfigStore::load(location(path.clone(), Some(FileFormat::Yaml)), &[], &[]).unwrap();
        store.set("account", "1").unwrap();

        let document = read_document(&path, FileFormat::Yaml).unwrap();
        assert_eq!(document.len(), 3);
        assert_eq!(document["Region"], Value::String("eu".to_string()));
        assert_eq!(document["my.setting"], Value::from(1));
        assert_eq!(document["account"], Value::from(1));
        assert!(!document.contains_key("region"));
        assert!(!document.contains_key("my"));
    }

    #[test]
    fn test_read_document_handles_empty_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.yaml");
        fs::write(&path, "").unwrap();

        assert!(read_document(&path, FileFormat::Yaml).unwrap().is_empty());
    }

    #[test]
    fn test_set_with_unsupported_extension_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        let mut store = ConfigStore::new(location(path.clone(), None));

        assert!(matches!(store.set("account", "1"), Err(TemplateError::InvalidArgument(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_entries_lists_every_key() {
        let flags = vec![(OptionKey::AccessToken, "t".to_string())];
        let store = ConfigStore::load(location(PathBuf::from("x.yaml"), Some(FileFormat::Yaml)), &[], &flags).unwrap();

        let entries = store.entries();
        assert_eq!(entries.len(), 4);
        assert!(entries.contains(&(OptionKey::AccessToken, Some((&OptionValue::Text("t".to_string()), Source::Flag)))));
        assert!(entries.contains(&(OptionKey::Account, None)));
    }

    #[test]
    fn test_source_ordering() {
        assert!(Source::Flag > Source::Env);
        assert!(Source::Env > Source::File);
        assert!(Source::File > Source::Default);
        assert_eq!(Source::Env.to_string(), "env");
    }
}
