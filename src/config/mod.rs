//! Site configuration management for `zenpad.toml`.
//!
//! The config file is optional. Each top-level table is an environment
//! block merged over the built-in defaults:
//!
//! ```toml
//! [default]
//! site_name = "My Blog"
//! locale = "en"
//!
//! [prod]
//! site_url = "https://example.com/"
//! build_path = "public"
//! ```
//!
//! Merging is shallow: a key in the block replaces the key of the same
//! name, everything else is kept. Switching environment merges the new
//! block over the *current* config, so switches accumulate.

pub mod defaults;
mod error;

pub use error::ConfigError;

use educe::Educe;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Defaults
// ============================================================================

/// Built-in option set, every key is always present in a [`Config`].
#[derive(Debug, Clone, Educe, Serialize)]
#[educe(Default)]
struct DefaultConfig {
    /// Output directory, relative to the project root
    #[educe(Default = defaults::build_path())]
    build_path: String,

    /// Source directory, relative to the project root
    #[educe(Default = defaults::src_path())]
    src_path: String,

    /// Layouts directory inside `src_path`
    #[educe(Default = defaults::templates_dir())]
    templates_dir: String,

    /// Widgets directory inside `src_path`
    #[educe(Default = defaults::widgets_dir())]
    widgets_dir: String,

    /// Plugins directory inside `src_path`
    #[educe(Default = defaults::plugins_dir())]
    plugins_dir: String,

    /// Chunks directory inside `src_path`
    #[educe(Default = defaults::chunks_dir())]
    chunks_dir: String,

    /// Documents directory inside `src_path`
    #[educe(Default = defaults::docs_dir())]
    docs_dir: String,

    /// Locale used by the `date` helper, e.g.: "en", "fr_FR"
    #[educe(Default = defaults::locale())]
    locale: String,

    #[educe(Default = defaults::site_name())]
    site_name: String,

    #[educe(Default = defaults::site_url())]
    site_url: String,

    /// Marker used by the `cut` helper
    #[educe(Default = defaults::cut_tag())]
    cut_tag: String,
}

/// Options that must hold strings, checked after every merge.
const STRING_OPTIONS: &[&str] = &[
    "build_path",
    "src_path",
    "templates_dir",
    "widgets_dir",
    "plugins_dir",
    "chunks_dir",
    "docs_dir",
    "locale",
    "site_name",
    "site_url",
    "cut_tag",
];

// ============================================================================
// Config
// ============================================================================

/// Directories under the source root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDir {
    Docs,
    Templates,
    Chunks,
    Widgets,
    Plugins,
}

impl SourceDir {
    const fn key(self) -> &'static str {
        match self {
            Self::Docs => "docs_dir",
            Self::Templates => "templates_dir",
            Self::Chunks => "chunks_dir",
            Self::Widgets => "widgets_dir",
            Self::Plugins => "plugins_dir",
        }
    }
}

/// Open option map: the defaults plus whatever the environment blocks add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    values: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        let values = match serde_json::to_value(DefaultConfig::default()) {
            Ok(Value::Object(values)) => values,
            _ => Map::new(),
        };
        Self { values }
    }
}

impl Config {
    /// Config holding exactly `values`, without defaults.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Shallow merge: keys of `block` replace keys of the same name.
    pub fn merge(&mut self, block: &Map<String, Value>) {
        for (key, value) in block {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Check that every known option still holds a string.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in STRING_OPTIONS {
            if let Some(value) = self.values.get(*key)
                && !value.is_string()
            {
                return Err(ConfigError::Validation(format!(
                    "`{key}` must be a string, got `{value}`"
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Config as a template value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    pub fn locale(&self) -> &str {
        self.get_str("locale").unwrap_or_default()
    }

    pub fn cut_tag(&self) -> &str {
        self.get_str("cut_tag").unwrap_or_default()
    }

    pub fn site_name(&self) -> &str {
        self.get_str("site_name").unwrap_or_default()
    }

    pub fn site_url(&self) -> &str {
        self.get_str("site_url").unwrap_or_default()
    }

    /// `<root>/<src_path>/<dir>`
    pub fn source_dir(&self, root: &Path, dir: SourceDir) -> PathBuf {
        root.join(self.get_str("src_path").unwrap_or_default())
            .join(self.get_str(dir.key()).unwrap_or_default())
    }

    /// `<root>/<build_path>`
    pub fn build_dir(&self, root: &Path) -> PathBuf {
        root.join(self.get_str("build_path").unwrap_or_default())
    }
}

// ============================================================================
// Environment blocks
// ============================================================================

/// Parsed config file: environment name -> override block.
#[derive(Debug, Clone, Default)]
pub struct Environments {
    origin: PathBuf,
    blocks: Map<String, Value>,
}

impl Environments {
    /// Parse environment blocks from TOML text.
    pub fn from_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let blocks: Map<String, Value> = toml::from_str(content)
            .map_err(|err| ConfigError::Toml(origin.to_path_buf(), err))?;
        Ok(Self {
            origin: origin.to_path_buf(),
            blocks,
        })
    }

    /// Read environment blocks, `None` when the file does not exist.
    pub fn from_path(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content, path).map(Some)
    }

    /// Override block for `env`. An absent block is an empty override.
    pub fn block(&self, env: &str) -> Result<Option<&Map<String, Value>>, ConfigError> {
        match self.blocks.get(env) {
            None => Ok(None),
            Some(Value::Object(block)) => Ok(Some(block)),
            Some(_) => Err(ConfigError::EnvironmentBlock {
                env: env.to_owned(),
                path: self.origin.clone(),
            }),
        }
    }
}

/// Merge the `env` block over `base`.
pub fn resolve(mut base: Config, envs: &Environments, env: &str) -> Result<Config, ConfigError> {
    if let Some(block) = envs.block(env)? {
        base.merge(block);
    }
    base.validate()?;
    Ok(base)
}

// ============================================================================
// Settings
// ============================================================================

/// Active environment name together with its merged config.
#[derive(Debug, Clone)]
pub struct Settings {
    pub env: String,
    pub config: Config,
}

impl Settings {
    /// Defaults merged with the `default` block of `file`, if it exists.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let env = defaults::environment();
        let envs = match file {
            Some(path) => Environments::from_path(path)?.unwrap_or_default(),
            None => Environments::default(),
        };
        let config = resolve(Config::default(), &envs, &env)?;
        Ok(Self { env, config })
    }

    /// Re-read `file` and merge the `env` block over the current config.
    ///
    /// Returns `None` when there is no config file to switch from.
    pub fn switch(&self, file: Option<&Path>, env: &str) -> Result<Option<Self>, ConfigError> {
        let Some(envs) = file.map(Environments::from_path).transpose()?.flatten() else {
            return Ok(None);
        };
        let config = resolve(self.config.clone(), &envs, env)?;
        Ok(Some(Self {
            env: env.to_owned(),
            config,
        }))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: defaults::environment(),
            config: Config::default(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_defaults_contain_every_option() {
        let config = Config::default();
        for key in STRING_OPTIONS {
            assert!(config.get_str(key).is_some(), "missing {key}");
        }
        assert_eq!(config.get_str("build_path"), Some("build"));
        assert_eq!(config.get_str("templates_dir"), Some("layouts"));
        assert_eq!(config.cut_tag(), "<!-- cut -->");
        assert_eq!(config.locale(), "en");
        assert_eq!(config.site_name(), "ZenPad");
        assert_eq!(config.site_url(), "http://localhost:8080/");
    }

    #[test]
    fn test_merge_is_shallow_override() {
        let mut config = Config::from_map(map(json!({"a": 1, "b": 2})));
        config.merge(&map(json!({"b": 3, "c": 4})));
        assert_eq!(config.as_map(), &map(json!({"a": 1, "b": 3, "c": 4})));
    }

    #[test]
    fn test_merge_replaces_nested_values_whole() {
        let mut config = Config::from_map(map(json!({"nav": {"home": "/", "blog": "/blog"}})));
        config.merge(&map(json!({"nav": {"home": "/index"}})));
        assert_eq!(config.get("nav"), Some(&json!({"home": "/index"})));
    }

    #[test]
    fn test_resolve_keeps_defaults() {
        let envs = Environments::from_str(
            "[default]\nsite_name = \"Blog\"\n",
            Path::new("zenpad.toml"),
        )
        .unwrap();
        let config = resolve(Config::default(), &envs, "default").unwrap();
        assert_eq!(config.site_name(), "Blog");
        assert_eq!(config.get_str("docs_dir"), Some("docs"));
    }

    #[test]
    fn test_resolve_missing_block_is_noop() {
        let envs = Environments::default();
        let config = resolve(Config::default(), &envs, "staging").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_resolve_rejects_non_string_paths() {
        let envs =
            Environments::from_str("[default]\nbuild_path = 3\n", Path::new("zenpad.toml")).unwrap();
        let result = resolve(Config::default(), &envs, "default");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_block_must_be_table() {
        let envs = Environments::from_str("prod = 1\n", Path::new("zenpad.toml")).unwrap();
        assert!(matches!(
            envs.block("prod"),
            Err(ConfigError::EnvironmentBlock { env, path })
                if env == "prod" && path == Path::new("zenpad.toml")
        ));
        assert!(envs.block("default").unwrap().is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let result = Environments::from_str("[default\nsite_name = 1", Path::new("zenpad.toml"));
        assert!(matches!(result, Err(ConfigError::Toml(..))));
    }

    #[test]
    fn test_settings_without_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.env, "default");
        assert_eq!(settings.config, Config::default());
        assert!(settings.switch(None, "prod").unwrap().is_none());
    }

    #[test]
    fn test_settings_missing_file_disables_switch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zenpad.toml");
        let settings = Settings::load(Some(&path)).unwrap();
        assert!(settings.switch(Some(&path), "prod").unwrap().is_none());
    }

    #[test]
    fn test_settings_switch_is_cumulative() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zenpad.toml");
        fs::write(
            &path,
            r#"
            [default]
            a = 1
            b = 2

            [prod]
            b = 3
            c = 4

            [cdn]
            d = 5
            "#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        let prod = settings.switch(Some(&path), "prod").unwrap().unwrap();
        assert_eq!(prod.env, "prod");
        assert_eq!(prod.config.get("a"), Some(&json!(1)));
        assert_eq!(prod.config.get("b"), Some(&json!(3)));
        assert_eq!(prod.config.get("c"), Some(&json!(4)));

        let cdn = prod.switch(Some(&path), "cdn").unwrap().unwrap();
        assert_eq!(cdn.env, "cdn");
        assert_eq!(cdn.config.get("b"), Some(&json!(3)));
        assert_eq!(cdn.config.get("c"), Some(&json!(4)));
        assert_eq!(cdn.config.get("d"), Some(&json!(5)));
    }

    #[test]
    fn test_source_dirs() {
        let config = Config::default();
        let root = Path::new("/site");
        assert_eq!(
            config.source_dir(root, SourceDir::Docs),
            PathBuf::from("/site/src/docs")
        );
        assert_eq!(
            config.source_dir(root, SourceDir::Templates),
            PathBuf::from("/site/src/layouts")
        );
        assert_eq!(config.build_dir(root), PathBuf::from("/site/build"));
    }
}
