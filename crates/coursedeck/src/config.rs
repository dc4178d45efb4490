//! Configuration management for coursedeck.
//!
//! Configuration is layered with figment: built-in defaults, then a TOML
//! file, then `COURSEDECK_` environment variables. Nested keys use a double
//! underscore, e.g. `COURSEDECK_CONTENT__SOURCE=sqlite`.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::{ContentRepository, InMemoryRepository};
use crate::error::{Error, Result};
use crate::layout::AssetPolicy;
use crate::resolver::{is_inline, DataUriLoader};
use crate::storage::Storage;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "coursedeck";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "content.db";

/// Environment variable prefix.
const ENV_PREFIX: &str = "COURSEDECK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `COURSEDECK_`)
/// 2. TOML config file at `~/.config/coursedeck/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where course content comes from.
    pub content: ContentConfig,
    /// Image asset handling.
    pub assets: AssetsConfig,
    /// `SQLite` store location.
    pub storage: StorageConfig,
}

/// Which backend serves course content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// The catalog compiled into the binary.
    #[default]
    Builtin,
    /// A JSON catalog file at `content.path`.
    Json,
    /// The `SQLite` store at `storage.database_path`.
    Sqlite,
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Builtin => "builtin",
            Self::Json => "json",
            Self::Sqlite => "sqlite",
        })
    }
}

/// Content-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content backend.
    pub source: ContentSource,
    /// Catalog file for the `json` source.
    pub path: Option<PathBuf>,
}

/// Asset-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory that image paths resolve against.
    /// Defaults to the current directory.
    pub root: Option<PathBuf>,
    /// Inline image used as the terminal fallback.
    pub placeholder: String,
    /// Append the placeholder to every hero candidate list.
    pub append_placeholder: bool,
    /// Class attribute of hero images.
    pub hero_class: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/coursedeck/content.db`
    pub database_path: Option<PathBuf>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        let policy = AssetPolicy::default();
        Self {
            root: None,
            placeholder: policy.placeholder,
            append_placeholder: policy.append_placeholder,
            hero_class: policy.hero_class,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults and the environment apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        debug!(path = %config_file.display(), "loading configuration");

        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The provider stack used by [`Config::load_from`].
    #[must_use]
    pub fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.content.source == ContentSource::Json && self.content.path.is_none() {
            return Err(Error::config_validation(
                "content.path is required when content.source is \"json\"",
            ));
        }

        // The terminal fallback must not need a fetch, and must load
        if !is_inline(&self.assets.placeholder) {
            return Err(Error::config_validation(format!(
                "assets.placeholder must be a data: URI, got {:?}",
                truncate(&self.assets.placeholder, 40)
            )));
        }
        if let Err(e) = DataUriLoader::inspect(&self.assets.placeholder) {
            return Err(Error::config_validation(format!(
                "assets.placeholder is not a loadable image: {e}"
            )));
        }

        if let Some(root) = &self.assets.root {
            if root.as_os_str().is_empty() {
                return Err(Error::config_validation("assets.root cannot be empty"));
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the asset root, defaulting to the current directory.
    #[must_use]
    pub fn asset_root(&self) -> PathBuf {
        self.assets
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Hero image policy for page layouts.
    #[must_use]
    pub fn asset_policy(&self) -> AssetPolicy {
        AssetPolicy {
            placeholder: self.assets.placeholder.clone(),
            append_placeholder: self.assets.append_placeholder,
            hero_class: self.assets.hero_class.clone(),
        }
    }

    /// Open the configured content backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file or database cannot be opened.
    pub fn open_repository(&self) -> Result<Box<dyn ContentRepository>> {
        debug!(source = %self.content.source, "opening content repository");
        match self.content.source {
            ContentSource::Builtin => Ok(Box::new(InMemoryRepository::builtin())),
            ContentSource::Json => {
                let path = self.content.path.as_ref().ok_or_else(|| {
                    Error::config_validation("content.path is required for the json source")
                })?;
                Ok(Box::new(InMemoryRepository::from_json_file(path)?))
            }
            ContentSource::Sqlite => Ok(Box::new(Storage::open(self.database_path())?)),
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::PLACEHOLDER_SVG;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.content.source, ContentSource::Builtin);
        assert!(config.content.path.is_none());
        assert_eq!(config.assets.placeholder, PLACEHOLDER_SVG);
        assert!(config.assets.append_placeholder);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_json_requires_path() {
        let mut config = Config::default();
        config.content.source = ContentSource::Json;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("content.path"));

        config.content.path = Some(PathBuf::from("catalog.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_placeholder_must_be_inline() {
        let mut config = Config::default();
        config.assets.placeholder = "/img/placeholder.png".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("data: URI"));
    }

    #[test]
    fn test_validate_placeholder_must_decode() {
        let mut config = Config::default();

        config.assets.placeholder = "data:image/png;base64,***".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("not a loadable image"), "{err}");

        config.assets.placeholder = "data:text/plain,hello".to_string();
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigValidation { .. })
        ));

        config.assets.placeholder = "data:image/png;base64,".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_malformed_placeholder() {
        let (_dir, path) = write_config("[assets]\nplaceholder = \"data:image/png;base64,***\"\n");
        assert!(matches!(
            Config::load_from(Some(path)),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_validate_empty_asset_root() {
        let mut config = Config::default();
        config.assets.root = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("content.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_asset_root_default() {
        assert_eq!(Config::default().asset_root(), PathBuf::from("."));
    }

    #[test]
    fn test_asset_policy_from_config() {
        let mut config = Config::default();
        config.assets.append_placeholder = false;
        config.assets.hero_class = "banner".to_string();

        let policy = config.asset_policy();
        assert!(!policy.append_placeholder);
        assert_eq!(policy.hero_class, "banner");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("coursedeck"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_toml_sections() {
        let (_dir, path) = write_config(
            r#"
            [content]
            source = "json"
            path = "/srv/catalog.json"

            [assets]
            root = "/srv/public"
            append_placeholder = false

            [storage]
            database_path = "/var/lib/coursedeck.db"
            "#,
        );

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.content.source, ContentSource::Json);
        assert_eq!(config.content.path, Some(PathBuf::from("/srv/catalog.json")));
        assert_eq!(config.asset_root(), PathBuf::from("/srv/public"));
        assert!(!config.assets.append_placeholder);
        // Unset keys keep their defaults
        assert_eq!(config.assets.placeholder, PLACEHOLDER_SVG);
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/coursedeck.db"));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let (_dir, path) = write_config("[content]\nsource = \"json\"\n");
        let result = Config::load_from(Some(path));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_load_rejects_unknown_source() {
        let (_dir, path) = write_config("[content]\nsource = \"ftp\"\n");
        assert!(matches!(
            Config::load_from(Some(path)),
            Err(Error::ConfigLoad(_))
        ));
    }

    #[test]
    fn test_open_builtin_repository() {
        let repo = Config::default().open_repository().unwrap();
        assert!(!repo.list_courses().unwrap().is_empty());
    }

    #[test]
    fn test_open_sqlite_repository() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.content.source = ContentSource::Sqlite;
        config.storage.database_path = Some(dir.path().join("content.db"));

        let repo = config.open_repository().unwrap();
        assert!(repo.list_courses().unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_json_catalog() {
        let mut config = Config::default();
        config.content.source = ContentSource::Json;
        config.content.path = Some(PathBuf::from("/nonexistent/catalog.json"));
        assert!(matches!(
            config.open_repository(),
            Err(Error::CatalogRead { .. })
        ));
    }

    #[test]
    fn test_content_source_serialize() {
        let json = serde_json::to_string(&ContentSource::Sqlite).unwrap();
        assert_eq!(json, "\"sqlite\"");
        assert_eq!(ContentSource::Json.to_string(), "json");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
