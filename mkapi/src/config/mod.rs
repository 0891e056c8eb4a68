//! Configuration management for mkapi
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `MKAPI_` prefix, `__` for nesting)
//! 2. Laravel-style `DB_HOST`, `DB_PORT`, `DB_USERNAME`, `DB_PASSWORD`
//! 3. `./mkapi.toml` (or the file passed to [`MkApiConfig::load_from`])
//! 4. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # mkapi.toml
//! [database]
//! host = "127.0.0.1"
//! port = 3306
//! username = "root"
//! password = ""
//!
//! [project]
//! root = "."
//! models_dir = "app/Models"
//! controllers_dir = "app/Http/Controllers"
//!
//! [artisan]
//! program = "php"
//! script = "artisan"
//! ```

use crate::error::Result;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default local configuration file
pub const LOCAL_CONFIG_FILE: &str = "mkapi.toml";

/// Connection settings for the server hosting the temporary schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// User allowed to create and drop databases
    pub username: String,

    /// Password for `username`
    pub password: String,

    /// Character set of the temporary schema
    pub charset: String,

    /// Collation of the temporary schema
    pub collation: String,

    /// Prefix of the temporary schema name
    pub temp_prefix: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            username: "root".to_string(),
            password: String::new(),
            charset: "utf8mb4".to_string(),
            collation: "utf8mb4_unicode_ci".to_string(),
            temp_prefix: "temp_db_".to_string(),
        }
    }
}

/// Layout of the Laravel project being patched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Project root directory
    pub root: PathBuf,

    /// Model directory, relative to `root`
    pub models_dir: PathBuf,

    /// Controller directory, relative to `root`
    pub controllers_dir: PathBuf,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            models_dir: PathBuf::from("app/Models"),
            controllers_dir: PathBuf::from("app/Http/Controllers"),
        }
    }
}

/// How migrations are replayed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtisanSettings {
    /// Interpreter used to run the console script
    pub program: String,

    /// Console script, relative to the project root
    pub script: String,
}

impl Default for ArtisanSettings {
    fn default() -> Self {
        Self {
            program: "php".to_string(),
            script: "artisan".to_string(),
        }
    }
}

/// Complete mkapi configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MkApiConfig {
    /// Database server settings
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Project layout
    #[serde(default)]
    pub project: ProjectSettings,

    /// Migration runner
    #[serde(default)]
    pub artisan: ArtisanSettings,
}

impl MkApiConfig {
    /// Load configuration from `./mkapi.toml` (when present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - The configuration file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    pub fn load() -> Result<Self> {
        Self::load_from(LOCAL_CONFIG_FILE)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file is not an error; defaults and the environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Default configuration cannot be serialized to TOML
    /// - The configuration file contains invalid TOML syntax
    /// - Configuration values fail type conversion
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let defaults = toml::to_string(&Self::default())
            .map_err(|e| figment::Error::from(e.to_string()))?;

        let config = Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file(path.as_ref()))
            .merge(Self::laravel_env())
            .merge(Env::prefixed("MKAPI_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// `DB_*` variables a Laravel project already exports
    fn laravel_env() -> Env {
        Env::prefixed("DB_").filter_map(|key| {
            let key = key.as_str().to_ascii_lowercase();
            matches!(key.as_str(), "host" | "port" | "username" | "password")
                .then(|| format!("database.{key}").into())
        })
    }

    /// Absolute-or-relative directory holding model classes
    #[must_use]
    pub fn models_path(&self) -> PathBuf {
        self.project.root.join(&self.project.models_dir)
    }

    /// Absolute-or-relative directory holding controller classes
    #[must_use]
    pub fn controllers_path(&self) -> PathBuf {
        self.project.root.join(&self.project.controllers_dir)
    }
}
