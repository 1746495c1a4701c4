//! TOML-based configuration system for ClassKeeper.
//!
//! All sensitive values (the catalog password, the store passphrase) are
//! stored as `_env` fields that reference environment variable names. The
//! actual secrets are resolved at runtime via
//! [`AppConfig::resolve_env_vars`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// General run settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// School catalog (relational store) settings.
    pub catalog: CatalogConfig,

    /// Directory service settings.
    pub directory: DirectoryConfig,

    /// Credential backup store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

// ---------------------------------------------------------------------------
// General
// ---------------------------------------------------------------------------

/// General run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for persistent data (the credential history file).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/classkeeper")
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// School catalog connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog server host name or address.
    pub host: String,

    /// Catalog database name.
    pub database: String,

    /// Catalog username for authentication.
    pub username: String,

    /// Environment variable holding the catalog password.
    pub password_env: String,

    /// Resolved password (never serialized).
    #[serde(skip)]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Directory service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory server host name or address.
    pub host: String,

    /// Mail/UPN domain appended to derived logins
    /// (e.g. `school.example`).
    pub domain: String,

    /// Base distinguished name of the managed subtree.
    pub base_dn: String,

    /// Bind username.
    pub username: String,

    /// Environment variable holding the bind password.
    pub password_env: String,

    /// Resolved password (never serialized).
    #[serde(skip)]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

/// Credential backup store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// History file name inside `general.data_dir`.
    #[serde(default = "default_store_file")]
    pub file: String,

    /// Environment variable holding the store passphrase.
    #[serde(default = "default_passphrase_env")]
    pub passphrase_env: String,

    /// Resolved passphrase (never serialized).
    #[serde(skip)]
    pub passphrase: Option<String>,
}

fn default_store_file() -> String {
    crate::store::DEFAULT_STORE_FILE.into()
}
fn default_passphrase_env() -> String {
    "CLASSKEEPER_STORE_PASSPHRASE".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: default_store_file(),
            passphrase_env: default_passphrase_env(),
            passphrase: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    ///
    /// This does **not** resolve environment variables -- call
    /// [`resolve_env_vars`](Self::resolve_env_vars) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Resolve all `*_env` fields from environment variables.
    ///
    /// Fields that reference a missing variable log a warning but do
    /// **not** fail -- callers check the `Option` fields and decide what
    /// is required for their execution mode.
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        info!("resolving environment variable references in config");

        self.catalog.password =
            resolve_optional_env(&self.catalog.password_env, "catalog.password_env");
        self.directory.password =
            resolve_optional_env(&self.directory.password_env, "directory.password_env");
        self.store.passphrase =
            resolve_optional_env(&self.store.passphrase_env, "store.passphrase_env");

        debug!("environment variable resolution complete");
        Ok(())
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "catalog.host".into(),
                detail: "catalog host must not be empty".into(),
            });
        }
        if self.catalog.database.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "catalog.database".into(),
                detail: "catalog database must not be empty".into(),
            });
        }
        if self.directory.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "directory.host".into(),
                detail: "directory host must not be empty".into(),
            });
        }
        if self.directory.domain.is_empty() || self.directory.domain.contains('@') {
            return Err(ConfigError::InvalidValue {
                field: "directory.domain".into(),
                detail: "domain must be a bare DNS name, without '@'".into(),
            });
        }
        if self.directory.base_dn.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "directory.base_dn".into(),
                detail: "base DN must not be empty".into(),
            });
        }
        if self.store.file.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.file".into(),
                detail: "store file name must not be empty".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load, resolve, and validate in one call.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Full path of the credential history file.
    pub fn store_path(&self) -> PathBuf {
        self.general.data_dir.join(&self.store.file)
    }
}

/// Try to read an environment variable by name. Returns `Some(value)` on
/// success; logs a warning and returns `None` if the variable is unset.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => {
            warn!(field, env_name, "env var not set");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[general]
log_level = "debug"
data_dir = "/tmp/classkeeper"

[catalog]
host = "db.school.example"
database = "bakalari"
username = "keeper"
password_env = "CATALOG_PASSWORD"

[directory]
host = "dc.school.example"
domain = "school.example"
base_dn = "OU=Uzivatele,DC=zs,DC=local"
username = "keeper@zs.local"
password_env = "DIRECTORY_PASSWORD"

[store]
file = "users.dat"
passphrase_env = "STORE_PASSPHRASE"
"#
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(sample_toml());
        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.catalog.database, "bakalari");
        assert_eq!(config.directory.domain, "school.example");
        assert_eq!(config.store_path(), PathBuf::from("/tmp/classkeeper/users.dat"));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load_from_file("/no/such/classkeeper.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let minimal = r#"
[catalog]
host = "db.school.example"
database = "bakalari"
username = "keeper"
password_env = "CATALOG_PASSWORD"

[directory]
host = "dc.school.example"
domain = "school.example"
base_dn = "OU=Uzivatele,DC=zs,DC=local"
username = "keeper@zs.local"
password_env = "DIRECTORY_PASSWORD"
"#;
        let file = write_config(minimal);
        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.store.file, "users.dat");
        assert_eq!(config.store.passphrase_env, "CLASSKEEPER_STORE_PASSPHRASE");
    }

    #[test]
    fn test_validate_rejects_bad_domain() {
        let file = write_config(sample_toml());
        let mut config = AppConfig::load_from_file(file.path()).unwrap();
        config.directory.domain = "@school.example".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "directory.domain"));
    }

    #[test]
    fn test_validate_accepts_sample() {
        let file = write_config(sample_toml());
        let config = AppConfig::load_from_file(file.path()).unwrap();
        config.validate().unwrap();
    }
}
