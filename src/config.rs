// ABOUTME: Export configuration and the optional TOML profile file
// ABOUTME: Merges profile values with command-line overrides into one immutable config

use crate::error::ExportError;
use crate::i18n::Language;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_MAX_ROWS: u64 = 1000;
pub const DEFAULT_OUTPUT: &str = "./output";

pub const SCHEMA_FILE: &str = "schema.sql";
pub const DATA_FILE: &str = "data.sql";
pub const ARCHIVE_FILE: &str = "export.zip";

/// Everything one export run needs; built once, never mutated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_rows: u64,
    pub output: PathBuf,
    pub compress: bool,
    pub language: Language,
    /// Treat view query/read failures as fatal, like tables
    pub strict_views: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            database: String::new(),
            max_rows: DEFAULT_MAX_ROWS,
            output: PathBuf::from(DEFAULT_OUTPUT),
            compress: true,
            language: Language::En,
            strict_views: false,
        }
    }
}

impl ExportConfig {
    /// Build a config from profile values, then command-line overrides.
    ///
    /// `locale` (normally `$LANG`) only decides the language when neither the
    /// command line nor the profile names one.
    pub fn resolve(profile: Profile, overrides: ConfigOverrides, locale: Option<&str>) -> Self {
        let defaults = ExportConfig::default();
        let conn = profile.connection;
        let export = profile.export;

        Self {
            host: overrides.host.or(conn.host).unwrap_or(defaults.host),
            port: overrides.port.or(conn.port).unwrap_or(defaults.port),
            user: overrides.user.or(conn.user).unwrap_or(defaults.user),
            password: overrides
                .password
                .or(conn.password)
                .unwrap_or(defaults.password),
            database: overrides
                .database
                .or(conn.database)
                .unwrap_or(defaults.database),
            max_rows: overrides.rows.or(export.rows).unwrap_or(defaults.max_rows),
            output: overrides
                .output
                .or(export.output)
                .unwrap_or(defaults.output),
            compress: overrides
                .compress
                .or(export.compress)
                .unwrap_or(defaults.compress),
            language: overrides
                .language
                .or(export.lang)
                .unwrap_or_else(|| Language::from_locale(locale)),
            strict_views: overrides.strict_views || export.strict_views.unwrap_or(false),
        }
    }

    /// Reject configurations that cannot produce a dump
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.database.trim().is_empty() {
            return Err(ExportError::Config(
                "database name is required (--database or [connection].database)".to_string(),
            ));
        }
        if self.host.trim().is_empty() {
            return Err(ExportError::Config("host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ExportError::Config("port must be between 1 and 65535".to_string()));
        }
        if self.max_rows == 0 {
            return Err(ExportError::Config(
                "rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port`, for messages
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.output.join(SCHEMA_FILE)
    }

    pub fn data_path(&self) -> PathBuf {
        self.output.join(DATA_FILE)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output.join(ARCHIVE_FILE)
    }
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub rows: Option<u64>,
    pub output: Option<PathBuf>,
    pub compress: Option<bool>,
    pub language: Option<Language>,
    pub strict_views: bool,
}

/// Contents of a TOML profile file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub connection: ConnectionProfile,
    #[serde(default)]
    pub export: ExportProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionProfile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportProfile {
    pub rows: Option<u64>,
    pub output: Option<PathBuf>,
    pub compress: Option<bool>,
    pub lang: Option<Language>,
    pub strict_views: Option<bool>,
}

pub fn load_profile(path: &Path) -> Result<Profile, ExportError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ExportError::filesystem(path, "read config file", e))?;
    toml::from_str(&raw).map_err(|e| {
        ExportError::Config(format!("failed to parse TOML config at {}: {}", path.display(), e))
    })
}
