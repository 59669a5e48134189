//! Dashboard configuration.
//!
//! Read from an optional TOML file, then overridden by environment
//! variables:
//!
//! | Variable            | File key     | Default                 |
//! |---------------------|--------------|-------------------------|
//! | `NABEEH_API_URL`    | `api_url`    | `http://localhost:8000` |
//! | `NABEEH_LANG`       | `lang`       | `ar`                    |
//! | `NABEEH_STALE_SECS` | `stale_secs` | `30`                    |
//!
//! The file is `nabeeh.toml` in the working directory unless
//! `NABEEH_CONFIG` names another path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nabeeh_cache::DEFAULT_STALE_TIME;
use nabeeh_gateway::{API_URL_ENV, GatewayConfig};
use nabeeh_i18n::Lang;
use serde::Deserialize;
use thiserror::Error;

/// Names an explicit config file.
pub const CONFIG_PATH_ENV: &str = "NABEEH_CONFIG";

/// Config file looked up when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "nabeeh.toml";

/// Display language override.
pub const LANG_ENV: &str = "NABEEH_LANG";

/// Freshness window override, in seconds.
pub const STALE_SECS_ENV: &str = "NABEEH_STALE_SECS";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// An environment variable holds an unusable value.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    api_url: Option<String>,
    lang: Option<Lang>,
    stale_secs: Option<u64>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// API location.
    pub gateway: GatewayConfig,
    /// Display language.
    pub lang: Lang,
    /// How long fetched data counts as fresh.
    pub stale_time: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            lang: Lang::default(),
            stale_time: DEFAULT_STALE_TIME,
        }
    }
}

impl DashboardConfig {
    /// Loads the config file (if any) and applies environment overrides.
    ///
    /// A missing default file is not an error; a missing file named by
    /// [`CONFIG_PATH_ENV`] is.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Read`] if the file cannot be read
    /// * [`ConfigError::Parse`] if the file is malformed
    /// * [`ConfigError::InvalidEnv`] if an override cannot be parsed
    pub fn load() -> Result<Self, ConfigError> {
        let (path, required) = std::env::var(CONFIG_PATH_ENV).map_or_else(
            |_| (PathBuf::from(DEFAULT_CONFIG_PATH), false),
            |path| (PathBuf::from(path), true),
        );

        let file = read_file(&path, required)?;
        Self::from_sources(file.as_deref(), &path, |name| std::env::var(name).ok())
    }

    /// Builds the config from file contents and an environment lookup.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Parse`] if `file` is malformed
    /// * [`ConfigError::InvalidEnv`] if an override cannot be parsed
    pub fn from_sources(
        file: Option<&str>,
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig = match file {
            Some(contents) => {
                toml::de::from_str(contents).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => FileConfig::default(),
        };

        let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let api_url = lookup(API_URL_ENV).or(file.api_url).unwrap_or_default();

        let lang = match lookup(LANG_ENV) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: LANG_ENV,
                value,
            })?,
            None => file.lang.unwrap_or_default(),
        };

        let stale_time = match lookup(STALE_SECS_ENV) {
            Some(value) => value
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidEnv {
                    name: STALE_SECS_ENV,
                    value,
                })?,
            None => file
                .stale_secs
                .map_or(DEFAULT_STALE_TIME, Duration::from_secs),
        };

        Ok(Self {
            gateway: GatewayConfig::new(&api_url),
            lang,
            stale_time,
        })
    }
}

fn read_file(path: &Path, required: bool) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            log::debug!("Loaded config from {}", path.display());
            Ok(Some(contents))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            log::trace!("No config file at {}", path.display());
            Ok(None)
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
