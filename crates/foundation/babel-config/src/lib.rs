//! Babel configuration
//!
//! Resolution order, later wins:
//! 1. built-in defaults
//! 2. YAML file (`$BABEL_CONFIG`, else `<config dir>/babel/config.yaml`)
//! 3. `BABEL_*` environment variables

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const CONFIG_ENV: &str = "BABEL_CONFIG";
pub const LINK_BASE_ENV: &str = "BABEL_LINK_BASE";
pub const LOG_ENV: &str = "BABEL_LOG";
pub const LOG_JSON_ENV: &str = "BABEL_LOG_JSON";
pub const LINE_WIDTH_ENV: &str = "BABEL_LINE_WIDTH";

const MIN_LINE_WIDTH: usize = 16;
const MAX_LINE_WIDTH: usize = 3200;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `babel=debug`
    pub filter: String,

    /// Emit JSON lines instead of the human format
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "babel_cli=info,babel_core=warn".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BabelConfig {
    /// Page that share links point at; the fragment is appended
    pub link_base: String,

    /// Characters per line when printing a page
    pub line_width: usize,

    /// Highlight the snippet when printing to a terminal
    pub highlight: bool,

    pub log: LogConfig,
}

impl Default for BabelConfig {
    fn default() -> Self {
        Self {
            link_base: "https://libraryofbabel.local/browse.html".to_string(),
            line_width: 80,
            highlight: true,
            log: LogConfig::default(),
        }
    }
}

impl BabelConfig {
    /// Defaults, then the config file if present, then the environment
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// An explicit file, then the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// `$BABEL_CONFIG`, else `<config dir>/babel/config.yaml`
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("babel").join("config.yaml"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Apply `BABEL_*` overrides; `lookup` is `std::env::var` outside tests
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(LINK_BASE_ENV) {
            self.link_base = base;
        }
        if let Some(filter) = lookup(LOG_ENV) {
            self.log.filter = filter;
        }
        if let Some(json) = lookup(LOG_JSON_ENV) {
            self.log.json = parse_bool(LOG_JSON_ENV, &json)?;
        }
        if let Some(width) = lookup(LINE_WIDTH_ENV) {
            self.line_width = width.trim().parse().map_err(|_| ConfigError::Invalid {
                key: LINE_WIDTH_ENV,
                reason: format!("{:?} is not a number", width),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.link_base_url()?;

        if !(MIN_LINE_WIDTH..=MAX_LINE_WIDTH).contains(&self.line_width) {
            return Err(ConfigError::Invalid {
                key: "line_width",
                reason: format!(
                    "{} is outside {}..={}",
                    self.line_width, MIN_LINE_WIDTH, MAX_LINE_WIDTH
                ),
            });
        }
        Ok(())
    }

    pub fn link_base_url(&self) -> Result<Url> {
        Url::parse(&self.link_base).map_err(|e| ConfigError::Invalid {
            key: "link_base",
            reason: e.to_string(),
        })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("{:?} is not a boolean", other),
        }),
    }
}
