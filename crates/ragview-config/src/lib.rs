//! Configuration loading for ragview.
//! Reads ragview.toml (or ragview.yaml) from the current directory or the path
//! in the RAGVIEW_CONFIG env var, then applies RAGVIEW_* environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Highest community level accepted by the query engine settings.
pub const MAX_COMMUNITY_LEVEL: u8 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("invalid TOML in {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },

    #[error("invalid YAML in {path}: {source}")]
    Yaml { path: PathBuf, source: serde_yaml::Error },

    #[error("unsupported config format: {0}")]
    Format(PathBuf),

    #[error("invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub query: QueryEngineConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Settings shared by both explorer panes. Editable at runtime from the UI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    #[serde(default = "default_community_level")]
    pub community_level: u8,
    #[serde(default = "default_response_type")]
    pub response_type: String,
}

fn default_root_dir()        -> PathBuf { PathBuf::from("./ragtest") }
fn default_community_level() -> u8      { 2 }
fn default_response_type()   -> String  { "Multiple Paragraphs".to_string() }

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            community_level: default_community_level(),
            response_type: default_response_type(),
        }
    }
}

impl ExplorerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.community_level > MAX_COMMUNITY_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "community_level must be between 0 and {MAX_COMMUNITY_LEVEL}, got {}",
                self.community_level
            )));
        }
        if self.root_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("root_dir must not be empty".to_string()));
        }
        Ok(())
    }
}

/// How the external query engine is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEngineConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Leading arguments placed before the engine flags.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Kill the engine after this many seconds. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_program() -> String      { "python".to_string() }
fn default_args()    -> Vec<String> { vec!["-m".to_string(), "graphrag.query".to_string()] }

impl Default for QueryEngineConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 8501 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Config {
    /// Load configuration from disk and environment.
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let explicit = std::env::var("RAGVIEW_CONFIG").ok().map(PathBuf::from);
        let candidate = explicit.or_else(|| {
            ["ragview.toml", "ragview.yaml", "ragview.yml"]
                .iter()
                .map(PathBuf::from)
                .find(|p| p.exists())
        });

        let mut config = match candidate {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.explorer.validate()?;
        Ok(config)
    }

    /// Parse a TOML or YAML config file, chosen by extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            }),
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            _ => Err(ConfigError::Format(path.to_path_buf())),
        }
    }

    /// Apply RAGVIEW_* overrides using the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("RAGVIEW_ROOT") {
            self.explorer.root_dir = PathBuf::from(root);
        }
        if let Some(host) = lookup("RAGVIEW_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RAGVIEW_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Env { key: "RAGVIEW_PORT", value: port })?;
        }
        if let Some(secs) = lookup("RAGVIEW_QUERY_TIMEOUT") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| ConfigError::Env { key: "RAGVIEW_QUERY_TIMEOUT", value: secs })?;
            self.query.timeout_secs = (secs > 0).then_some(secs);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
