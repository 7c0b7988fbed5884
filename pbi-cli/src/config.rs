use anyhow::{Context, Result};
use pbi_client::{ClientConfig, DEFAULT_API_URL};
use pbi_reconciler::DesiredWorkspace;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection settings read from `config.yaml`.
///
/// Fields missing from the file fall back to `PBI_API_URL`,
/// `PBI_ACCESS_TOKEN` and `PBI_TIMEOUT_SECS`, then to built-in defaults.
/// An unparsable `PBI_TIMEOUT_SECS` fails the load.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_access_token")]
    pub access_token: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    std::env::var("PBI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

fn default_access_token() -> Option<String> {
    std::env::var("PBI_ACCESS_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
}

fn timeout_secs_from_env() -> Result<Option<u64>> {
    parse_timeout_secs(std::env::var("PBI_TIMEOUT_SECS").ok().as_deref())
}

fn parse_timeout_secs(raw: Option<&str>) -> Result<Option<u64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid PBI_TIMEOUT_SECS '{value}': expected whole seconds")),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            access_token: default_access_token(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load from an explicit path, else from the default location if it
    /// exists, else from the environment alone
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from_path(&path)?,
                _ => Self::default(),
            },
        };
        config.with_env_timeout()
    }

    fn with_env_timeout(mut self) -> Result<Self> {
        if self.timeout_secs.is_none() {
            self.timeout_secs = timeout_secs_from_env()?;
        }
        Ok(self)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        // An empty file is a valid, all-defaults config
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.api_url)
            .with_context(|| format!("Invalid api_url '{}'", self.api_url))?;
        if let Some(token) = &self.access_token {
            config = config.with_access_token(token.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pbi").join("config.yaml"))
}

/// Read a desired workspace declaration (`name`, optional `capacity`)
pub fn load_desired(path: &Path) -> Result<DesiredWorkspace> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse workspace declaration {}", path.display()))
}
