//! Layered configuration: TOML file, then environment, then command-line flags

use crate::api::Credentials;
use crate::api::constants::{DEFAULT_AUTHORITY_HOST, DEFAULT_CHUNKSIZE};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_CLIENT_ID: &str = "M365_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "M365_CLIENT_SECRET";
pub const ENV_TENANT_ID: &str = "M365_TENANT_ID";
pub const ENV_BASE_URL: &str = "M365_BASE_URL";
pub const ENV_AUTHORITY_HOST: &str = "M365_AUTHORITY_HOST";
pub const ENV_CHUNKSIZE: &str = "M365_CHUNKSIZE";

/// Connection settings. Every field is optional until resolved.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
    pub base_url: Option<String>,
    pub authority_host: Option<String>,
    pub chunksize: Option<u32>,
}

impl Config {
    /// `<config_dir>/m365-cli/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("m365-cli").join("config.toml"))
    }

    /// Load the config file, then apply process environment overrides.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };

        config.merge_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields with non-empty values returned by `lookup`
    pub fn merge_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(value) = get(ENV_CLIENT_ID) {
            self.client_id = Some(value);
        }
        if let Some(value) = get(ENV_CLIENT_SECRET) {
            self.client_secret = Some(value);
        }
        if let Some(value) = get(ENV_TENANT_ID) {
            self.tenant_id = Some(value);
        }
        if let Some(value) = get(ENV_BASE_URL) {
            self.base_url = Some(value);
        }
        if let Some(value) = get(ENV_AUTHORITY_HOST) {
            self.authority_host = Some(value);
        }
        if let Some(value) = get(ENV_CHUNKSIZE) {
            let chunksize = value
                .parse()
                .with_context(|| format!("{} must be a positive integer, got '{}'", ENV_CHUNKSIZE, value))?;
            self.chunksize = Some(chunksize);
        }

        Ok(())
    }

    /// Resolve credentials, naming every missing setting in the error
    pub fn credentials(&self) -> Result<Credentials> {
        let fields = [
            (&self.client_id, "client_id", ENV_CLIENT_ID),
            (&self.client_secret, "client_secret", ENV_CLIENT_SECRET),
            (&self.tenant_id, "tenant_id", ENV_TENANT_ID),
            (&self.base_url, "base_url", ENV_BASE_URL),
        ];

        let missing: Vec<String> = fields
            .iter()
            .filter(|(value, _, _)| value.as_deref().is_none_or(str::is_empty))
            .map(|(_, key, env)| format!("{} ({})", key, env))
            .collect();

        if !missing.is_empty() {
            anyhow::bail!("Missing configuration: {}", missing.join(", "));
        }

        Ok(Credentials::new(
            self.client_id.clone().unwrap_or_default(),
            self.client_secret.clone().unwrap_or_default(),
            self.tenant_id.clone().unwrap_or_default(),
            self.base_url
                .as_deref()
                .unwrap_or_default()
                .trim_end_matches('/'),
        ))
    }

    pub fn authority_host(&self) -> &str {
        self.authority_host.as_deref().unwrap_or(DEFAULT_AUTHORITY_HOST)
    }

    pub fn chunksize(&self) -> u32 {
        self.chunksize.unwrap_or(DEFAULT_CHUNKSIZE)
    }
}
