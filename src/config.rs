use std::path::PathBuf;

use reqwest::Url;
use thiserror::Error;

pub const ENDPOINT_VAR: &str = "LANGUAGE_ENDPOINT";
pub const KEY_VAR: &str = "LANGUAGE_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("缺少环境变量: {0}")]
    MissingVar(&'static str),
    #[error("LANGUAGE_ENDPOINT 不是有效的 URL: {0}")]
    InvalidEndpoint(String),
}

/// Everything one run needs, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub endpoint: Url,
    pub key: String,
}

impl Config {
    /// `lookup` is normally `std::env::var`.
    pub fn from_lookup<F>(input: PathBuf, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let key = present(KEY_VAR)?;
        let raw_endpoint = present(ENDPOINT_VAR)?;
        let endpoint = Url::parse(raw_endpoint.trim())
            .map_err(|_| ConfigError::InvalidEndpoint(raw_endpoint.clone()))?;

        Ok(Self {
            input,
            endpoint,
            key,
        })
    }
}
