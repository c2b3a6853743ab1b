use crate::errors::ClientError;
use std::env;

pub const API_URL_VAR: &str = "REHAB_API_URL";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend root, without a trailing slash.
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_api_url(env::var(API_URL_VAR).ok())
    }

    pub fn from_api_url(raw: Option<String>) -> Result<Self, ClientError> {
        let raw = raw
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = raw.trim_end_matches('/').to_string();

        reqwest::Url::parse(&api_url)
            .map_err(|err| ClientError::Config(format!("{API_URL_VAR}={api_url:?}: {err}")))?;

        Ok(Self { api_url })
    }
}
