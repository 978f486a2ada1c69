//! Client configuration: where the historian lives and how long to wait for it.
//!
//! [`Config::from_file`] reads a JSON document; missing fields fall back to
//! the defaults in [`crate::constants`]. [`Config::with_env`] applies the
//! `WW_BASE_URL` and `WW_TIMEOUT` overrides on top.

use crate::constants::*;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// The historian query pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CurrentValue,
    Trend,
    TrendPivot,
    TimeValue,
    Lims,
}

/// Endpoint paths, relative to the base URL or absolute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub current_value: String,
    pub trend: String,
    pub trend_pivot: String,
    pub time_value: String,
    pub lims: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            current_value: DEFAULT_CURRENT_VALUE_PATH.to_string(),
            trend: DEFAULT_TREND_PATH.to_string(),
            trend_pivot: DEFAULT_TREND_PIVOT_PATH.to_string(),
            time_value: DEFAULT_TIME_VALUE_PATH.to_string(),
            lims: DEFAULT_LIMS_PATH.to_string(),
        }
    }
}

impl Endpoints {
    pub fn path(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::CurrentValue => &self.current_value,
            Endpoint::Trend => &self.trend,
            Endpoint::TrendPivot => &self.trend_pivot,
            Endpoint::TimeValue => &self.time_value,
            Endpoint::Lims => &self.lims,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub endpoints: Endpoints,
    /// `null` disables the request timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> Option<Duration> {
    Some(DEFAULT_TIMEOUT)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoints: Endpoints::default(),
            timeout: default_timeout(),
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Applies `WW_BASE_URL` and `WW_TIMEOUT` from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            self.timeout = parse_timeout(&raw)?;
        }
        Ok(self)
    }

    /// Full URL of one endpoint.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("Base URL cannot be empty".to_string()));
        }

        // Without the trailing slash `join` would drop the last base segment.
        let base = if self.base_url.ends_with('/') {
            Url::parse(&self.base_url)?
        } else {
            Url::parse(&format!("{}/", self.base_url))?
        };
        Ok(base.join(self.endpoints.path(endpoint))?)
    }
}

/// Parses a human readable duration such as `30s` or `2m`; `none` or `off`
/// disables the timeout.
pub fn parse_timeout(raw: &str) -> Result<Option<Duration>> {
    match raw.trim() {
        "" | "none" | "off" => Ok(None),
        value => humantime_serde::deserialize::<Duration, _>(serde_json::Value::String(
            value.to_string(),
        ))
        .map(Some)
        .map_err(|e| Error::Config(format!("Invalid timeout '{}': {}", value, e))),
    }
}
