//! Engine configuration used when the shim builds its own `ureq::Agent`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;

const ENV_TIMEOUT_GLOBAL: &str = "SHIM_TIMEOUT_GLOBAL_SECS";
const ENV_TIMEOUT_CONNECT: &str = "SHIM_TIMEOUT_CONNECT_SECS";
const ENV_MAX_REDIRECTS: &str = "SHIM_MAX_REDIRECTS";

/// Minimal knobs for the underlying engine. Anything richer should be set on
/// a `ureq::Agent` directly and passed to `UreqClient::with_agent`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound for a whole call, including redirects and the body.
    pub timeout_global_secs: Option<u64>,
    pub timeout_connect_secs: Option<u64>,
    pub max_redirects: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_global_secs: None,
            timeout_connect_secs: None,
            max_redirects: 10,
        }
    }
}

impl EngineConfig {
    /// Read the configuration from `SHIM_*` environment variables, falling
    /// back to the defaults for unset ones.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let defaults = Self::default();
        Ok(Self {
            timeout_global_secs: parse_var(&lookup, ENV_TIMEOUT_GLOBAL)?,
            timeout_connect_secs: parse_var(&lookup, ENV_TIMEOUT_CONNECT)?,
            max_redirects: parse_var(&lookup, ENV_MAX_REDIRECTS)?
                .unwrap_or(defaults.max_redirects),
        })
    }

    /// Build an agent from this configuration.
    ///
    /// Status codes are never turned into errors: a 404 or 500 comes back
    /// as a normal response.
    pub fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(self.timeout_global_secs.map(Duration::from_secs))
            .timeout_connect(self.timeout_connect_secs.map(Duration::from_secs))
            .max_redirects(self.max_redirects)
            .build()
            .new_agent()
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ClientError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::InvalidConfig(format!("{key}={raw:?} is not a valid number"))),
    }
}
