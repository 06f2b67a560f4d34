//! Client configuration, assembled from defaults and environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `DIGITIZER_API_URL` | [`DEFAULT_API_URL`](crate::network::DEFAULT_API_URL) |
//! | `DIGITIZER_TIMEOUT_SECS` | 30 |
//! | `DIGITIZER_LOGIN_ROUTE` | `/login` |
//! | `DIGITIZER_CREDENTIALS_FILE` | unset (in-memory store) |
//! | `DIGITIZER_SINGLE_FLIGHT_REFRESH` | `true` |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SdkError;
use crate::network::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, LOGIN_ROUTE};

pub const ENV_API_URL: &str = "DIGITIZER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "DIGITIZER_TIMEOUT_SECS";
pub const ENV_LOGIN_ROUTE: &str = "DIGITIZER_LOGIN_ROUTE";
pub const ENV_CREDENTIALS_FILE: &str = "DIGITIZER_CREDENTIALS_FILE";
pub const ENV_SINGLE_FLIGHT_REFRESH: &str = "DIGITIZER_SINGLE_FLIGHT_REFRESH";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub login_route: String,
    /// When set, credentials persist to this JSON file.
    pub credentials_file: Option<PathBuf>,
    pub single_flight_refresh: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            login_route: LOGIN_ROUTE.to_string(),
            credentials_file: None,
            single_flight_refresh: true,
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if present) and read overrides from the process environment.
    pub fn from_env() -> Result<Self, SdkError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SdkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = var(ENV_API_URL) {
            config.base_url = url;
        }
        if let Some(secs) = var(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.parse().map_err(|_| {
                SdkError::Validation(format!(
                    "{} must be a number of seconds, got {:?}",
                    ENV_TIMEOUT_SECS, secs
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(route) = var(ENV_LOGIN_ROUTE) {
            config.login_route = route;
        }
        config.credentials_file = var(ENV_CREDENTIALS_FILE).map(PathBuf::from);
        if let Some(flag) = var(ENV_SINGLE_FLIGHT_REFRESH) {
            config.single_flight_refresh = parse_bool(&flag).ok_or_else(|| {
                SdkError::Validation(format!(
                    "{} must be true or false, got {:?}",
                    ENV_SINGLE_FLIGHT_REFRESH, flag
                ))
            })?;
        }

        tracing::debug!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            persistent = config.credentials_file.is_some(),
            "Loaded client config"
        );
        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert!(config.single_flight_refresh);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://ocr.example.com"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_CREDENTIALS_FILE, "/tmp/creds.json"),
            (ENV_SINGLE_FLIGHT_REFRESH, "off"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://ocr.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.credentials_file, Some(PathBuf::from("/tmp/creds.json")));
        assert!(!config.single_flight_refresh);
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")]));
        assert!(matches!(result, Err(SdkError::Validation(_))));
    }
}
