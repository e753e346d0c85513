use std::env;
use std::sync::Arc;

use crate::errors::{ConfigError, StoreError};
use crate::store::{Latency, MockStore, RemoteStore, SharedStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Remote,
    Mock,
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: StoreBackend,
    pub remote: Option<RemoteConfig>,
    pub mock_latency_min_ms: u64,
    pub mock_latency_max_ms: u64,
    pub bind_address: String,
    pub frontend_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("TASKFLOW_STORE")
            .unwrap_or_else(|| "mock".to_string())
            .to_lowercase()
            .as_str()
        {
            "mock" => StoreBackend::Mock,
            "remote" => StoreBackend::Remote,
            other => {
                return Err(ConfigError::Invalid {
                    name: "TASKFLOW_STORE",
                    value: other.to_string(),
                })
            }
        };

        let remote = match backend {
            StoreBackend::Remote => {
                let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
                Some(RemoteConfig {
                    base_url: required("RECORD_STORE_URL")?,
                    project_id: required("RECORD_STORE_PROJECT_ID")?,
                    public_key: required("RECORD_STORE_PUBLIC_KEY")?,
                    timeout_secs: parse_number(&lookup, "RECORD_STORE_TIMEOUT_SECS", 30)?,
                })
            }
            StoreBackend::Mock => None,
        };

        Ok(Self {
            backend,
            remote,
            mock_latency_min_ms: parse_number(&lookup, "MOCK_LATENCY_MIN_MS", 100)?,
            mock_latency_max_ms: parse_number(&lookup, "MOCK_LATENCY_MAX_MS", 400)?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            frontend_origin: lookup("FRONTEND_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
        })
    }

    pub fn build_store(&self) -> Result<SharedStore, StoreError> {
        match (&self.backend, &self.remote) {
            (StoreBackend::Remote, Some(remote)) => Ok(Arc::new(RemoteStore::new(remote)?)),
            (StoreBackend::Remote, None) => Err(StoreError::rejected("remote store is not configured")),
            (StoreBackend::Mock, _) => {
                let latency = Latency::between_ms(self.mock_latency_min_ms, self.mock_latency_max_ms);
                Ok(Arc::new(MockStore::seeded()?.with_latency(latency)))
            }
        }
    }
}

fn parse_number<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_the_mock_store() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend, StoreBackend::Mock);
        assert!(config.remote.is_none());
        assert_eq!(config.mock_latency_min_ms, 100);
        assert_eq!(config.mock_latency_max_ms, 400);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn remote_store_requires_credentials() {
        let err = Config::from_lookup(lookup_from(&[
            ("TASKFLOW_STORE", "remote"),
            ("RECORD_STORE_URL", "https://records.example.com"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "RECORD_STORE_PROJECT_ID must be set");
    }

    #[test]
    fn remote_store_is_configured_from_variables() {
        let config = Config::from_lookup(lookup_from(&[
            ("TASKFLOW_STORE", "Remote"),
            ("RECORD_STORE_URL", "https://records.example.com"),
            ("RECORD_STORE_PROJECT_ID", "proj"),
            ("RECORD_STORE_PUBLIC_KEY", "key"),
        ]))
        .unwrap();
        let remote = config.remote.unwrap();
        assert_eq!(remote.project_id, "proj");
        assert_eq!(remote.timeout_secs, 30);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(Config::from_lookup(lookup_from(&[("TASKFLOW_STORE", "sqlite")])).is_err());
        let err = Config::from_lookup(lookup_from(&[("MOCK_LATENCY_MIN_MS", "fast")])).unwrap_err();
        assert_eq!(err.to_string(), "MOCK_LATENCY_MIN_MS has an invalid value: fast");
    }
}
