//! Settings read from the environment.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use entity_search_ingest::LoaderConfig;
use entity_search_repository::config::{
    DEFAULT_INDEX_NAME, DEFAULT_OPENSEARCH_URL, DEFAULT_REQUEST_TIMEOUT,
};
use entity_search_repository::{OpenSearchConfig, SearchIndexConfig};

use crate::ServiceError;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default number of documents per bulk request.
const DEFAULT_BATCH_SIZE: usize = 2000;

/// Default number of documents generated by one run.
const DEFAULT_TOTAL_DOCUMENTS: u64 = 10_000_000;

/// Default upper bound on documents per bulk request.
const DEFAULT_MAX_BATCH_SIZE: usize = 10_000;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Everything the service reads from its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub opensearch: OpenSearchConfig,
    pub max_batch_size: usize,
    pub loader: LoaderConfig,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BIND_ADDR`: listen address (default: 0.0.0.0:3000)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: https://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: basic auth credentials
    /// - `OPENSEARCH_ACCEPT_INVALID_CERTS`: skip TLS verification (default: true)
    /// - `OPENSEARCH_TIMEOUT_SECS`: per-request timeout (default: 30)
    /// - `INDEX_NAME`: entity index name (default: entity)
    /// - `MAX_BATCH_SIZE`: largest accepted bulk request (default: 10000)
    /// - `GENERATE_TOTAL_DOCUMENTS`: documents per generation run (default: 10000000)
    /// - `GENERATE_BATCH_SIZE`: documents per bulk request (default: 2000)
    /// - `GENERATE_TIMEOUT_SECS`: generation deadline (default: none)
    /// - `LOG_FORMAT`: `text` or `json` (default: text)
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", || {
            SocketAddr::from_str(DEFAULT_BIND_ADDR).map_err(|e| ServiceError::config(e.to_string()))
        })?;

        let mut opensearch = OpenSearchConfig::new(
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
        )
        .with_index_name(lookup("INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()));

        if let (Some(username), Some(password)) =
            (lookup("OPENSEARCH_USERNAME"), lookup("OPENSEARCH_PASSWORD"))
        {
            opensearch = opensearch.with_credentials(username, password);
        }
        opensearch.accept_invalid_certs =
            parse_or(&lookup, "OPENSEARCH_ACCEPT_INVALID_CERTS", || Ok(true))?;
        opensearch.request_timeout = parse_or(&lookup, "OPENSEARCH_TIMEOUT_SECS", || {
            Ok(DEFAULT_REQUEST_TIMEOUT.as_secs())
        })
        .map(Duration::from_secs)?;

        let max_batch_size = parse_or(&lookup, "MAX_BATCH_SIZE", || Ok(DEFAULT_MAX_BATCH_SIZE))?;
        let batch_size = parse_or(&lookup, "GENERATE_BATCH_SIZE", || Ok(DEFAULT_BATCH_SIZE))?;
        if batch_size == 0 || batch_size > max_batch_size {
            return Err(ServiceError::config(format!(
                "GENERATE_BATCH_SIZE must be between 1 and {max_batch_size}, got {batch_size}"
            )));
        }

        let loader = LoaderConfig {
            batch_size,
            total_documents: parse_or(&lookup, "GENERATE_TOTAL_DOCUMENTS", || {
                Ok(DEFAULT_TOTAL_DOCUMENTS)
            })?,
            timeout: parse_optional::<u64, _>(&lookup, "GENERATE_TIMEOUT_SECS")?
                .map(Duration::from_secs),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ServiceError::config(format!(
                    "LOG_FORMAT must be text or json, got {other}"
                )))
            }
        };

        Ok(Self {
            bind_addr,
            opensearch,
            max_batch_size,
            loader,
            log_format,
        })
    }

    /// Client settings derived from these settings.
    pub fn search_index_config(&self) -> SearchIndexConfig {
        SearchIndexConfig::with_max_batch_size(self.max_batch_size)
    }
}

fn parse_optional<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ServiceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| ServiceError::config(format!("Invalid {key} {raw:?}: {e}")))
        })
        .transpose()
}

fn parse_or<T, F, D>(lookup: &F, key: &str, default: D) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<T, ServiceError>,
{
    match parse_optional(lookup, key)? {
        Some(value) => Ok(value),
        None => default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings, ServiceError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();

        assert_eq!(settings.bind_addr.port(), 3000);
        assert_eq!(settings.opensearch.url, "https://localhost:9200");
        assert_eq!(settings.opensearch.index_name, "entity");
        assert!(settings.opensearch.accept_invalid_certs);
        assert!(settings.opensearch.username.is_none());
        assert_eq!(settings.opensearch.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.loader.batch_size, 2000);
        assert_eq!(settings.loader.total_documents, 10_000_000);
        assert!(settings.loader.timeout.is_none());
        assert_eq!(settings.max_batch_size, 10_000);
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("OPENSEARCH_URL", "http://search:9200"),
            ("OPENSEARCH_USERNAME", "admin"),
            ("OPENSEARCH_PASSWORD", "secret"),
            ("OPENSEARCH_ACCEPT_INVALID_CERTS", "false"),
            ("INDEX_NAME", "companies"),
            ("GENERATE_TOTAL_DOCUMENTS", "5000"),
            ("GENERATE_BATCH_SIZE", "500"),
            ("GENERATE_TIMEOUT_SECS", "60"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(settings.opensearch.url, "http://search:9200");
        assert_eq!(settings.opensearch.username.as_deref(), Some("admin"));
        assert!(!settings.opensearch.accept_invalid_certs);
        assert_eq!(settings.opensearch.index_name, "companies");
        assert_eq!(settings.loader.total_documents, 5000);
        assert_eq!(settings.loader.batch_size, 500);
        assert_eq!(settings.loader.timeout, Some(Duration::from_secs(60)));
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            settings_from(&[("GENERATE_BATCH_SIZE", "lots")]),
            Err(ServiceError::ConfigError(_))
        ));
        assert!(settings_from(&[("GENERATE_BATCH_SIZE", "0")]).is_err());
        assert!(settings_from(&[("GENERATE_BATCH_SIZE", "20000")]).is_err());
        assert!(settings_from(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(settings_from(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
