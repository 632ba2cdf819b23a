//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 5000;

/// A variable that is set but cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Directory holding the dataset's JSON tables.
    pub data_dir: PathBuf,

    /// Precomputed snapshot; built in memory when unset or unreadable.
    pub snapshot: Option<PathBuf>,

    pub bind: SocketAddr,

    /// Base URL of an OSRM server for road geometry.
    pub osrm_url: Option<String>,

    /// File for the persistent store; in-memory when unset.
    pub cache_file: Option<PathBuf>,

    /// Time budget for one route search.
    pub search_timeout: Duration,
}

impl ServerConfig {
    /// Read `TRANSIT_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a configuration from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_raw = get("TRANSIT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError {
            var: "TRANSIT_BIND",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let search_timeout = match get("TRANSIT_SEARCH_TIMEOUT_MS") {
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError {
                    var: "TRANSIT_SEARCH_TIMEOUT_MS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_SEARCH_TIMEOUT_MS),
        };

        Ok(Self {
            data_dir: get("TRANSIT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            snapshot: get("TRANSIT_SNAPSHOT").map(PathBuf::from),
            bind,
            osrm_url: get("TRANSIT_OSRM_URL"),
            cache_file: get("TRANSIT_CACHE_FILE").map(PathBuf::from),
            search_timeout,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            snapshot: None,
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            osrm_url: None,
            cache_file: None,
            search_timeout: Duration::from_millis(DEFAULT_SEARCH_TIMEOUT_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind.to_string(), "127.0.0.1:3000");
        assert_eq!(config.search_timeout, Duration::from_secs(5));
    }

    #[test]
    fn reads_all_variables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TRANSIT_DATA_DIR", "/srv/transit"),
            ("TRANSIT_SNAPSHOT", "/srv/transit/snapshot.json"),
            ("TRANSIT_BIND", "0.0.0.0:8080"),
            ("TRANSIT_OSRM_URL", "http://osrm:5000"),
            ("TRANSIT_CACHE_FILE", "/var/cache/transit.json"),
            ("TRANSIT_SEARCH_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/transit"));
        assert_eq!(config.snapshot, Some(PathBuf::from("/srv/transit/snapshot.json")));
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.osrm_url.as_deref(), Some("http://osrm:5000"));
        assert_eq!(config.cache_file, Some(PathBuf::from("/var/cache/transit.json")));
        assert_eq!(config.search_timeout, Duration::from_millis(250));
    }

    #[test]
    fn empty_values_are_unset() {
        let config = ServerConfig::from_lookup(lookup(&[("TRANSIT_OSRM_URL", " ")])).unwrap();
        assert_eq!(config.osrm_url, None);
    }

    #[test]
    fn rejects_bad_values() {
        let err = ServerConfig::from_lookup(lookup(&[("TRANSIT_BIND", "nowhere")])).unwrap_err();
        assert_eq!(err.var, "TRANSIT_BIND");

        let err =
            ServerConfig::from_lookup(lookup(&[("TRANSIT_SEARCH_TIMEOUT_MS", "soon")])).unwrap_err();
        assert_eq!(err.var, "TRANSIT_SEARCH_TIMEOUT_MS");
    }
}
