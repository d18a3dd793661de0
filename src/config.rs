//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

const DEFAULT_SERVER_PORT: u16 = 8888;
const DEFAULT_CACHE_CAPACITY: usize = 10;
const DEFAULT_MAX_MOVIES_PER_SEARCH: usize = 20;
const DEFAULT_DATA_PATH: &str = "data/movies.json";
const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const DEFAULT_GEOCODE_ATTEMPTS: u32 = 5;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Number of search results kept in the search cache
    pub search_cache_capacity: NonZeroUsize,
    /// Maximum number of movies returned by a search
    pub max_movies_per_search: usize,
    /// JSON file holding the movies collection
    pub data_path: PathBuf,
    /// Geocoding API queried by the import for location coordinates
    pub geocode_endpoint: String,
    pub geocode_api_key: Option<String>,
    /// Lookups tried per address before keeping it without coordinates
    pub geocode_attempts: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8888)
    /// - `SEARCH_CACHE_CAPACITY` - Cached searches, must be positive (default: 10)
    /// - `MAX_MOVIES_PER_SEARCH` - Search result limit (default: 20)
    /// - `MOVIES_DATA_PATH` - Movies JSON file (default: data/movies.json)
    /// - `GEOCODE_ENDPOINT` - Geocoding API used by the import (default: Google)
    /// - `GEOCODE_API_KEY` - Key sent to the geocoding API (default: none)
    /// - `GEOCODE_ATTEMPTS` - Lookups per address, 0 disables geocoding (default: 5)
    ///
    /// Unparsable values fall back to their default with a warning.
    pub fn from_env() -> Self {
        Self {
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT),
            search_cache_capacity: parse_var("SEARCH_CACHE_CAPACITY", default_cache_capacity()),
            max_movies_per_search: parse_var(
                "MAX_MOVIES_PER_SEARCH",
                DEFAULT_MAX_MOVIES_PER_SEARCH,
            ),
            data_path: env::var("MOVIES_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),
            geocode_endpoint: env::var("GEOCODE_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_GEOCODE_ENDPOINT.to_string()),
            geocode_api_key: env::var("GEOCODE_API_KEY").ok().filter(|key| !key.is_empty()),
            geocode_attempts: parse_var("GEOCODE_ATTEMPTS", DEFAULT_GEOCODE_ATTEMPTS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            search_cache_capacity: default_cache_capacity(),
            max_movies_per_search: DEFAULT_MAX_MOVIES_PER_SEARCH,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            geocode_endpoint: DEFAULT_GEOCODE_ENDPOINT.to_string(),
            geocode_api_key: None,
            geocode_attempts: DEFAULT_GEOCODE_ATTEMPTS,
        }
    }
}

/// Reads `name`, keeping `default` when it is unset or invalid.
fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    let Ok(raw) = env::var(name) else {
        return default;
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("Invalid value '{}' for {}, using {}", raw, name, default);
            default
        }
    }
}

fn default_cache_capacity() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    // Tests touching the process environment must not interleave
    static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

    const VARS: [&str; 7] = [
        "SERVER_PORT",
        "SEARCH_CACHE_CAPACITY",
        "MAX_MOVIES_PER_SEARCH",
        "MOVIES_DATA_PATH",
        "GEOCODE_ENDPOINT",
        "GEOCODE_API_KEY",
        "GEOCODE_ATTEMPTS",
    ];

    fn clear_env() {
        for name in VARS {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8888);
        assert_eq!(config.search_cache_capacity.get(), 10);
        assert_eq!(config.max_movies_per_search, 20);
        assert_eq!(config.data_path, PathBuf::from("data/movies.json"));
        assert_eq!(config.geocode_attempts, 5);
        assert!(config.geocode_api_key.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        let _guard = ENV_LOCK.lock();
        clear_env();

        let config = Config::from_env();
        assert_eq!(config.server_port, 8888);
        assert_eq!(config.search_cache_capacity.get(), 10);
        assert_eq!(config.max_movies_per_search, 20);
        assert_eq!(config.geocode_endpoint, DEFAULT_GEOCODE_ENDPOINT);
    }

    #[test]
    fn test_config_from_env_values() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        env::set_var("SERVER_PORT", "9000");
        env::set_var("SEARCH_CACHE_CAPACITY", " 3 ");
        env::set_var("GEOCODE_ATTEMPTS", "0");
        env::set_var("GEOCODE_API_KEY", "secret");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.server_port, 9000);
        assert_eq!(config.search_cache_capacity.get(), 3);
        assert_eq!(config.geocode_attempts, 0);
        assert_eq!(config.geocode_api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_zero_capacity_falls_back_to_default() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        env::set_var("SEARCH_CACHE_CAPACITY", "0");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.search_cache_capacity.get(), 10);
    }

    #[test]
    fn test_invalid_values_fall_back_to_default() {
        let _guard = ENV_LOCK.lock();
        clear_env();
        env::set_var("SEARCH_CACHE_CAPACITY", "lots");
        env::set_var("SERVER_PORT", "-1");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.search_cache_capacity.get(), 10);
        assert_eq!(config.server_port, 8888);
    }
}
