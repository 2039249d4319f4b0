//! Environment-variable configuration loader
//!
//! Every variable is optional; the defaults below describe a local
//! docker-compose style setup (selenium container on 4444, database file in
//! the working directory).

use crate::config::types::{Config, HarvestConfig, StoreConfig, WebDriverConfig};
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};

pub const ENV_DATABASE_PATH: &str = "CINERANK_DATABASE_PATH";
pub const ENV_WEBDRIVER_URL: &str = "CINERANK_WEBDRIVER_URL";
pub const ENV_LISTING_URL: &str = "CINERANK_LISTING_URL";
pub const ENV_MAX_MOVIES: &str = "CINERANK_MAX_MOVIES";
pub const ENV_MAX_CAST: &str = "CINERANK_MAX_CAST";
pub const ENV_PAGE_LOAD_TIMEOUT_SECS: &str = "CINERANK_PAGE_LOAD_TIMEOUT_SECS";
pub const ENV_WAIT_TIMEOUT_SECS: &str = "CINERANK_WAIT_TIMEOUT_SECS";
pub const ENV_SETTLE_MS: &str = "CINERANK_SETTLE_MS";

const DEFAULT_DATABASE_PATH: &str = "./cinerank.db";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
const DEFAULT_LISTING_URL: &str = "https://www.imdb.com/chart/top/";
const DEFAULT_MAX_MOVIES: usize = 25;
const DEFAULT_MAX_CAST: usize = 10;
const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 60;
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_SETTLE_MS: u64 = 2000;

/// Loads configuration from the process environment and validates it.
pub fn load_config() -> ConfigResult<Config> {
    load_config_from(|name| std::env::var(name).ok())
}

/// Loads configuration from an arbitrary variable lookup.
///
/// `load_config` passes `std::env::var`; tests pass a closure over a map so
/// they never mutate process-global state.
pub fn load_config_from<F>(lookup: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config {
        store: StoreConfig {
            database_path: string_var(&lookup, ENV_DATABASE_PATH, DEFAULT_DATABASE_PATH),
        },
        webdriver: WebDriverConfig {
            endpoint: string_var(&lookup, ENV_WEBDRIVER_URL, DEFAULT_WEBDRIVER_URL),
            page_load_timeout_secs: numeric_var(
                &lookup,
                ENV_PAGE_LOAD_TIMEOUT_SECS,
                DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            )?,
        },
        harvest: HarvestConfig {
            listing_url: string_var(&lookup, ENV_LISTING_URL, DEFAULT_LISTING_URL),
            max_movies: numeric_var(&lookup, ENV_MAX_MOVIES, DEFAULT_MAX_MOVIES)?,
            max_cast: numeric_var(&lookup, ENV_MAX_CAST, DEFAULT_MAX_CAST)?,
            wait_timeout_secs: numeric_var(
                &lookup,
                ENV_WAIT_TIMEOUT_SECS,
                DEFAULT_WAIT_TIMEOUT_SECS,
            )?,
            settle_ms: numeric_var(&lookup, ENV_SETTLE_MS, DEFAULT_SETTLE_MS)?,
        },
    };

    validate(&config)?;

    Ok(config)
}

fn string_var<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

fn numeric_var<F, T>(lookup: &F, name: &str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: name.to_string(),
                    value: value.trim().to_string(),
                    reason: "expected a non-negative integer".to_string(),
                })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = load_config_from(|_| None).unwrap();

        assert_eq!(config.store.database_path, DEFAULT_DATABASE_PATH);
        assert_eq!(config.webdriver.endpoint, DEFAULT_WEBDRIVER_URL);
        assert_eq!(config.harvest.listing_url, DEFAULT_LISTING_URL);
        assert_eq!(config.harvest.max_movies, DEFAULT_MAX_MOVIES);
        assert_eq!(config.harvest.max_cast, DEFAULT_MAX_CAST);
        assert_eq!(config.harvest.wait_timeout_secs, DEFAULT_WAIT_TIMEOUT_SECS);
        assert_eq!(config.harvest.settle_ms, DEFAULT_SETTLE_MS);
    }

    #[test]
    fn test_overrides_take_effect() {
        let lookup = lookup_from(&[
            (ENV_DATABASE_PATH, "/tmp/chart.db"),
            (ENV_MAX_MOVIES, "5"),
            (ENV_MAX_CAST, "3"),
            (ENV_SETTLE_MS, "0"),
        ]);
        let config = load_config_from(lookup).unwrap();

        assert_eq!(config.store.database_path, "/tmp/chart.db");
        assert_eq!(config.harvest.max_movies, 5);
        assert_eq!(config.harvest.max_cast, 3);
        assert_eq!(config.harvest.settle_ms, 0);
    }

    #[test]
    fn test_blank_value_falls_back_to_default() {
        let lookup = lookup_from(&[(ENV_MAX_MOVIES, "  ")]);
        let config = load_config_from(lookup).unwrap();
        assert_eq!(config.harvest.max_movies, DEFAULT_MAX_MOVIES);
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let lookup = lookup_from(&[(ENV_MAX_MOVIES, "lots")]);
        let result = load_config_from(lookup);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_listing_url_is_rejected() {
        let lookup = lookup_from(&[(ENV_LISTING_URL, "not a url")]);
        let result = load_config_from(lookup);
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }
}
