use crate::config::types::{Config, HarvestConfig, StoreConfig, WebDriverConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_store_config(&config.store)?;
    validate_webdriver_config(&config.webdriver)?;
    validate_harvest_config(&config.harvest)?;
    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates remote browser endpoint configuration
fn validate_webdriver_config(config: &WebDriverConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.endpoint, "webdriver endpoint")?;

    if config.page_load_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "page_load_timeout_secs must be >= 1, got {}",
            config.page_load_timeout_secs
        )));
    }

    Ok(())
}

/// Validates harvest configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.listing_url, "listing URL")?;

    if config.max_movies < 1 {
        return Err(ConfigError::Validation(format!(
            "max_movies must be >= 1, got {}",
            config.max_movies
        )));
    }

    // max_cast may be 0: a run that collects no cast is legal.

    if config.wait_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "wait_timeout_secs must be >= 1, got {}",
            config.wait_timeout_secs
        )));
    }

    Ok(())
}

/// Validates that a string parses as an http(s) URL
fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Invalid {}: '{}' must use http or https",
            what, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            store: StoreConfig {
                database_path: "./test.db".to_string(),
            },
            webdriver: WebDriverConfig {
                endpoint: "http://localhost:4444".to_string(),
                page_load_timeout_secs: 60,
            },
            harvest: HarvestConfig {
                listing_url: "https://example.com/chart/top/".to_string(),
                max_movies: 10,
                max_cast: 5,
                wait_timeout_secs: 20,
                settle_ms: 0,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let mut config = valid_config();
        config.store.database_path = String::new();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_max_movies_rejected() {
        let mut config = valid_config();
        config.harvest.max_movies = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_max_cast_allowed() {
        let mut config = valid_config();
        config.harvest.max_cast = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let mut config = valid_config();
        config.webdriver.endpoint = "ftp://localhost:4444".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_zero_wait_timeout_rejected() {
        let mut config = valid_config();
        config.harvest.wait_timeout_secs = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
