/// Main configuration structure for Cinerank
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub webdriver: WebDriverConfig,
    pub harvest: HarvestConfig,
}

/// Relational store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

/// Remote browser endpoint configuration
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Base URL of the remote WebDriver endpoint
    pub endpoint: String,

    /// Page-load timeout applied to the session (seconds)
    pub page_load_timeout_secs: u64,
}

/// Harvest behavior configuration
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// URL of the ranked listing page
    pub listing_url: String,

    /// Maximum number of movies to collect from the listing
    pub max_movies: usize,

    /// Maximum number of cast entries per movie
    pub max_cast: usize,

    /// Bound on the readiness wait for each rendered page (seconds)
    pub wait_timeout_secs: u64,

    /// Extra settle time after readiness, for late-rendering content (ms)
    pub settle_ms: u64,
}
