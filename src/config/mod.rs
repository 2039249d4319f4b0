//! Configuration module for Cinerank
//!
//! Configuration is environment-style: every knob is an optional
//! `CINERANK_*` variable with a documented default.
//!
//! # Example
//!
//! ```no_run
//! use cinerank::config::load_config;
//!
//! let config = load_config().unwrap();
//! println!("Harvesting up to {} movies", config.harvest.max_movies);
//! ```

mod env;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HarvestConfig, StoreConfig, WebDriverConfig};

// Re-export loader functions
pub use env::{load_config, load_config_from};
