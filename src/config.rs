// ⚙️ Configuration
// Environment first (with an optional .env file), CLI flags override in main.rs

use std::env;
use std::path::PathBuf;

pub const DATABASE_ENV: &str = "CATALOG_DATABASE";
pub const LOG_ENV: &str = "CATALOG_LOG";

pub const DEFAULT_DATABASE: &str = "catalog.db";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub database_path: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive, e.g. "info" or
    /// "storefront_catalog=debug"
    pub log_filter: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            database_path: PathBuf::from(DEFAULT_DATABASE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CatalogConfig {
    /// Read configuration from the process environment, loading `.env` first
    /// if there is one. Variables already set in the environment win.
    pub fn from_env() -> Self {
        // a missing .env file is the normal case
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = CatalogConfig::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        CatalogConfig {
            database_path: get(DATABASE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_filter: get(LOG_ENV).unwrap_or(defaults.log_filter),
        }
    }
}
