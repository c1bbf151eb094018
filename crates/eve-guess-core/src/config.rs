//! Centralized configuration for eve-guess.
//!
//! Constants live on unit structs grouped by concern; `GuessConfig` carries
//! the values an embedding application may want to override at runtime.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const USER_AGENT: &'static str = concat!("eve-guess/", env!("CARGO_PKG_VERSION"));
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const ESI_BASE_URL: &'static str = "https://esi.evetech.net/latest";
    pub const ESI_DATASOURCE: &'static str = "tranquility";
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    /// First attempt plus one retry.
    pub const MAX_ATTEMPTS: u32 = 2;
    pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
    pub const NAMES_BATCH_SIZE: usize = 1000;
    pub const TYPE_INFO_TTL: Duration = Duration::from_secs(3600);
    pub const TYPE_INFO_CACHE_CAPACITY: u64 = 100_000;
    pub const PAGES_HEADER: &'static str = "x-pages";
}

/// Catalog and cache lifecycle configuration.
pub struct CatalogConfig;

impl CatalogConfig {
    pub const VERSION_FILE_NAME: &'static str = "version.txt";
    pub const SNAPSHOT_EXTENSION: &'static str = "json";
    pub const DEFAULT_DATA_DIR: &'static str = "data";
    /// Daily refresh boundary (UTC hour), ESI downtime is over by then.
    pub const DEFAULT_REFRESH_HOUR_UTC: u32 = 12;
    pub const DEFAULT_MEMO_CAPACITY: u64 = 50_000;
    pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 32;
}

/// Runtime configuration for a [`crate::Guesser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct GuessConfig {
    /// Directory holding `<category>.json` snapshots and `version.txt`.
    pub data_dir: PathBuf,
    /// UTC hour at which the daily refresh fires.
    pub refresh_hour_utc: u32,
    /// Maximum number of memoized answers per bucket.
    pub memo_capacity: u64,
    /// Upper bound on concurrent published-status lookups in one filter call.
    pub max_concurrent_lookups: usize,
    /// Base URL of the ESI API.
    pub esi_base_url: String,
}

impl Default for GuessConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(CatalogConfig::DEFAULT_DATA_DIR),
            refresh_hour_utc: CatalogConfig::DEFAULT_REFRESH_HOUR_UTC,
            memo_capacity: CatalogConfig::DEFAULT_MEMO_CAPACITY,
            max_concurrent_lookups: CatalogConfig::DEFAULT_MAX_CONCURRENT_LOOKUPS,
            esi_base_url: NetworkConfig::ESI_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = GuessConfig::default();
        assert!(config.refresh_hour_utc < 24);
        assert!(config.max_concurrent_lookups > 0);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(NetworkConfig::NAMES_BATCH_SIZE, 1000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GuessConfig =
            serde_json::from_str(r#"{"refresh_hour_utc": 11}"#).expect("Should parse");
        assert_eq!(config.refresh_hour_utc, 11);
        assert_eq!(config.esi_base_url, NetworkConfig::ESI_BASE_URL);
    }
}
