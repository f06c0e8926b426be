//! Finder configuration file support.
//!
//! Configuration is read from a TOML file (`finder.toml`), then selected
//! values can be overridden from the environment. Every section and field
//! has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! [site]
//! name = "Elginfield Observatory"
//! latitude = 43.0739
//! longitude = -81.3158
//! elevation_m = 326.0
//!
//! [search]
//! window_days = [90, 180, 270, 365]
//! quota = 5
//! top_n = 10
//!
//! [[search.thresholds]]
//! min_altitude_deg = 20.0
//! max_sun_altitude_deg = -12.0
//!
//! [source]
//! base_url = "https://solarsystem.linea.org.br/api/occultations"
//!
//! [output]
//! path = "data/occultation_events.json"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{GeographicLocation, VisibilityThreshold};
use crate::error::ConfigError;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "FINDER_CONFIG";

/// Longest accepted search window, in days.
pub const MAX_WINDOW_DAYS: i64 = 36_525;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Observing site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_elevation")]
    pub elevation_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_window_days")]
    pub window_days: Vec<i64>,
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<VisibilityThreshold>,
    #[serde(default = "default_quota")]
    pub quota: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,
}

/// Prediction service connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Stop paging once this many events after the window start were seen
    #[serde(default = "default_target_future_events")]
    pub target_future_events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_site_name() -> String {
    "Elginfield Observatory".to_string()
}

fn default_latitude() -> f64 {
    43.0739
}

fn default_longitude() -> f64 {
    -81.3158
}

fn default_elevation() -> Option<f64> {
    Some(326.0)
}

fn default_window_days() -> Vec<i64> {
    vec![90, 180, 270, 365]
}

fn default_thresholds() -> Vec<VisibilityThreshold> {
    vec![
        VisibilityThreshold::new(20.0, -12.0),
        VisibilityThreshold::new(15.0, -6.0),
        VisibilityThreshold::new(10.0, 0.0),
    ]
}

fn default_quota() -> usize {
    5
}

fn default_top_n() -> usize {
    10
}

fn default_fallback_limit() -> usize {
    50
}

fn default_base_url() -> String {
    "https://solarsystem.linea.org.br/api/occultations".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    20
}

fn default_target_future_events() -> usize {
    200
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/occultation_events.json")
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            elevation_m: default_elevation(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            thresholds: default_thresholds(),
            quota: default_quota(),
            top_n: default_top_n(),
            fallback_limit: default_fallback_limit(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            target_future_events: default_target_future_events(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl SiteSettings {
    pub fn location(&self) -> Result<GeographicLocation, ConfigError> {
        GeographicLocation::new(self.latitude, self.longitude, self.elevation_m)
            .map_err(ConfigError::Invalid)
    }
}

impl FinderConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from the first `finder.toml` found.
    ///
    /// Searches:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// Returns defaults when no file exists.
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("finder.toml"),
            PathBuf::from("backend/finder.toml"),
            PathBuf::from("../finder.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        log::info!("No finder.toml found, using built-in defaults");
        Ok(Self::default())
    }

    /// Resolve the configuration the binary runs with.
    ///
    /// Uses `FINDER_CONFIG` when set, the default search otherwise, then
    /// applies environment overrides and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::from_default_location()?,
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides.
    ///
    /// # Environment Variables
    /// - `FINDER_OUTPUT`: output file path
    /// - `FINDER_API_URL`: prediction service URL
    /// - `FINDER_QUOTA`: minimum number of visible events
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(path) = env::var("FINDER_OUTPUT") {
            self.output.path = PathBuf::from(path);
        }
        if let Ok(url) = env::var("FINDER_API_URL") {
            self.source.base_url = url;
        }
        if let Ok(quota) = env::var("FINDER_QUOTA") {
            self.search.quota = quota.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("FINDER_QUOTA must be a non-negative integer, got '{}'", quota))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site.location()?;

        let windows = &self.search.window_days;
        if windows.is_empty() {
            return Err(ConfigError::Invalid("search.window_days is empty".to_string()));
        }
        if windows.iter().any(|days| *days <= 0) {
            return Err(ConfigError::Invalid(
                "search.window_days must be positive".to_string(),
            ));
        }
        if let Some(days) = windows.iter().find(|days| **days > MAX_WINDOW_DAYS) {
            return Err(ConfigError::Invalid(format!(
                "search.window_days entry {} exceeds {} days",
                days, MAX_WINDOW_DAYS
            )));
        }
        if windows.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::Invalid(
                "search.window_days must be strictly increasing".to_string(),
            ));
        }

        let tiers = &self.search.thresholds;
        if tiers.is_empty() {
            return Err(ConfigError::Invalid("search.thresholds is empty".to_string()));
        }
        if let Some(pair) = tiers
            .windows(2)
            .find(|pair| !pair[0].is_at_least_as_strict_as(&pair[1]))
        {
            return Err(ConfigError::Invalid(format!(
                "search.thresholds must go from strictest to loosest: {} is looser than {}",
                pair[0], pair[1]
            )));
        }

        if self.search.top_n == 0 {
            return Err(ConfigError::Invalid("search.top_n must be at least 1".to_string()));
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "source.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
