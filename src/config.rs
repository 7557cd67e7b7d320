//! Configuration management for the deer guide
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::DeerGuideError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeerGuideConfig {
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub elevation: ElevationConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Place-search service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Appended to every query to disambiguate local place names
    #[serde(default = "default_region_qualifier")]
    pub region_qualifier: String,
}

/// Forecast service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Point-elevation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationConfig {
    #[serde(default = "default_elevation_base_url")]
    pub base_url: String,
    #[serde(default = "default_elevation_dataset")]
    pub dataset: String,
}

/// Outbound request settings shared by every upstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures, with jittered backoff
    #[serde(default = "default_http_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Orchestrator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u32,
    #[serde(default = "default_address")]
    pub default_address: String,
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_region_qualifier() -> String {
    "North Carolina".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_elevation_base_url() -> String {
    "https://api.opentopodata.org/v1".to_string()
}

fn default_elevation_dataset() -> String {
    "test-dataset".to_string()
}

fn default_http_timeout() -> u32 {
    15
}

fn default_http_max_retries() -> u32 {
    1
}

fn default_user_agent() -> String {
    format!("deer-guide/{}", crate::VERSION)
}

fn default_refresh_interval() -> u32 {
    60
}

fn default_address() -> String {
    "High Point, NC".to_string()
}

fn default_latitude() -> f64 {
    35.9557
}

fn default_longitude() -> f64 {
    -80.0053
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            region_qualifier: default_region_qualifier(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            base_url: default_elevation_base_url(),
            dataset: default_elevation_dataset(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            max_retries: default_http_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            refresh_interval_minutes: default_refresh_interval(),
            default_address: default_address(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DeerGuideConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // DEERGUIDE_HTTP__TIMEOUT_SECONDS=30 style overrides
        builder = builder.add_source(
            Environment::with_prefix("DEERGUIDE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DeerGuideConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("deer-guide").join("config.toml"))
    }

    /// Apply default values to empty or zeroed fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.elevation.base_url.is_empty() {
            self.elevation.base_url = default_elevation_base_url();
        }
        if self.elevation.dataset.is_empty() {
            self.elevation.dataset = default_elevation_dataset();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.analysis.refresh_interval_minutes == 0 {
            self.analysis.refresh_interval_minutes = default_refresh_interval();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(
                DeerGuideError::config("HTTP timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.http.max_retries > 10 {
            return Err(DeerGuideError::config("HTTP max retries cannot exceed 10").into());
        }

        if self.analysis.refresh_interval_minutes > 24 * 60 {
            return Err(DeerGuideError::config(
                "Refresh interval cannot exceed 1440 minutes (1 day)",
            )
            .into());
        }

        crate::Coordinate::new(
            self.analysis.default_latitude,
            self.analysis.default_longitude,
        )
        .map_err(|e| DeerGuideError::config(format!("Invalid default location: {e}")))?;

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DeerGuideError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DeerGuideError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Weather", &self.weather.base_url),
            ("Elevation", &self.elevation.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DeerGuideError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
