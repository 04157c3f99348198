use crate::error::{Result, UdxError};
use crate::models::CoordinateSystem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for cityudx
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Japanese plane rectangular zone used to project cell centers
    pub zone_id: ConfigValue<i32>,
    pub coordinate_system: ConfigValue<CoordinateSystem>,
    pub unit_scale: ConfigValue<f64>,
    /// Base URL of the remote catalog; no default
    pub catalog_url: ConfigValue<Option<String>>,
    pub http_timeout_secs: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            zone_id: ConfigValue::new(9, ConfigSource::Default),
            coordinate_system: ConfigValue::new(CoordinateSystem::Enu, ConfigSource::Default),
            unit_scale: ConfigValue::new(1.0, ConfigSource::Default),
            catalog_url: ConfigValue::new(None, ConfigSource::Default),
            http_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| UdxError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {}", e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| UdxError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(zone_id) = file_config.zone_id {
            self.zone_id.update(validate_zone(zone_id)?, ConfigSource::File);
        }

        if let Some(axis) = file_config.coordinate_system {
            self.coordinate_system.update(parse_coordinate_system(&axis)?, ConfigSource::File);
        }

        if let Some(scale) = file_config.unit_scale {
            self.unit_scale.update(validate_unit_scale(scale)?, ConfigSource::File);
        }

        if let Some(url) = file_config.catalog_url {
            self.catalog_url.update(Some(url), ConfigSource::File);
        }

        if let Some(timeout) = file_config.http_timeout_secs {
            self.http_timeout_secs.update(timeout, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // CITYUDX_ZONE_ID
        if let Ok(zone_str) = env::var("CITYUDX_ZONE_ID") {
            let parsed = zone_str.parse::<i32>().ok().and_then(|z| validate_zone(z).ok());
            match parsed {
                Some(zone) => self.zone_id.update(zone, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid CITYUDX_ZONE_ID value '{}': expected integer 1 to 19",
                    zone_str
                ),
            }
        }

        // CITYUDX_COORDINATE_SYSTEM
        if let Ok(axis_str) = env::var("CITYUDX_COORDINATE_SYSTEM") {
            match parse_coordinate_system(&axis_str) {
                Ok(axis) => self.coordinate_system.update(axis, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CITYUDX_COORDINATE_SYSTEM value '{}': expected ENU, WUN, EUN, or ESU",
                    axis_str
                ),
            }
        }

        // CITYUDX_UNIT_SCALE
        if let Ok(scale_str) = env::var("CITYUDX_UNIT_SCALE") {
            let parsed = scale_str.parse::<f64>().ok().and_then(|s| validate_unit_scale(s).ok());
            match parsed {
                Some(scale) => self.unit_scale.update(scale, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid CITYUDX_UNIT_SCALE value '{}': expected a positive number",
                    scale_str
                ),
            }
        }

        // CITYUDX_CATALOG_URL
        if let Ok(url) = env::var("CITYUDX_CATALOG_URL") {
            self.catalog_url.update(Some(url), ConfigSource::Environment);
        }

        // CITYUDX_HTTP_TIMEOUT_SECS
        if let Ok(timeout_str) = env::var("CITYUDX_HTTP_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.http_timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CITYUDX_HTTP_TIMEOUT_SECS value '{}': expected whole seconds",
                    timeout_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(zone_id) = overrides.zone_id {
            self.zone_id.update(zone_id, ConfigSource::Cli);
        }

        if let Some(axis) = overrides.coordinate_system {
            self.coordinate_system.update(axis, ConfigSource::Cli);
        }

        if let Some(scale) = overrides.unit_scale {
            self.unit_scale.update(scale, ConfigSource::Cli);
        }

        if let Some(url) = overrides.catalog_url {
            self.catalog_url.update(Some(url), ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.http_timeout_secs {
            self.http_timeout_secs.update(timeout, ConfigSource::Cli);
        }
    }

    /// The catalog URL, or `ConfigMissing` when no layer provided one
    pub fn require_catalog_url(&self) -> Result<&str> {
        self.catalog_url
            .value
            .as_deref()
            .ok_or_else(|| UdxError::ConfigMissing { key: "catalog_url".to_string() })
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("zone_id".to_string(), (self.zone_id.value.to_string(), self.zone_id.source));

        map.insert(
            "coordinate_system".to_string(),
            (self.coordinate_system.value.to_string(), self.coordinate_system.source),
        );

        map.insert(
            "unit_scale".to_string(),
            (self.unit_scale.value.to_string(), self.unit_scale.source),
        );

        map.insert(
            "catalog_url".to_string(),
            (
                self.catalog_url.value.clone().unwrap_or_else(|| "(unset)".to_string()),
                self.catalog_url.source,
            ),
        );

        map.insert(
            "http_timeout_secs".to_string(),
            (self.http_timeout_secs.value.to_string(), self.http_timeout_secs.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    zone_id: Option<i32>,
    coordinate_system: Option<String>,
    unit_scale: Option<f64>,
    catalog_url: Option<String>,
    http_timeout_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub zone_id: Option<i32>,
    pub coordinate_system: Option<CoordinateSystem>,
    pub unit_scale: Option<f64>,
    pub catalog_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

/// Parse an axis convention from its three-letter name
pub fn parse_coordinate_system(s: &str) -> Result<CoordinateSystem> {
    match s.to_uppercase().as_str() {
        "ENU" => Ok(CoordinateSystem::Enu),
        "WUN" => Ok(CoordinateSystem::Wun),
        "EUN" => Ok(CoordinateSystem::Eun),
        "ESU" => Ok(CoordinateSystem::Esu),
        _ => Err(UdxError::ConfigInvalid {
            key: "coordinate_system".to_string(),
            reason: format!("Invalid coordinate system: {}. Use ENU, WUN, EUN, or ESU", s),
        }),
    }
}

/// Check a plane rectangular zone number (1 to 19)
pub fn validate_zone(zone: i32) -> Result<i32> {
    if (1..=19).contains(&zone) {
        Ok(zone)
    } else {
        Err(UdxError::InvalidZone { zone })
    }
}

/// Check a scene unit scale: finite and strictly positive
pub fn validate_unit_scale(scale: f64) -> Result<f64> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(UdxError::ConfigInvalid {
            key: "unit_scale".to_string(),
            reason: format!("Unit scale must be a positive number, got {}", scale),
        })
    }
}
