//! Map tuning, embedded from `config/map.toml` at compile time.
//!
//! The embedded file carries the defaults; [`MapConfig::load`] applies the
//! `SERVICES_MAP_*` environment overrides on top and validates the result.

use serde::Deserialize;
use services_map_cluster::{
    ClusterOptions, DEFAULT_GRID_SIZE, DEFAULT_MAX_ZOOM, DEFAULT_MINIMUM_CLUSTER_SIZE,
};
use services_map_location::viewport::DEFAULT_CENTER;
use services_map_location_models::{DismissPolicy, LatLng};

use crate::MapError;

const EMBEDDED_CONFIG: &str = include_str!("../config/map.toml");

/// Overrides `grid_size`.
pub const GRID_SIZE_VAR: &str = "SERVICES_MAP_GRID_SIZE";
/// Overrides `max_zoom`.
pub const MAX_CLUSTER_ZOOM_VAR: &str = "SERVICES_MAP_MAX_CLUSTER_ZOOM";
/// Overrides `minimum_cluster_size`.
pub const MIN_CLUSTER_SIZE_VAR: &str = "SERVICES_MAP_MIN_CLUSTER_SIZE";
/// Overrides `dismiss_policy`.
pub const DISMISS_POLICY_VAR: &str = "SERVICES_MAP_DISMISS_POLICY";

/// Complete map configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct MapConfig {
    /// Clustering parameters.
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Initial viewport parameters.
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Popup behavior.
    #[serde(default)]
    pub disclosure: DisclosureConfig,
}

/// `[cluster]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Grid cell edge in screen pixels.
    pub grid_size: u32,
    /// Zoom above which clusters are fully split and popups follow the
    /// visible bounds.
    pub max_zoom: u8,
    /// Member count from which a cell renders as a grouped marker.
    pub minimum_cluster_size: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            max_zoom: DEFAULT_MAX_ZOOM,
            minimum_cluster_size: DEFAULT_MINIMUM_CLUSTER_SIZE,
        }
    }
}

/// `[viewport]` table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Center used when there are no locations to show.
    pub fallback_center: LatLng,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fallback_center: DEFAULT_CENTER,
        }
    }
}

/// `[disclosure]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DisclosureConfig {
    /// What closing a popup does while clusters are exploded.
    pub dismiss_policy: DismissPolicy,
}

impl MapConfig {
    /// Parses and validates a TOML document. Missing tables and keys take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Toml`] for malformed TOML and
    /// [`MapError::Config`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, MapError> {
        let config: Self = toml::de::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration embedded in the binary, without overrides.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the embedded file is invalid.
    pub fn embedded() -> Result<Self, MapError> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    /// The embedded configuration with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Config`] if an override is unparseable or the
    /// result fails validation.
    pub fn load() -> Result<Self, MapError> {
        Self::embedded()?.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides looked up by variable name, then validates.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Config`] if an override is unparseable or the
    /// result fails validation.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, MapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(GRID_SIZE_VAR) {
            self.cluster.grid_size = parse_override(GRID_SIZE_VAR, &value)?;
        }
        if let Some(value) = lookup(MAX_CLUSTER_ZOOM_VAR) {
            self.cluster.max_zoom = parse_override(MAX_CLUSTER_ZOOM_VAR, &value)?;
        }
        if let Some(value) = lookup(MIN_CLUSTER_SIZE_VAR) {
            self.cluster.minimum_cluster_size = parse_override(MIN_CLUSTER_SIZE_VAR, &value)?;
        }
        if let Some(value) = lookup(DISMISS_POLICY_VAR) {
            self.disclosure.dismiss_policy = parse_override(DISMISS_POLICY_VAR, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Config`] naming the first invalid value.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.cluster.grid_size == 0 {
            return Err(MapError::Config {
                message: "cluster.grid_size must be greater than 0".to_string(),
            });
        }
        if self.cluster.minimum_cluster_size == 0 {
            return Err(MapError::Config {
                message: "cluster.minimum_cluster_size must be at least 1".to_string(),
            });
        }
        if !self.viewport.fallback_center.is_within_range() {
            return Err(MapError::Config {
                message: format!(
                    "viewport.fallback_center ({}) is outside WGS84 ranges",
                    self.viewport.fallback_center
                ),
            });
        }
        Ok(())
    }

    /// Options for the clustering pass.
    #[must_use]
    pub const fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            grid_size: self.cluster.grid_size,
            max_zoom: self.cluster.max_zoom,
            minimum_cluster_size: self.cluster.minimum_cluster_size,
        }
    }
}

fn parse_override<T>(name: &str, value: &str) -> Result<T, MapError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| MapError::Config {
        message: format!("Invalid {name} value '{value}': {e}"),
    })
}
