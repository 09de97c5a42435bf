//! Index configuration.
//!
//! Designed to be easily serializable and loadable from JSON (or TOML with
//! the `toml` feature) while keeping complexity minimal. Capacity and world
//! boundary are fixed at index creation and never change afterwards.

use crate::types::Boundary;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Index configuration: node capacity and the fixed world boundary.
///
/// # Example
///
/// ```rust
/// use geochain::Config;
///
/// // Create default config (world covering the full lon/lat domain)
/// let config = Config::default();
///
/// // Load from JSON
/// let json = r#"{
///     "capacity": 2,
///     "world": { "center_x": 0.0, "center_y": 0.0, "width": 360.0, "height": 180.0 }
/// }"#;
/// let config: Config = Config::from_json(json).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum points a node holds before it subdivides.
    #[serde(default = "Config::default_capacity")]
    pub capacity: usize,

    /// World boundary of the index root; points outside it are rejected.
    #[serde(default = "Config::default_world")]
    pub world: Boundary,
}

impl Config {
    const fn default_capacity() -> usize {
        4
    }

    const fn default_world() -> Boundary {
        Boundary::new(0.0, 0.0, 360.0, 180.0)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Node capacity must be greater than zero");
        self.capacity = capacity;
        self
    }

    pub fn with_world(mut self, world: Boundary) -> Self {
        self.world = world;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("Node capacity must be greater than zero".to_string());
        }

        if !self.world.is_finite() {
            return Err("World boundary must be finite (not NaN or infinity)".to_string());
        }

        if self.world.is_degenerate() {
            return Err("World boundary must have positive width and height".to_string());
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
            world: Self::default_world(),
        }
    }
}
