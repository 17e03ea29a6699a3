//! Configuration types for lattice simulations.

use serde::{Deserialize, Serialize};

use super::Rule;

/// Lattice topology selector.
///
/// `Square` cells see the full 8-cell Moore neighborhood; `Hex` cells see
/// six neighbors under the odd-row-offset layout (odd rows shifted right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lattice {
    Square,
    Hex,
}

impl Lattice {
    /// Largest live-neighbor count a cell can observe on this lattice.
    #[inline]
    pub fn max_neighbors(&self) -> u8 {
        match self {
            Lattice::Square => 8,
            Lattice::Hex => 6,
        }
    }
}

/// Default cycle-classification bound.
fn default_max_period() -> u64 {
    50
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Lattice topology.
    pub lattice: Lattice,
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Birth/survival rule.
    pub rule: Rule,
    /// Wrap neighbor lookups around the grid edges instead of clipping.
    pub toroidal: bool,
    /// Longest recurrence still classified as periodic.
    #[serde(default = "default_max_period")]
    pub max_period: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            lattice: Lattice::Square,
            width: 64,
            height: 64,
            rule: Rule::default_for(Lattice::Square),
            toroidal: true,
            max_period: default_max_period(),
        }
    }
}

impl SimulationConfig {
    /// Get total cell count (width * height).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.max_period == 0 {
            return Err(ConfigError::InvalidMaxPeriod);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Max period must be non-zero")]
    InvalidMaxPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cell_count(), 64 * 64);
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let config = SimulationConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));

        let config = SimulationConfig {
            height: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_zero_max_period_is_rejected() {
        let config = SimulationConfig {
            max_period: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMaxPeriod)
        ));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = SimulationConfig {
            lattice: Lattice::Hex,
            width: 40,
            height: 30,
            rule: Rule::parse("B2/S34").unwrap(),
            toroidal: false,
            max_period: 25,
        };

        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.lattice, Lattice::Hex);
        assert_eq!(back.width, 40);
        assert_eq!(back.height, 30);
        assert_eq!(back.rule, config.rule);
        assert!(!back.toroidal);
        assert_eq!(back.max_period, 25);
    }

    #[test]
    fn test_max_period_defaults_when_omitted() {
        let json = r#"{
            "lattice": "square",
            "width": 16,
            "height": 16,
            "rule": "B3/S23",
            "toroidal": true
        }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_period, 50);
    }
}
