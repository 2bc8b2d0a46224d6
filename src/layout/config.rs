//! Simulation tunables.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Configuration for the force simulation.
///
/// Every field has a default, so a partial document only overrides what it
/// names:
///
/// ```
/// use graph_sketch::layout::ForceConfig;
///
/// let config = ForceConfig::from_json(r#"{ "rest_length": 80 }"#).unwrap();
/// assert_eq!(config.rest_length, 80.0);
/// assert_eq!(config.repulse_const, 500.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Target spring length for edges (default: 50.0).
    pub rest_length: f64,
    /// Repulsion numerator; force is `repulse_const / d²` (default: 500.0).
    pub repulse_const: f64,
    /// Spring stiffness beyond the rest length (default: 0.002).
    pub attract_const: f64,
    /// Fraction of velocity lost each step (default: 0.03).
    pub friction_const: f64,
    /// Distance floor used by the force terms (default: 10.0).
    pub min_distance: f64,
    /// Seed for the placement jitter sequence (default: 0).
    pub placement_seed: u32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            rest_length: 50.0,
            repulse_const: 500.0,
            attract_const: 0.002,
            friction_const: 0.03,
            min_distance: 10.0,
            placement_seed: 0,
        }
    }
}

impl ForceConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the simulation diverge or divide by zero.
    pub fn validate(&self) -> Result<()> {
        if !(self.rest_length.is_finite() && self.rest_length > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "rest_length must be positive, got {}",
                self.rest_length
            )));
        }
        if !(self.min_distance.is_finite() && self.min_distance > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "min_distance must be positive, got {}",
                self.min_distance
            )));
        }
        for (name, value) in [
            ("repulse_const", self.repulse_const),
            ("attract_const", self.attract_const),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GraphError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.friction_const) {
            return Err(GraphError::InvalidConfig(format!(
                "friction_const must be within [0, 1], got {}",
                self.friction_const
            )));
        }
        Ok(())
    }
}

/// Visible extent of the drawing surface, in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(ForceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = ForceConfig::from_json(r#"{"friction_const": 0.1}"#).unwrap();
        assert_eq!(config.friction_const, 0.1);
        assert_eq!(config.rest_length, 50.0);
        assert_eq!(config.min_distance, 10.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = ForceConfig {
            rest_length: 0.0,
            ..ForceConfig::default()
        };
        assert!(matches!(bad.validate(), Err(GraphError::InvalidConfig(_))));

        let bad = ForceConfig {
            friction_const: 1.5,
            ..ForceConfig::default()
        };
        assert!(bad.validate().is_err());

        let bad = ForceConfig {
            repulse_const: f64::NAN,
            ..ForceConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ForceConfig::from_json("{ rest_length: "),
            Err(GraphError::Json(_))
        ));
    }
}
