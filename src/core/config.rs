//! Claim engine configuration with documented tunables
//!
//! Every threshold the engine applies lives here. Values can be overridden
//! from a TOML file; missing keys fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::error::{ClaimError, Result};
use crate::spatial::AreaMethod;

const MAX_WARNING_DISPLAY_SECS: f64 = 86_400.0;

/// Tunables for tracking, validation and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimConfig {
    // === CLOSURE ===
    /// Distance (metres) from the newest sample to the first sample below
    /// which the walked path is treated as a closed loop.
    ///
    /// Also the radius of the "start zone": closure is only armed once the
    /// player has been farther than this from the start.
    pub closure_distance_m: f64,

    /// Accumulated path length (metres) required before closure is considered
    ///
    /// Must exceed `closure_distance_m`, otherwise a player could close a
    /// loop by stepping out of the start zone and straight back.
    pub min_path_length_m: f64,

    /// Accepted samples required before closure is considered
    pub min_closure_samples: usize,

    // === ANTI-CHEAT ===
    /// Maximum implied speed (m/s) between two accepted samples
    ///
    /// At 8 m/s a sprinting player is still accepted while cycling and
    /// driving are not.
    pub max_speed_mps: f64,

    /// Maximum horizontal accuracy radius (metres) for a usable fix
    pub max_horizontal_accuracy_m: f64,

    /// Fixes closer than this (metres) to the last accepted sample are
    /// dropped as jitter. Standing still therefore adds no vertices.
    pub min_sample_spacing_m: f64,

    /// Suggested display duration for sample warnings (seconds)
    pub warning_display_secs: f64,

    // === POLYGON POLICY ===
    /// Minimum claimed area (square metres)
    pub min_area_m2: f64,

    /// Minimum spacing (metres) between non-adjacent vertices and between a
    /// vertex and any non-adjacent edge
    pub min_boundary_spacing_m: f64,

    /// How polygon area is measured
    pub area_method: AreaMethod,

    // === PLACEMENT ===
    /// Default clearance (metres) between a building site and the boundary
    pub default_placement_clearance_m: f64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            closure_distance_m: 15.0,
            min_path_length_m: 60.0,
            min_closure_samples: 4,

            max_speed_mps: 8.0,
            max_horizontal_accuracy_m: 50.0,
            min_sample_spacing_m: 1.0,
            warning_display_secs: 3.0,

            min_area_m2: 100.0,
            min_boundary_spacing_m: 2.0,
            area_method: AreaMethod::Planar,

            default_placement_clearance_m: 8.0,
        }
    }
}

impl ClaimConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClaimConfig = toml::from_str(content)?;
        config.validate().map_err(ClaimError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Display duration for sample warnings
    pub fn warning_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.warning_display_secs).unwrap_or(Duration::ZERO)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let positive = [
            ("closure_distance_m", self.closure_distance_m),
            ("min_path_length_m", self.min_path_length_m),
            ("max_speed_mps", self.max_speed_mps),
            ("max_horizontal_accuracy_m", self.max_horizontal_accuracy_m),
            ("min_area_m2", self.min_area_m2),
            ("min_boundary_spacing_m", self.min_boundary_spacing_m),
            ("default_placement_clearance_m", self.default_placement_clearance_m),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be a positive number, got {}", name, value));
            }
        }

        if !(self.min_sample_spacing_m.is_finite() && self.min_sample_spacing_m >= 0.0) {
            return Err(format!(
                "min_sample_spacing_m must be >= 0, got {}",
                self.min_sample_spacing_m
            ));
        }

        // Longer than a day is not a transient warning
        if !(self.warning_display_secs.is_finite()
            && (0.0..=MAX_WARNING_DISPLAY_SECS).contains(&self.warning_display_secs))
        {
            return Err(format!(
                "warning_display_secs must be between 0 and {}, got {}",
                MAX_WARNING_DISPLAY_SECS, self.warning_display_secs
            ));
        }

        if self.min_closure_samples < 3 {
            return Err(format!(
                "min_closure_samples ({}) must be at least 3",
                self.min_closure_samples
            ));
        }

        if self.min_path_length_m <= self.closure_distance_m {
            return Err(format!(
                "min_path_length_m ({}) should be > closure_distance_m ({})",
                self.min_path_length_m, self.closure_distance_m
            ));
        }

        if self.min_sample_spacing_m >= self.closure_distance_m {
            return Err(format!(
                "min_sample_spacing_m ({}) should be < closure_distance_m ({})",
                self.min_sample_spacing_m, self.closure_distance_m
            ));
        }

        Ok(())
    }
}
