//! Tunable parameters for the water simulation.
//!
//! Both structs are serializable so they can live in `config.ron` and be
//! swapped in tests to run the same scenario at different flow speeds.

use serde::{Deserialize, Serialize};

/// Flow and commit parameters for `WaterFlowEngine`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterFlowConfig {
    /// Fraction of a level (or level difference) moved per iteration.
    pub flow_rate: f32,
    /// Transfers at or below this amount are dropped; a pass with no transfer
    /// above it has settled.
    pub settle_threshold: f32,
    /// Extra factor applied to sideways transfers.
    pub lateral_share: f32,
    /// Sideways transfer cap as a fraction of the source level, so a tile
    /// never drains sideways in a single iteration.
    pub lateral_drain_cap: f32,
    /// Commit: air or water above this level becomes a water tile.
    pub appear_threshold: f32,
    /// Commit: a water tile at or below this level becomes air.
    pub disappear_threshold: f32,
    /// Pass count used for bulk settling.
    pub default_iterations: u32,
}

impl Default for WaterFlowConfig {
    fn default() -> Self {
        Self {
            flow_rate: 0.3,
            settle_threshold: 0.1,
            lateral_share: 0.5,
            lateral_drain_cap: 0.25,
            appear_threshold: 0.3,
            disappear_threshold: 0.1,
            default_iterations: 20,
        }
    }
}

impl WaterFlowConfig {
    pub fn with_flow_rate(mut self, flow_rate: f32) -> Self {
        self.flow_rate = flow_rate;
        self.sanitized()
    }

    /// Replaces non-finite values with defaults and clamps fractions into
    /// [0, 1] so hand-edited configs cannot push levels out of range.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let fraction = |value: f32, fallback: f32| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };

        let disappear = fraction(self.disappear_threshold, defaults.disappear_threshold);
        Self {
            flow_rate: fraction(self.flow_rate, defaults.flow_rate),
            settle_threshold: fraction(self.settle_threshold, defaults.settle_threshold),
            lateral_share: fraction(self.lateral_share, defaults.lateral_share),
            lateral_drain_cap: fraction(self.lateral_drain_cap, defaults.lateral_drain_cap),
            appear_threshold: fraction(self.appear_threshold, defaults.appear_threshold)
                .max(disappear),
            disappear_threshold: disappear,
            default_iterations: self.default_iterations,
        }
    }
}

/// How often and over which area the scheduler runs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterScheduleConfig {
    /// Run at most once every this many frames (0 behaves like 1).
    pub update_interval: u32,
    /// Pass budget shared by all regions processed in one run.
    pub max_iterations_per_update: u32,
    /// Tiles added around each dirty region before simulating it.
    pub check_radius: i32,
}

impl Default for WaterScheduleConfig {
    fn default() -> Self {
        Self {
            update_interval: 4,
            max_iterations_per_update: 8,
            check_radius: 8,
        }
    }
}
