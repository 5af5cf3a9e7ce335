//! Cellular water flow.
//!
//! Each pass reads the previous field and writes a copy, visiting rows from
//! the bottom up and columns left to right. A tile first pours into the tile
//! below, then spreads sideways using whatever it has left. Nothing flows
//! upward. A pass with no transfer above `settle_threshold` means the field
//! has settled and the driver stops early.

use bevy::prelude::*;

use super::{WaterFlowConfig, WaterLevels};
use crate::world::{TileMap, TileRect, LATERAL_NEIGHBORS};

/// Result of running the flow driver.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterSimulation {
    pub levels: WaterLevels,
    /// Passes actually run, never more than requested.
    pub passes: u32,
    /// True when the last pass moved nothing.
    pub converged: bool,
    /// Individual tile transfers over all passes.
    pub transfers: usize,
}

/// Water engine sized to the world it simulates.
#[derive(Resource, Debug, Clone)]
pub struct WaterFlowEngine {
    width: u32,
    height: u32,
    config: WaterFlowConfig,
}

impl WaterFlowEngine {
    pub fn new(width: u32, height: u32, config: WaterFlowConfig) -> Self {
        Self {
            width,
            height,
            config: config.sanitized(),
        }
    }

    #[inline]
    pub fn config(&self) -> &WaterFlowConfig {
        &self.config
    }

    #[inline]
    pub fn bounds(&self) -> TileRect {
        TileRect::world(self.width, self.height)
    }

    /// Builds the level field for the whole world. Without a map the field is
    /// all zero and nothing will flow.
    pub fn init_water_levels<M: TileMap + ?Sized>(&self, map: Option<&M>) -> WaterLevels {
        match map {
            Some(map) => WaterLevels::classify(map, self.bounds()),
            None => {
                log::warn!("No tile map available, water levels left empty");
                WaterLevels::new(self.bounds())
            }
        }
    }

    /// Settles the whole world for up to `iterations` passes.
    pub fn simulate_water_physics<M: TileMap + ?Sized>(
        &self,
        map: Option<&M>,
        iterations: u32,
    ) -> WaterSimulation {
        let Some(map) = map else {
            return WaterSimulation {
                levels: self.init_water_levels::<M>(None),
                passes: 0,
                converged: false,
                transfers: 0,
            };
        };
        self.simulate_region(map, self.bounds(), iterations)
    }

    /// Settles only `window`. The field also covers a one tile halo around
    /// the window so water can leave it, but halo tiles are never visited.
    pub fn simulate_region<M: TileMap + ?Sized>(
        &self,
        map: &M,
        window: TileRect,
        iterations: u32,
    ) -> WaterSimulation {
        let bounds = self.bounds().intersect(&map.bounds());
        let window = window.intersect(&bounds);
        let levels = WaterLevels::classify(map, window.inflate(1).intersect(&bounds));
        self.settle(levels, window, iterations)
    }

    /// Runs the pass driver over an already built field.
    pub fn settle(&self, levels: WaterLevels, window: TileRect, iterations: u32) -> WaterSimulation {
        let window = window.intersect(&levels.area());
        let mut simulation = WaterSimulation {
            levels,
            passes: 0,
            converged: false,
            transfers: 0,
        };
        if window.is_empty() {
            simulation.converged = true;
            return simulation;
        }

        while simulation.passes < iterations {
            let (next, transfers) = self.run_pass(&simulation.levels, window);
            simulation.levels = next;
            simulation.passes += 1;
            simulation.transfers += transfers;
            if transfers == 0 {
                simulation.converged = true;
                break;
            }
        }

        log::debug!(
            "Water settle over {:?}: {} passes, {} transfers, converged: {}",
            window,
            simulation.passes,
            simulation.transfers,
            simulation.converged
        );
        simulation
    }

    fn run_pass(&self, current: &WaterLevels, window: TileRect) -> (WaterLevels, usize) {
        let mut next = current.clone();
        let mut transfers = 0;
        for y in (window.min.y..window.max.y).rev() {
            for x in window.min.x..window.max.x {
                transfers += self.flow_tile(current, &mut next, IVec2::new(x, y));
            }
        }
        next.clamp_fluid();
        (next, transfers)
    }

    /// Applies gravity then lateral flow for one tile. Reads neighbor levels
    /// from `current`, writes every transfer into `next`, and returns how many
    /// transfers happened.
    fn flow_tile(&self, current: &WaterLevels, next: &mut WaterLevels, pos: IVec2) -> usize {
        let config = &self.config;
        let Some(mut level) = current.get(pos) else {
            return 0;
        };
        if level <= 0.0 {
            return 0;
        }
        let mut transfers = 0;

        // y grows downward
        let below = pos + IVec2::Y;
        if current.is_fluid_capable(below) {
            let below_level = current.get(below).unwrap_or_default();
            let amount = (level * config.flow_rate).min(1.0 - below_level);
            if amount > config.settle_threshold {
                next.add(pos, -amount);
                next.add(below, amount);
                level -= amount;
                transfers += 1;
            }
        }

        for offset in LATERAL_NEIGHBORS {
            let side = pos + offset;
            if !current.is_fluid_capable(side) {
                continue;
            }
            let diff = level - current.get(side).unwrap_or_default();
            if diff > config.settle_threshold {
                let amount = (diff * config.flow_rate * config.lateral_share)
                    .min(level * config.lateral_drain_cap);
                next.add(pos, -amount);
                next.add(side, amount);
                level -= amount;
                transfers += 1;
            }
        }

        transfers
    }
}
