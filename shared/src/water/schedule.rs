//! Bounded, region-based driving of the water engine.
//!
//! Tile mutations enqueue the touched area. Every `update_interval` frames the
//! scheduler drains the queue in FIFO order until the pass budget runs out,
//! simulating each region inflated by `check_radius` and committing the
//! result. Regions that did not settle, and the area the commit changed, are
//! queued again so the flow continues on a later frame.

use std::collections::{HashSet, VecDeque};

use bevy::prelude::*;

use super::{WaterFlowEngine, WaterScheduleConfig};
use crate::world::{TileMap, TileRect};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    pub regions: usize,
    pub iterations: u32,
    pub mutated: usize,
    pub requeued: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Not a simulation frame.
    Skipped,
    /// Simulation frame with nothing queued.
    Idle,
    Processed(ScheduleStats),
}

#[derive(Resource, Debug, Default)]
pub struct WaterScheduler {
    config: WaterScheduleConfig,
    pending: VecDeque<TileRect>,
    /// Set for O(1) duplicate checking
    pending_set: HashSet<TileRect>,
    frame: u64,
}

impl WaterScheduler {
    pub fn new(config: WaterScheduleConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &WaterScheduleConfig {
        &self.config
    }

    /// Queues the area around a single changed tile.
    pub fn mark_dirty(&mut self, pos: IVec2) {
        self.mark_dirty_rect(TileRect::from_point(pos));
    }

    pub fn mark_dirty_rect(&mut self, rect: TileRect) {
        if rect.is_empty() {
            return;
        }
        if self.pending_set.insert(rect) {
            self.pending.push_back(rect);
        }
    }

    fn pop(&mut self) -> Option<TileRect> {
        let rect = self.pending.pop_front()?;
        self.pending_set.remove(&rect);
        Some(rect)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.pending_set.clear();
    }

    /// Advances one frame and, on simulation frames, spends the pass budget
    /// on queued regions.
    pub fn tick<M: TileMap + ?Sized>(
        &mut self,
        engine: &WaterFlowEngine,
        map: &mut M,
    ) -> ScheduleOutcome {
        let frame = self.frame;
        self.frame = self.frame.wrapping_add(1);

        let interval = u64::from(self.config.update_interval.max(1));
        if frame % interval != 0 {
            return ScheduleOutcome::Skipped;
        }
        if self.is_idle() {
            return ScheduleOutcome::Idle;
        }

        let mut budget = self.config.max_iterations_per_update;
        let mut stats = ScheduleStats::default();
        let mut requeue = Vec::new();

        while budget > 0 {
            let Some(region) = self.pop() else {
                break;
            };
            let window = region
                .inflate(self.config.check_radius.max(0))
                .clip_to_world(map.width(), map.height());
            if window.is_empty() {
                continue;
            }

            let simulation = engine.simulate_region(map, window, budget);
            budget = budget.saturating_sub(simulation.passes);
            stats.iterations += simulation.passes;
            stats.regions += 1;

            let commit = engine.apply_water_to_world(map, &simulation.levels);
            stats.mutated += commit.mutated;

            if !simulation.converged {
                requeue.push(region);
            }
            if let Some(changed) = commit.changed_area {
                requeue.push(changed);
            }
        }

        // Requeued regions wait for the next simulation frame.
        for region in requeue {
            let before = self.pending();
            self.mark_dirty_rect(region);
            stats.requeued += self.pending() - before;
        }

        log::debug!(
            "Water schedule frame {}: {} regions, {} passes, {} tiles changed, {} pending",
            frame,
            stats.regions,
            stats.iterations,
            stats.mutated,
            self.pending()
        );
        ScheduleOutcome::Processed(stats)
    }
}
