use bevy::prelude::*;

use super::{WaterFlowEngine, WaterLevels};
use crate::world::{TileId, TileMap, TileRect};

/// What a commit changed in the tile map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Tiles whose identity changed.
    pub mutated: usize,
    /// Bounding rectangle of the changed tiles, if any.
    pub changed_area: Option<TileRect>,
}

impl CommitReport {
    fn record(&mut self, pos: IVec2) {
        let point = TileRect::from_point(pos);
        self.mutated += 1;
        self.changed_area = Some(match self.changed_area {
            Some(area) => area.union(&point),
            None => point,
        });
    }
}

impl WaterFlowEngine {
    /// Turns a settled field back into tiles. Air or water above the appear
    /// threshold becomes water, water at or below the disappear threshold
    /// becomes air, everything else is left alone. Only tiles whose identity
    /// changes are written, so committing the same field twice is a no-op.
    pub fn apply_water_to_world<M: TileMap + ?Sized>(
        &self,
        map: &mut M,
        levels: &WaterLevels,
    ) -> CommitReport {
        let config = self.config();
        let mut report = CommitReport::default();

        for (pos, level) in levels.iter() {
            let Some(tile) = map.get_tile(&pos) else {
                continue;
            };
            let target = if level > config.appear_threshold && tile.is_air_or_water() {
                TileId::Water
            } else if tile == TileId::Water && level <= config.disappear_threshold {
                TileId::Air
            } else {
                tile
            };

            if target != tile {
                map.set_tile(&pos, target);
                report.record(pos);
            }
        }

        if report.mutated > 0 {
            log::debug!(
                "Water commit changed {} tiles in {:?}",
                report.mutated,
                report.changed_area
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{water::WaterFlowConfig, world::GridTileMap};

    fn engine(width: u32, height: u32) -> WaterFlowEngine {
        WaterFlowEngine::new(width, height, WaterFlowConfig::default())
    }

    #[test]
    fn thresholds_are_strict_and_inclusive() {
        let mut map = GridTileMap::new(6, 1);
        map.set_tile(&IVec2::new(1, 0), TileId::Water);
        map.set_tile(&IVec2::new(2, 0), TileId::Water);
        map.set_tile(&IVec2::new(4, 0), TileId::Flower);
        map.set_tile(&IVec2::new(5, 0), TileId::Stone);

        let mut levels = WaterLevels::classify(&map, map.bounds());
        levels.set(IVec2::new(0, 0), 0.3);
        levels.set(IVec2::new(1, 0), 0.1);
        levels.set(IVec2::new(2, 0), 0.11);
        levels.set(IVec2::new(3, 0), 0.31);
        levels.set(IVec2::new(4, 0), 0.9);

        let report = engine(6, 1).apply_water_to_world(&mut map, &levels);

        assert_eq!(map.get_tile(&IVec2::new(0, 0)), Some(TileId::Air));
        assert_eq!(map.get_tile(&IVec2::new(1, 0)), Some(TileId::Air));
        assert_eq!(map.get_tile(&IVec2::new(2, 0)), Some(TileId::Water));
        assert_eq!(map.get_tile(&IVec2::new(3, 0)), Some(TileId::Water));
        assert_eq!(map.get_tile(&IVec2::new(4, 0)), Some(TileId::Flower));
        assert_eq!(map.get_tile(&IVec2::new(5, 0)), Some(TileId::Stone));
        assert_eq!(report.mutated, 2);
        assert_eq!(report.changed_area, Some(TileRect::new(1, 0, 4, 1)));
    }

    #[test]
    fn commit_is_idempotent() {
        let mut map = GridTileMap::new(1, 3);
        map.set_tile(&IVec2::new(0, 0), TileId::Water);
        map.set_tile(&IVec2::new(0, 2), TileId::Stone);
        let engine = engine(1, 3);

        let result = engine.simulate_water_physics(Some(&map), 20);
        let first = engine.apply_water_to_world(&mut map, &result.levels);
        assert_eq!(first.mutated, 1);
        assert_eq!(map.get_tile(&IVec2::new(0, 1)), Some(TileId::Water));
        assert_eq!(map.get_tile(&IVec2::new(0, 0)), Some(TileId::Water));

        let snapshot = map.clone();
        let second = engine.apply_water_to_world(&mut map, &result.levels);
        assert_eq!(second, CommitReport::default());
        assert_eq!(map, snapshot);
    }

    #[test]
    fn field_tiles_outside_the_map_are_skipped() {
        let mut map = GridTileMap::new(2, 1);
        let mut levels = WaterLevels::new(TileRect::new(-1, 0, 3, 1));
        for x in -1..3 {
            levels.set(IVec2::new(x, 0), 1.0);
        }

        let report = engine(2, 1).apply_water_to_world(&mut map, &levels);
        assert_eq!(report.mutated, 2);
        assert_eq!(map.count(TileId::Water), 2);
    }
}
