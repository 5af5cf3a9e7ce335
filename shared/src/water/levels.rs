use bevy::prelude::*;

use crate::world::{TileId, TileMap, TileRect};

/// Level stored for tiles water cannot enter.
pub const SOLID_LEVEL: f32 = -1.0;

/// Transient per-tile water field covering `area`.
///
/// Values are `SOLID_LEVEL` for solid tiles, 0 for empty fluid-capable tiles
/// and (0, 1] for saturation. The field is rebuilt from the tile map at the
/// start of every simulation and dropped after the commit; water tiles are
/// the only durable record.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterLevels {
    area: TileRect,
    levels: Vec<f32>,
}

impl WaterLevels {
    /// All-zero field: every tile fluid-capable and empty.
    pub fn new(area: TileRect) -> Self {
        Self {
            area,
            levels: vec![0.0; area.area()],
        }
    }

    /// Classifies every tile of `area`: solid or missing tiles get
    /// `SOLID_LEVEL`, water tiles are full, everything else is empty.
    pub fn classify<M: TileMap + ?Sized>(map: &M, area: TileRect) -> Self {
        let levels = area
            .iter()
            .map(|pos| match map.get_tile(&pos) {
                None => SOLID_LEVEL,
                Some(tile) if tile.is_solid() => SOLID_LEVEL,
                Some(TileId::Water) => 1.0,
                Some(_) => 0.0,
            })
            .collect();
        Self { area, levels }
    }

    #[inline]
    pub fn area(&self) -> TileRect {
        self.area
    }

    #[inline]
    fn index(&self, pos: IVec2) -> Option<usize> {
        self.area.contains(pos).then(|| {
            let local = pos - self.area.min;
            local.y as usize * self.area.width() as usize + local.x as usize
        })
    }

    /// Level at `pos`, `None` outside the field.
    #[inline]
    pub fn get(&self, pos: IVec2) -> Option<f32> {
        self.index(pos).map(|i| self.levels[i])
    }

    /// No-op outside the field.
    #[inline]
    pub fn set(&mut self, pos: IVec2, level: f32) {
        if let Some(i) = self.index(pos) {
            self.levels[i] = level;
        }
    }

    #[inline]
    pub(crate) fn add(&mut self, pos: IVec2, amount: f32) {
        if let Some(i) = self.index(pos) {
            self.levels[i] += amount;
        }
    }

    #[inline]
    pub fn is_fluid_capable(&self, pos: IVec2) -> bool {
        self.get(pos).is_some_and(|level| level >= 0.0)
    }

    /// Clamps every fluid-capable tile into [0, 1]. Solid tiles keep
    /// `SOLID_LEVEL`; NaN collapses to empty.
    pub(crate) fn clamp_fluid(&mut self) {
        for level in self.levels.iter_mut().filter(|l| **l != SOLID_LEVEL) {
            *level = if level.is_nan() {
                0.0
            } else {
                level.clamp(0.0, 1.0)
            };
        }
    }

    /// Sum of all positive levels.
    pub fn total_volume(&self) -> f32 {
        self.levels.iter().filter(|l| **l > 0.0).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec2, f32)> + '_ {
        self.area.iter().zip(self.levels.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::GridTileMap;

    #[test]
    fn classify_marks_solid_water_and_empty() {
        let mut map = GridTileMap::new(3, 2);
        map.set_tile(&IVec2::new(0, 0), TileId::Stone);
        map.set_tile(&IVec2::new(1, 0), TileId::Water);
        map.set_tile(&IVec2::new(2, 0), TileId::Flower);

        let levels = WaterLevels::classify(&map, TileRect::world(3, 2));
        assert_eq!(levels.get(IVec2::new(0, 0)), Some(SOLID_LEVEL));
        assert_eq!(levels.get(IVec2::new(1, 0)), Some(1.0));
        assert_eq!(levels.get(IVec2::new(2, 0)), Some(0.0));
        assert_eq!(levels.get(IVec2::new(2, 1)), Some(0.0));
        assert_eq!(levels.get(IVec2::new(3, 0)), None);
    }

    #[test]
    fn tiles_outside_the_map_classify_as_solid() {
        let map = GridTileMap::new(2, 2);
        let levels = WaterLevels::classify(&map, TileRect::new(-1, 0, 3, 2));
        assert_eq!(levels.get(IVec2::new(-1, 0)), Some(SOLID_LEVEL));
        assert_eq!(levels.get(IVec2::new(0, 0)), Some(0.0));
        assert_eq!(levels.get(IVec2::new(2, 1)), Some(SOLID_LEVEL));
    }

    #[test]
    fn offset_area_indexes_locally() {
        let mut levels = WaterLevels::new(TileRect::new(10, 20, 13, 22));
        levels.set(IVec2::new(12, 21), 0.5);
        levels.set(IVec2::new(0, 0), 0.9);
        assert_eq!(levels.get(IVec2::new(12, 21)), Some(0.5));
        assert_eq!(levels.total_volume(), 0.5);
        assert_eq!(levels.iter().count(), 6);
    }

    #[test]
    fn clamp_keeps_solid_tiles() {
        let mut levels = WaterLevels::new(TileRect::new(0, 0, 4, 1));
        levels.set(IVec2::new(0, 0), SOLID_LEVEL);
        levels.set(IVec2::new(1, 0), 1.4);
        levels.set(IVec2::new(2, 0), -0.2);
        levels.set(IVec2::new(3, 0), f32::NAN);
        levels.clamp_fluid();

        assert_eq!(levels.get(IVec2::new(0, 0)), Some(SOLID_LEVEL));
        assert_eq!(levels.get(IVec2::new(1, 0)), Some(1.0));
        assert_eq!(levels.get(IVec2::new(2, 0)), Some(0.0));
        assert_eq!(levels.get(IVec2::new(3, 0)), Some(0.0));
    }
}
