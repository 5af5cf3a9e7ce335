use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{in_bounds, TileId, TileRect};

/// Accessor the overlays use to read and mutate terrain.
pub trait TileMap {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Returns `None` outside the map.
    fn get_tile(&self, position: &IVec2) -> Option<TileId>;

    /// No-op outside the map.
    fn set_tile(&mut self, position: &IVec2, tile: TileId);

    fn bounds(&self) -> TileRect {
        TileRect::world(self.width(), self.height())
    }

    fn is_solid_at(&self, position: &IVec2) -> bool {
        self.get_tile(position).is_some_and(|tile| tile.is_solid())
    }
}

/// Dense row-major tile grid, `index = y * width + x`.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridTileMap {
    width: u32,
    height: u32,
    tiles: Vec<TileId>,
}

impl GridTileMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TileId::Air)
    }

    pub fn filled(width: u32, height: u32, tile: TileId) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width as usize * height as usize],
        }
    }

    /// Air above `ground_level`, a grass surface row, dirt below.
    pub fn flat(width: u32, height: u32, ground_level: u32) -> Self {
        let mut map = Self::new(width, height);
        for y in ground_level.min(height)..height {
            let tile = if y == ground_level {
                TileId::Grass
            } else {
                TileId::Dirt
            };
            for x in 0..width {
                map.set_tile(&IVec2::new(x as i32, y as i32), tile);
            }
        }
        map
    }

    /// Rebuilds a map from saved rows. Returns `None` when the tile count does
    /// not match the dimensions.
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<TileId>) -> Option<Self> {
        (tiles.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn count(&self, tile: TileId) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    #[inline]
    fn index(&self, position: &IVec2) -> Option<usize> {
        in_bounds(*position, self.width, self.height)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }
}

impl TileMap for GridTileMap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_tile(&self, position: &IVec2) -> Option<TileId> {
        self.index(position).map(|i| self.tiles[i])
    }

    fn set_tile(&mut self, position: &IVec2, tile: TileId) {
        if let Some(i) = self.index(position) {
            self.tiles[i] = tile;
        }
    }
}
