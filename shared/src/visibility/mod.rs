//! Persistent fog of war.
//!
//! One explored flag per world tile, packed 64 to a word. The overlay only ever
//! grows through reveal calls (normally `update_from_player` once per frame)
//! and is cleared by `reset`. Every coordinate-taking method treats
//! out-of-range input as "no effect": the frame loop must never stall on an
//! off-grid query.
//!
//! Two representations are kept on purpose:
//! - the dense bit grid answers `is_explored` in O(1) while rendering;
//! - the sparse `ExploredTiles` map (see `serialize`) is what gets saved, so
//!   mostly unexplored worlds stay small on disk.

mod render;
mod serialize;

pub use render::*;
pub use serialize::*;

use bevy::prelude::*;

use crate::{
    constants::DEFAULT_FOG_COLOR,
    players::{CameraState, PlayerState},
};

const WORD_BITS: usize = u64::BITS as usize;

/// Advisory bookkeeping for renderers that want to skip redundant redraws.
/// Nothing in the overlay depends on it being consulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCache {
    pub last_player_tile: Option<IVec2>,
    /// Exact camera position of the last render. Fog rects move with the
    /// sub-tile offset, so the tile alone is not enough.
    pub last_camera: Option<CameraState>,
    pub needs_update: bool,
}

impl Default for RenderCache {
    fn default() -> Self {
        Self {
            last_player_tile: None,
            last_camera: None,
            needs_update: true,
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct VisibilityOverlay {
    width: u32,
    height: u32,
    explored: Vec<u64>,
    explored_count: usize,
    fog_color: String,
    cache: RenderCache,
}

impl VisibilityOverlay {
    /// All-unexplored overlay sized to the world.
    pub fn new(width: u32, height: u32) -> Self {
        let tiles = width as usize * height as usize;
        Self {
            width,
            height,
            explored: vec![0; tiles.div_ceil(WORD_BITS)],
            explored_count: 0,
            fog_color: DEFAULT_FOG_COLOR.to_string(),
            cache: RenderCache::default(),
        }
    }

    pub fn with_fog_color(mut self, color: impl Into<String>) -> Self {
        self.fog_color = color.into();
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of flags in the grid, always `width * height`.
    #[inline]
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn explored_count(&self) -> usize {
        self.explored_count
    }

    pub fn fog_color(&self) -> &str {
        &self.fog_color
    }

    pub fn render_cache(&self) -> &RenderCache {
        &self.cache
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn is_explored(&self, x: i32, y: i32) -> bool {
        self.index(x, y)
            .is_some_and(|i| self.explored[i / WORD_BITS] & (1u64 << (i % WORD_BITS)) != 0)
    }

    /// Marks a tile explored. Returns true only on the unexplored -> explored
    /// transition, so callers can tell a new discovery from a repeat.
    pub fn set_explored(&mut self, x: i32, y: i32) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        let word = &mut self.explored[i / WORD_BITS];
        let mask = 1u64 << (i % WORD_BITS);
        if *word & mask != 0 {
            return false;
        }
        *word |= mask;
        self.explored_count += 1;
        true
    }

    /// Applies `set_explored` to every tile; true if any was new.
    pub fn set_explored_batch(&mut self, tiles: impl IntoIterator<Item = (i32, i32)>) -> bool {
        tiles
            .into_iter()
            .fold(false, |any, (x, y)| self.set_explored(x, y) | any)
    }

    pub fn reset(&mut self) {
        self.explored.fill(0);
        self.explored_count = 0;
        self.cache.needs_update = true;
    }

    /// Reveals the filled circle of tiles within `radius` (Euclidean, in
    /// tiles) of `center`.
    pub fn reveal_circle(&mut self, center: IVec2, radius: i32) -> bool {
        let radius = radius.max(0) as i64;
        let radius_sq = radius * radius;
        // offsets from the center that stay on the grid
        let clip = |center: i32, size: u32| {
            let center = center as i64;
            (-radius).max(-center)..=radius.min(size as i64 - 1 - center)
        };
        let mut revealed = false;
        for dy in clip(center.y, self.height) {
            let y = (center.y as i64 + dy) as i32;
            for dx in clip(center.x, self.width) {
                if (dx * dx).saturating_add(dy * dy) <= radius_sq {
                    revealed |= self.set_explored((center.x as i64 + dx) as i32, y);
                }
            }
        }
        revealed
    }

    /// Reveals around the tile under the player's center. Returns true if
    /// anything was newly explored.
    pub fn update_from_player(
        &mut self,
        player: &PlayerState,
        tile_size: f32,
        reveal_radius: i32,
    ) -> bool {
        if !tile_size.is_finite() || tile_size <= 0.0 {
            log::debug!("Ignoring reveal with invalid tile size {}", tile_size);
            return false;
        }

        let player_tile = player.center_tile(tile_size);
        let revealed = self.reveal_circle(player_tile, reveal_radius);

        self.cache.last_player_tile = Some(player_tile);
        if revealed {
            self.cache.needs_update = true;
        }
        revealed
    }

    /// Whether the cached state says the fog seen from `camera` must be
    /// redrawn.
    pub fn needs_redraw(&self, camera: &CameraState) -> bool {
        self.cache.needs_update || self.cache.last_camera != Some(*camera)
    }

    fn mark_rendered(&mut self, camera: &CameraState) {
        self.cache.last_camera = Some(*camera);
        self.cache.needs_update = false;
    }

    /// Indices of all explored tiles in ascending order.
    fn explored_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.explored
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let bit = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    Some(word_index * WORD_BITS + bit)
                })
            })
    }
}
