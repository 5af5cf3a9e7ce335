use bevy::math::IVec2;
use serde::{Deserialize, Serialize};

pub const LATERAL_NEIGHBORS: [IVec2; 2] = [IVec2::new(-1, 0), IVec2::new(1, 0)];

/// Tile containing the given pixel coordinate. Flooring keeps negative pixels
/// on the correct side of the origin.
#[inline]
pub fn pixel_to_tile(pixel: f32, tile_size: f32) -> i32 {
    (pixel / tile_size).floor() as i32
}

#[inline]
pub fn in_bounds(pos: IVec2, width: u32, height: u32) -> bool {
    pos.x >= 0 && pos.y >= 0 && (pos.x as i64) < width as i64 && (pos.y as i64) < height as i64
}

#[inline]
fn span(min: i32, max: i32) -> i32 {
    (max as i64 - min as i64).clamp(0, i32::MAX as i64) as i32
}

/// Half-open rectangle of tiles: `min` is included, `max` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub min: IVec2,
    pub max: IVec2,
}

impl TileRect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: IVec2::new(x0, y0),
            max: IVec2::new(x1, y1),
        }
    }

    pub fn from_point(pos: IVec2) -> Self {
        Self {
            min: pos,
            max: IVec2::new(pos.x.saturating_add(1), pos.y.saturating_add(1)),
        }
    }

    pub fn world(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        span(self.min.x, self.max.x)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        span(self.min.y, self.max.y)
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= self.min.x && pos.y >= self.min.y && pos.x < self.max.x && pos.y < self.max.y
    }

    /// Grows the rectangle by `amount` on every side, saturating at the i32
    /// range.
    pub fn inflate(&self, amount: i32) -> Self {
        Self {
            min: IVec2::new(
                self.min.x.saturating_sub(amount),
                self.min.y.saturating_sub(amount),
            ),
            max: IVec2::new(
                self.max.x.saturating_add(amount),
                self.max.y.saturating_add(amount),
            ),
        }
    }

    pub fn intersect(&self, other: &TileRect) -> Self {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max).max(min);
        Self { min, max }
    }

    pub fn clip_to_world(&self, width: u32, height: u32) -> Self {
        self.intersect(&TileRect::world(width, height))
    }

    pub fn union(&self, other: &TileRect) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Row-major iteration over every tile of the rectangle.
    pub fn iter(&self) -> impl Iterator<Item = IVec2> + '_ {
        (self.min.y..self.max.y)
            .flat_map(move |y| (self.min.x..self.max.x).map(move |x| IVec2::new(x, y)))
    }
}
