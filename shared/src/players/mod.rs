use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::world::pixel_to_tile;

/// Player bounding box in pixel space.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlayerState {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tile under the center of the bounding box.
    pub fn center_tile(&self, tile_size: f32) -> IVec2 {
        IVec2::new(
            pixel_to_tile(self.x + self.width / 2.0, tile_size),
            pixel_to_tile(self.y + self.height / 2.0, tile_size),
        )
    }
}

/// Top-left corner of the viewport in pixel space.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CameraState {
    pub x: f32,
    pub y: f32,
}

impl CameraState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn tile(&self, tile_size: f32) -> IVec2 {
        IVec2::new(
            pixel_to_tile(self.x, tile_size),
            pixel_to_tile(self.y, tile_size),
        )
    }

    /// Centers the viewport on the player, keeping it inside the world.
    pub fn follow(&mut self, player: &PlayerState, view: Vec2, world_pixels: Vec2) {
        let target = Vec2::new(
            player.x + player.width / 2.0 - view.x / 2.0,
            player.y + player.height / 2.0 - view.y / 2.0,
        );
        let max = (world_pixels - view).max(Vec2::ZERO);
        let clamped = target.clamp(Vec2::ZERO, max);
        self.x = clamped.x;
        self.y = clamped.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_tile_uses_bounding_box_center() {
        let player = PlayerState::new(160.0, 160.0, 16.0, 16.0);
        assert_eq!(player.center_tile(16.0), IVec2::new(10, 10));

        let tall = PlayerState::new(150.0, 150.0, 12.0, 40.0);
        assert_eq!(tall.center_tile(16.0), IVec2::new(9, 10));
    }

    #[test]
    fn camera_follow_clamps_to_world() {
        let mut camera = CameraState::default();
        let player = PlayerState::new(0.0, 0.0, 16.0, 16.0);
        camera.follow(&player, Vec2::new(320.0, 240.0), Vec2::new(1600.0, 1600.0));
        assert_eq!(camera, CameraState::new(0.0, 0.0));

        let player = PlayerState::new(800.0, 800.0, 16.0, 16.0);
        camera.follow(&player, Vec2::new(320.0, 240.0), Vec2::new(1600.0, 1600.0));
        assert_eq!(camera, CameraState::new(648.0, 688.0));
        assert_eq!(camera.tile(16.0), IVec2::new(40, 43));
    }
}
