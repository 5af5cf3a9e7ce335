//! Fog of war for the frame loop: reveal around the player, keep the camera
//! on them and paint the overlay onto an in-memory canvas.

use bevy::prelude::*;
use bevy_log::debug;
use shared::{
    players::{CameraState, PlayerState},
    visibility::{FogCanvas, FogRenderMode, VisibilityOverlay},
    world::{GridTileMap, TileMap},
    GameConfig,
};

use crate::world::WorldSaveState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Headless canvas: records the rects of the last painted frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct FogFrame {
    width: u32,
    height: u32,
    fill_style: String,
    rects: Vec<FogRect>,
    frames_drawn: u64,
}

impl FogFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn rects(&self) -> &[FogRect] {
        &self.rects
    }

    pub fn fill_style(&self) -> &str {
        &self.fill_style
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    fn begin_frame(&mut self) {
        self.rects.clear();
        self.frames_drawn += 1;
    }
}

impl FogCanvas for FogFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_fill_style(&mut self, style: &str) {
        style.clone_into(&mut self.fill_style);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.rects.push(FogRect {
            x,
            y,
            width,
            height,
        });
    }
}

pub fn reveal_around_player_system(
    player: Res<PlayerState>,
    config: Res<GameConfig>,
    mut overlay: ResMut<VisibilityOverlay>,
    mut save_state: ResMut<WorldSaveState>,
) {
    if overlay.update_from_player(
        &player,
        config.world.tile_size,
        config.visibility.reveal_radius,
    ) {
        save_state.dirty = true;
    }
}

pub fn camera_follow_system(
    player: Res<PlayerState>,
    config: Res<GameConfig>,
    world_map: Res<GridTileMap>,
    frame: Res<FogFrame>,
    mut camera: ResMut<CameraState>,
) {
    let tile_size = config.world.tile_size;
    let view = Vec2::new(frame.width() as f32, frame.height() as f32);
    let world_pixels = Vec2::new(
        world_map.width() as f32 * tile_size,
        world_map.height() as f32 * tile_size,
    );
    camera.follow(&player, view, world_pixels);
}

pub fn render_fog_system(
    config: Res<GameConfig>,
    camera: Res<CameraState>,
    mut overlay: ResMut<VisibilityOverlay>,
    mut frame: ResMut<FogFrame>,
) {
    let tile_size = config.world.tile_size;
    if !overlay.needs_redraw(&camera) {
        return;
    }

    frame.begin_frame();
    let filled = match config.visibility.render_mode {
        FogRenderMode::PerTile => overlay.render(Some(&mut *frame), tile_size, &camera),
        FogRenderMode::Scaled => overlay.render_scaled(
            Some(&mut *frame),
            tile_size,
            &camera,
            config.visibility.block_scale,
        ),
    };
    debug!("Fog frame {}: {} rects", frame.frames_drawn(), filled);
}
