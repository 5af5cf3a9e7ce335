use std::ops::Range;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::VisibilityOverlay;
use crate::{players::CameraState, world::pixel_to_tile};

/// Minimal 2D drawing surface the fog is painted on.
pub trait FogCanvas {
    /// Pixel width of the surface.
    fn width(&self) -> u32;
    /// Pixel height of the surface.
    fn height(&self) -> u32;
    fn set_fill_style(&mut self, style: &str);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
}

/// Which render path the frame loop uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FogRenderMode {
    /// One rect per unexplored tile, exact boundaries.
    #[default]
    PerTile,
    /// One rect per fully unexplored block of tiles.
    Scaled,
}

/// Visible window along one axis: first cell under the camera, the offsets
/// from it of the visible cells that lie in `0..cells`, and the sub-cell
/// pixel offset of the camera.
fn visible_span(camera: f32, canvas: u32, cell_size: f32, cells: u32) -> (i32, Range<i32>, f32) {
    let start = pixel_to_tile(camera, cell_size);
    let count = ((canvas as f32 / cell_size).ceil() as i32).saturating_add(1);
    let first = (-(start as i64)).max(0);
    let last = (count as i64).min(cells as i64 - start as i64).max(first);
    (
        start,
        first as i32..last as i32,
        camera.rem_euclid(cell_size),
    )
}

impl VisibilityOverlay {
    /// Paints every visible, in-bounds, unexplored tile. Returns the number of
    /// rects filled; a missing or empty canvas draws nothing.
    pub fn render<C: FogCanvas + ?Sized>(
        &mut self,
        canvas: Option<&mut C>,
        tile_size: f32,
        camera: &CameraState,
    ) -> usize {
        let Some(canvas) = canvas else {
            return 0;
        };
        if canvas.width() == 0 || canvas.height() == 0 {
            return 0;
        }
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return 0;
        }

        let (start_x, cols, offset_x) =
            visible_span(camera.x, canvas.width(), tile_size, self.width);
        let (start_y, rows, offset_y) =
            visible_span(camera.y, canvas.height(), tile_size, self.height);

        canvas.set_fill_style(&self.fog_color);

        let mut filled = 0;
        for row in rows {
            let tile_y = start_y.saturating_add(row);
            if tile_y < 0 || tile_y as u32 >= self.height {
                continue;
            }
            let screen_y = (row as f32 * tile_size - offset_y).round();

            for col in cols.clone() {
                let tile_x = start_x.saturating_add(col);
                if tile_x < 0 || tile_x as u32 >= self.width {
                    continue;
                }
                if self.is_explored(tile_x, tile_y) {
                    continue;
                }
                let screen_x = (col as f32 * tile_size - offset_x).round();
                canvas.fill_rect(screen_x, screen_y, tile_size, tile_size);
                filled += 1;
            }
        }

        self.mark_rendered(camera);
        filled
    }

    /// Block-granular fog: a `block_scale`² block is painted only when all of
    /// its in-bounds tiles are unexplored. Cheaper than `render` at the cost of
    /// ragged edges around explored areas.
    pub fn render_scaled<C: FogCanvas + ?Sized>(
        &mut self,
        canvas: Option<&mut C>,
        tile_size: f32,
        camera: &CameraState,
        block_scale: u32,
    ) -> usize {
        let Some(canvas) = canvas else {
            return 0;
        };
        if canvas.width() == 0 || canvas.height() == 0 {
            return 0;
        }
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return 0;
        }

        let scale = block_scale.clamp(1, i32::MAX as u32) as i32;
        let block_size = tile_size * scale as f32;

        let block_cells = |tiles: u32| tiles.div_ceil(scale as u32);
        let (start_bx, cols, offset_x) =
            visible_span(camera.x, canvas.width(), block_size, block_cells(self.width));
        let (start_by, rows, offset_y) =
            visible_span(camera.y, canvas.height(), block_size, block_cells(self.height));

        canvas.set_fill_style(&self.fog_color);

        let mut filled = 0;
        for row in rows {
            let block_y = start_by.saturating_add(row);
            let screen_y = (row as f32 * block_size - offset_y).round();

            for col in cols.clone() {
                let block_x = start_bx.saturating_add(col);
                if !self.is_block_fogged(block_x, block_y, scale) {
                    continue;
                }
                let screen_x = (col as f32 * block_size - offset_x).round();
                canvas.fill_rect(screen_x, screen_y, block_size, block_size);
                filled += 1;
            }
        }

        self.mark_rendered(camera);
        filled
    }

    /// True when the block has at least one in-bounds tile and none of its
    /// in-bounds tiles are explored.
    fn is_block_fogged(&self, block_x: i32, block_y: i32, scale: i32) -> bool {
        let x0 = block_x.saturating_mul(scale);
        let y0 = block_y.saturating_mul(scale);
        let mut any_in_bounds = false;

        for y in y0..y0.saturating_add(scale) {
            if y < 0 || y as u32 >= self.height {
                continue;
            }
            for x in x0..x0.saturating_add(scale) {
                if x < 0 || x as u32 >= self.width {
                    continue;
                }
                if self.is_explored(x, y) {
                    return false;
                }
                any_in_bounds = true;
            }
        }
        any_in_bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[derive(Default)]
    struct FillRecorder {
        width: u32,
        height: u32,
        style: String,
        rects: Vec<(f32, f32, f32, f32)>,
    }

    impl FillRecorder {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                ..Default::default()
            }
        }
    }

    impl FogCanvas for FillRecorder {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn set_fill_style(&mut self, style: &str) {
            self.style = style.to_string();
        }

        fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
            self.rects.push((x, y, width, height));
        }
    }

    #[test]
    fn missing_or_empty_canvas_is_a_no_op() {
        let mut fog = VisibilityOverlay::new(10, 10);
        let camera = CameraState::default();

        assert_eq!(fog.render::<FillRecorder>(None, 16.0, &camera), 0);
        assert_eq!(fog.render_scaled::<FillRecorder>(None, 16.0, &camera, 2), 0);

        let mut empty = FillRecorder::new(0, 100);
        assert_eq!(fog.render(Some(&mut empty), 16.0, &camera), 0);
        assert!(empty.rects.is_empty());
    }

    #[test]
    fn render_fogs_exactly_the_unexplored_visible_tiles() {
        let mut fog = VisibilityOverlay::new(10, 10).with_fog_color("black");
        fog.set_explored_batch([(1, 1), (2, 2), (9, 9)]);
        let mut canvas = FillRecorder::new(64, 48);

        // 5 columns x 4 rows visible, (9, 9) is off screen.
        let filled = fog.render(Some(&mut canvas), 16.0, &CameraState::default());
        assert_eq!(filled, 18);
        assert_eq!(canvas.rects.len(), 18);
        assert_eq!(canvas.style, "black");
        assert!(canvas.rects.contains(&(0.0, 0.0, 16.0, 16.0)));
        assert!(!canvas.rects.contains(&(16.0, 16.0, 16.0, 16.0)));
        assert!(!canvas.rects.contains(&(32.0, 32.0, 16.0, 16.0)));
    }

    #[test]
    fn render_offsets_by_camera_remainder() {
        let mut fog = VisibilityOverlay::new(10, 10);
        let mut canvas = FillRecorder::new(32, 16);

        fog.render(Some(&mut canvas), 16.0, &CameraState::new(8.0, 4.0));
        assert!(canvas.rects.contains(&(-8.0, -4.0, 16.0, 16.0)));
        assert!(canvas.rects.contains(&(24.0, 12.0, 16.0, 16.0)));
    }

    #[test]
    fn render_skips_tiles_outside_the_world() {
        let mut fog = VisibilityOverlay::new(10, 10);
        let mut canvas = FillRecorder::new(64, 48);

        // Columns 8..13 are visible but only 8 and 9 exist.
        let filled = fog.render(Some(&mut canvas), 16.0, &CameraState::new(128.0, 0.0));
        assert_eq!(filled, 2 * 4);

        // Negative camera: tile -1 is skipped, tile 0 lands at x = 8.
        canvas.rects.clear();
        fog.render(Some(&mut canvas), 16.0, &CameraState::new(-8.0, 0.0));
        assert!(canvas.rects.iter().all(|r| r.0 >= 8.0));
        assert!(canvas.rects.contains(&(8.0, 0.0, 16.0, 16.0)));
    }

    #[test]
    fn render_matches_overlay_for_random_histories() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut fog = VisibilityOverlay::new(30, 20);
            for _ in 0..rng.gen_range(0..200) {
                fog.set_explored(rng.gen_range(0..30), rng.gen_range(0..20));
            }
            let camera = CameraState::new(rng.gen_range(0.0..200.0), rng.gen_range(0.0..100.0));
            let mut canvas = FillRecorder::new(160, 128);
            fog.render(Some(&mut canvas), 16.0, &camera);

            let start = camera.tile(16.0);
            let mut expected = 0;
            for row in 0..9 {
                for col in 0..11 {
                    let (x, y) = (start.x + col, start.y + row);
                    if x < 30 && y < 20 && !fog.is_explored(x, y) {
                        expected += 1;
                    }
                }
            }
            assert_eq!(canvas.rects.len(), expected);
        }
    }

    #[test]
    fn render_scaled_skips_blocks_with_any_explored_tile() {
        let mut fog = VisibilityOverlay::new(10, 10);
        fog.set_explored(3, 2);
        let mut canvas = FillRecorder::new(64, 64);

        let filled = fog.render_scaled(Some(&mut canvas), 16.0, &CameraState::default(), 2);
        assert_eq!(filled, 8);
        assert!(canvas.rects.contains(&(0.0, 0.0, 32.0, 32.0)));
        assert!(!canvas.rects.contains(&(32.0, 32.0, 32.0, 32.0)));
    }

    #[test]
    fn render_scaled_handles_partial_and_missing_blocks() {
        let mut fog = VisibilityOverlay::new(5, 5);
        let mut canvas = FillRecorder::new(128, 32);

        // Block columns 0..5 are visible, block 2 holds tile 4 plus an
        // out-of-bounds tile, blocks 3 and 4 are entirely outside.
        let filled = fog.render_scaled(Some(&mut canvas), 16.0, &CameraState::default(), 2);
        assert_eq!(filled, 3 * 2);

        fog.set_explored(4, 0);
        canvas.rects.clear();
        fog.render_scaled(Some(&mut canvas), 16.0, &CameraState::default(), 2);
        assert!(!canvas.rects.contains(&(64.0, 0.0, 32.0, 32.0)));
        assert!(canvas.rects.contains(&(64.0, 32.0, 32.0, 32.0)));
    }

    #[test]
    fn render_scaled_never_fogs_explored_tiles() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let mut fog = VisibilityOverlay::new(25, 17);
            for _ in 0..rng.gen_range(0..60) {
                fog.set_explored(rng.gen_range(0..25), rng.gen_range(0..17));
            }
            let camera = CameraState::new(rng.gen_range(0.0..150.0), rng.gen_range(0.0..80.0));
            let mut canvas = FillRecorder::new(200, 120);
            fog.render_scaled(Some(&mut canvas), 8.0, &camera, 2);

            for &(sx, sy, w, _) in &canvas.rects {
                assert_eq!(w, 16.0);
                let bx = pixel_to_tile(sx + camera.x + 0.5, 16.0);
                let by = pixel_to_tile(sy + camera.y + 0.5, 16.0);
                for y in by * 2..by * 2 + 2 {
                    for x in bx * 2..bx * 2 + 2 {
                        assert!(!fog.is_explored(x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn zero_block_scale_behaves_like_per_tile() {
        let mut fog = VisibilityOverlay::new(4, 4);
        fog.set_explored(1, 1);
        let mut canvas = FillRecorder::new(64, 64);
        let filled = fog.render_scaled(Some(&mut canvas), 16.0, &CameraState::default(), 0);
        assert_eq!(filled, 15);
    }

    #[test]
    fn rendering_clears_needs_update() {
        let mut fog = VisibilityOverlay::new(4, 4);
        let mut canvas = FillRecorder::new(64, 64);
        fog.render(Some(&mut canvas), 16.0, &CameraState::new(16.0, 0.0));
        assert!(!fog.needs_redraw(&CameraState::new(16.0, 0.0)));
        assert!(fog.needs_redraw(&CameraState::new(20.0, 0.0)));
        assert!(fog.needs_redraw(&CameraState::default()));
    }

    #[test]
    fn tiny_tiles_only_draw_the_world() {
        let mut fog = VisibilityOverlay::new(10, 10);
        fog.set_explored(0, 0);
        let mut canvas = FillRecorder::new(800, 600);
        let camera = CameraState::default();

        assert_eq!(fog.render(Some(&mut canvas), 1e-9, &camera), 99);
        assert_eq!(fog.render_scaled(Some(&mut canvas), 1e-9, &camera, 4), 8);

        // the whole world sits left of a far away camera
        let far = CameraState::new(1.0e6, 0.0);
        assert_eq!(fog.render(Some(&mut canvas), 1e-9, &far), 0);
    }
}
