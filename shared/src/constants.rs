pub const TICKS_PER_SECOND: u64 = 30;
pub const DEFAULT_TILE_SIZE: f32 = 16.0;
pub const DEFAULT_REVEAL_RADIUS: i32 = 15;
pub const DEFAULT_BLOCK_SCALE: u32 = 2;
pub const DEFAULT_WORLD_WIDTH: u32 = 512;
pub const DEFAULT_WORLD_HEIGHT: u32 = 256;
pub const DEFAULT_FOG_COLOR: &str = "rgba(0, 0, 0, 1)";
pub const SAVE_PATH: &str = "saves";
pub const WORLD_FILE_NAME: &str = "world.ron";
pub const CONFIG_FILE_NAME: &str = "config.ron";
