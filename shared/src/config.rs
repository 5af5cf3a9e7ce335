use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use bevy_ecs::resource::Resource;
use bevy_log::{info, warn};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    visibility::FogRenderMode,
    water::{WaterFlowConfig, WaterScheduleConfig},
    GameFolderPaths, DEFAULT_BLOCK_SCALE, DEFAULT_FOG_COLOR, DEFAULT_REVEAL_RADIUS,
    DEFAULT_TILE_SIZE, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u32,
    pub height: u32,
    /// Row of the grass surface in a freshly created world.
    pub ground_level: u32,
    pub tile_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            ground_level: DEFAULT_WORLD_HEIGHT / 2,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub reveal_radius: i32,
    pub fog_color: String,
    pub render_mode: FogRenderMode,
    /// Tiles per fog block in `FogRenderMode::Scaled`.
    pub block_scale: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            reveal_radius: DEFAULT_REVEAL_RADIUS,
            fog_color: DEFAULT_FOG_COLOR.to_string(),
            render_mode: FogRenderMode::default(),
            block_scale: DEFAULT_BLOCK_SCALE,
            canvas_width: 800,
            canvas_height: 600,
        }
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub visibility: VisibilityConfig,
    pub water: WaterFlowConfig,
    pub schedule: WaterScheduleConfig,
}

pub fn load_game_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::de::from_str::<GameConfig>(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_game_config(config: &GameConfig, path: &Path) -> Result<(), ConfigError> {
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(3)
        .with_separate_tuple_members(true);
    let serialized = ron::ser::to_string_pretty(config, pretty_config)?;

    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let mut file = fs::File::create(path).map_err(io_error)?;
    file.write_all(serialized.as_bytes()).map_err(io_error)?;
    Ok(())
}

/// Reads `config.ron` from the game folder. A missing file yields the
/// defaults, which are written out so they can be edited; a malformed one is
/// reported and also yields the defaults.
pub fn get_game_config(game_folder_paths: &GameFolderPaths) -> GameConfig {
    let path = game_folder_paths.config_file();
    match load_game_config(&path) {
        Ok(config) => {
            info!("Loaded game config from {:?}", path);
            config
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            info!("No config at {:?}, writing defaults", path);
            let config = GameConfig::default();
            if let Err(e) = write_game_config(&config, &path) {
                warn!("{}", e);
            }
            config
        }
        Err(e) => {
            warn!("{}, using defaults", e);
            GameConfig::default()
        }
    }
}
