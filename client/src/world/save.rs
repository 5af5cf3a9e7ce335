use bevy::prelude::*;
use bevy_log::{error, info};
use ron::ser::PrettyConfig;
use shared::{
    players::{CameraState, PlayerState},
    visibility::{ExploredTiles, VisibilityOverlay},
    world::{GridTileMap, TileId, TileMap},
    GameConfig, GameFolderPaths,
};
use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

use super::{ActiveWorld, WorldSaveState};

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveRequestEvent;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode world: {0}")]
    RonSerialize(#[source] ron::Error),
    #[error("malformed world file {path:?}: {source}")]
    RonDeserialize {
        path: PathBuf,
        #[source]
        source: ron::de::Error,
    },
    #[error("world {name} is {width}x{height} but holds {tiles} tiles")]
    DimensionMismatch {
        name: String,
        width: u32,
        height: u32,
        tiles: usize,
    },
}

/// Everything persisted for one world: terrain, exploration and where the
/// player and camera were.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct WorldData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<TileId>,
    #[serde(default)]
    pub explored: ExploredTiles,
    #[serde(default)]
    pub player: PlayerState,
    #[serde(default)]
    pub camera: CameraState,
}

/// Live resources rebuilt from a `WorldData`.
#[derive(Debug)]
pub struct LoadedWorld {
    pub map: GridTileMap,
    pub overlay: VisibilityOverlay,
    pub player: PlayerState,
    pub camera: CameraState,
}

impl WorldData {
    /// Flat world with the player standing on the surface in the middle.
    pub fn new_flat(name: &str, config: &GameConfig) -> Self {
        let world = &config.world;
        let map = GridTileMap::flat(world.width, world.height, world.ground_level);
        let player = PlayerState::new(
            (world.width / 2) as f32 * world.tile_size,
            world.ground_level.saturating_sub(2) as f32 * world.tile_size,
            world.tile_size,
            world.tile_size * 2.0,
        );

        Self {
            name: name.to_string(),
            width: world.width,
            height: world.height,
            tiles: map.tiles().to_vec(),
            explored: ExploredTiles::default(),
            player,
            camera: CameraState::default(),
        }
    }

    pub fn capture(
        name: &str,
        map: &GridTileMap,
        overlay: &VisibilityOverlay,
        player: &PlayerState,
        camera: &CameraState,
    ) -> Self {
        Self {
            name: name.to_string(),
            width: map.width(),
            height: map.height(),
            tiles: map.tiles().to_vec(),
            explored: overlay.to_object(),
            player: *player,
            camera: *camera,
        }
    }

    pub fn into_loaded(self, config: &GameConfig) -> Result<LoadedWorld, SaveError> {
        let tile_count = self.tiles.len();
        let map = GridTileMap::from_tiles(self.width, self.height, self.tiles).ok_or(
            SaveError::DimensionMismatch {
                name: self.name.clone(),
                width: self.width,
                height: self.height,
                tiles: tile_count,
            },
        )?;
        let overlay = VisibilityOverlay::from_object(Some(&self.explored), self.width, self.height)
            .with_fog_color(config.visibility.fog_color.clone());

        Ok(LoadedWorld {
            map,
            overlay,
            player: self.player,
            camera: self.camera,
        })
    }
}

pub fn save_world_system(
    world: Res<ActiveWorld>,
    map: Res<GridTileMap>,
    overlay: Res<VisibilityOverlay>,
    player: Res<PlayerState>,
    camera: Res<CameraState>,
    game_folder_path: Res<GameFolderPaths>,
    mut save_state: ResMut<WorldSaveState>,
    mut event: EventReader<SaveRequestEvent>,
) {
    // Reads all events to prevent them from being queued forever and repeatedly request a save
    let save_requested = event.read().count() > 0;
    if !save_requested {
        return;
    }

    let world_data = WorldData::capture(&world.name, &map, &overlay, &player, &camera);
    let save_file_path = game_folder_path.world_file(&world.name);

    if let Err(e) = save_world_data(&world_data, &save_file_path) {
        error!("Failed to save world data: {}", e);
    } else {
        save_state.dirty = false;
        info!(
            "World data saved successfully! Name: {}, explored tiles: {}",
            world.name,
            overlay.explored_count()
        );
    }
}

pub fn save_world_data(world_data: &WorldData, file_path: &Path) -> Result<(), SaveError> {
    // configure RON serialization
    let pretty_config = PrettyConfig::new()
        .with_depth_limit(2)
        .with_separate_tuple_members(true);

    let serialized =
        ron::ser::to_string_pretty(world_data, pretty_config).map_err(SaveError::RonSerialize)?;

    let io_error = |source| SaveError::Io {
        path: file_path.to_path_buf(),
        source,
    };
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let mut file = File::create(file_path).map_err(io_error)?;
    file.write_all(serialized.as_bytes()).map_err(io_error)?;
    info!("World data saved to {}", file_path.display());
    Ok(())
}
