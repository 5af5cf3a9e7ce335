use std::path::PathBuf;

use bevy_ecs::resource::Resource;

pub mod config;
pub mod constants;
pub mod players;
pub mod sets;
pub mod visibility;
pub mod water;
pub mod world;

pub use config::*;
pub use constants::*;

#[derive(Resource, Debug, Clone)]
pub struct GameFolderPaths {
    pub game_folder_path: PathBuf,
}

impl GameFolderPaths {
    pub fn config_file(&self) -> PathBuf {
        self.game_folder_path.join(CONFIG_FILE_NAME)
    }

    pub fn world_folder(&self, world_name: &str) -> PathBuf {
        self.game_folder_path.join(SAVE_PATH).join(world_name)
    }

    pub fn world_file(&self, world_name: &str) -> PathBuf {
        self.world_folder(world_name).join(WORLD_FILE_NAME)
    }
}

pub fn get_game_folder_paths(game_folder_path: Option<String>) -> GameFolderPaths {
    let mut paths = default_game_folder_paths();

    if let Some(game_data) = game_folder_path {
        paths.game_folder_path = game_data.into();
    }

    paths
}

#[cfg(target_os = "windows")]
pub fn default_game_folder_paths() -> GameFolderPaths {
    GameFolderPaths {
        game_folder_path: "%AppData/tiledepths".into(),
    }
}

#[cfg(target_os = "linux")]
pub fn default_game_folder_paths() -> GameFolderPaths {
    GameFolderPaths {
        game_folder_path: "$HOME/.local/share/tiledepths".into(),
    }
}

#[cfg(target_os = "macos")]
pub fn default_game_folder_paths() -> GameFolderPaths {
    GameFolderPaths {
        game_folder_path: "$HOME/Library/Application Support/tiledepths".into(),
    }
}
