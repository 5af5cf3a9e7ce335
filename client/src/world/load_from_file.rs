use bevy_log::info;
use ron::de::from_str;
use shared::{GameConfig, GameFolderPaths};
use std::fs;
use std::path::PathBuf;

use super::save::{SaveError, WorldData};

pub fn load_world_data(
    world_name: &str,
    game_folder_paths: &GameFolderPaths,
    config: &GameConfig,
) -> Result<WorldData, SaveError> {
    let file_path: PathBuf = game_folder_paths.world_file(world_name);

    if !file_path.exists() {
        info!(
            "World data file not found: {}. Generating flat {}x{} world.",
            file_path.display(),
            config.world.width,
            config.world.height
        );
        return Ok(WorldData::new_flat(world_name, config));
    }

    let contents = fs::read_to_string(&file_path).map_err(|source| SaveError::Io {
        path: file_path.clone(),
        source,
    })?;
    let world_data: WorldData =
        from_str(&contents).map_err(|source| SaveError::RonDeserialize {
            path: file_path.clone(),
            source,
        })?;

    info!("Found world data file from disk: {}", file_path.display());

    Ok(world_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::world::{TileId, TileMap};

    fn temp_game_folder(name: &str) -> GameFolderPaths {
        let path = std::env::temp_dir().join(format!(
            "tiledepths-load-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        GameFolderPaths {
            game_folder_path: path,
        }
    }

    #[test]
    fn missing_save_creates_a_flat_world() {
        let paths = temp_game_folder("missing");
        let mut config = GameConfig::default();
        config.world.width = 10;
        config.world.height = 8;
        config.world.ground_level = 5;

        let data = load_world_data("fresh", &paths, &config).unwrap();
        assert_eq!(data.name, "fresh");
        assert!(data.explored.is_empty());

        let loaded = data.into_loaded(&config).unwrap();
        assert_eq!(loaded.map.width(), 10);
        assert_eq!(loaded.map.get_tile(&bevy::math::IVec2::new(0, 4)), Some(TileId::Air));
        assert_eq!(loaded.map.get_tile(&bevy::math::IVec2::new(9, 5)), Some(TileId::Grass));
        assert_eq!(loaded.map.get_tile(&bevy::math::IVec2::new(9, 7)), Some(TileId::Dirt));
    }

    #[test]
    fn corrupt_save_is_an_error() {
        let paths = temp_game_folder("corrupt");
        let file = paths.world_file("broken");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "(name: \"broken\", width: ").unwrap();

        let result = load_world_data("broken", &paths, &GameConfig::default());
        assert!(matches!(result, Err(SaveError::RonDeserialize { .. })));

        let _ = fs::remove_dir_all(&paths.game_folder_path);
    }
}
