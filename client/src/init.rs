use crate::{
    fog::{camera_follow_system, render_fog_system, reveal_around_player_system, FogFrame},
    world::{
        handle_tile_mutations,
        load_from_file::load_world_data,
        save::{save_world_system, SaveError, SaveRequestEvent},
        settle_world, water_schedule_system, ActiveWorld, TileMutationEvent, WorldSaveState,
    },
};
use bevy::prelude::*;
use bevy_app::ScheduleRunnerPlugin;
use bevy_log::{error, info};
use shared::{
    sets::GameUpdateSet,
    water::{WaterFlowEngine, WaterScheduler},
    world::TileMap,
    GameConfig, GameFolderPaths,
};
use std::time::Duration;

/// Per-run options that do not belong in `config.ron`.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub world_name: String,
    /// Exit after this many frames; run forever when `None`.
    pub frames: Option<u64>,
    pub ticks_per_second: u64,
    pub settle_on_load: bool,
}

#[derive(Resource, Debug, Default)]
pub struct FrameLimit {
    pub frames: Option<u64>,
    pub elapsed: u64,
}

pub fn init(config: GameConfig, options: LaunchOptions, game_folder_paths: GameFolderPaths) {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / options.ticks_per_second.max(1) as f64,
        ))),
    );
    app.add_plugins(bevy::log::LogPlugin::default());

    if let Err(err) = setup_world(&mut app, config, &options, game_folder_paths) {
        error!("Failed to load world {} : {}", options.world_name, err);
        return;
    }
    register_systems(&mut app);

    app.run();
}

/// Loads (or creates) the world and inserts every resource the frame loop
/// needs.
pub fn setup_world(
    app: &mut App,
    config: GameConfig,
    options: &LaunchOptions,
    game_folder_paths: GameFolderPaths,
) -> Result<(), SaveError> {
    let world_data = load_world_data(&options.world_name, &game_folder_paths, &config)?;
    let mut loaded = world_data.into_loaded(&config)?;

    let engine = WaterFlowEngine::new(loaded.map.width(), loaded.map.height(), config.water);
    let mut save_state = WorldSaveState::default();
    if options.settle_on_load && settle_world(&engine, &mut loaded.map) > 0 {
        save_state.dirty = true;
    }

    info!(
        "Loaded world {} ({}x{}), {} tiles explored",
        options.world_name,
        loaded.map.width(),
        loaded.map.height(),
        loaded.overlay.explored_count()
    );

    app.insert_resource(ActiveWorld {
        name: options.world_name.clone(),
    });
    app.insert_resource(FogFrame::new(
        config.visibility.canvas_width,
        config.visibility.canvas_height,
    ));
    app.insert_resource(WaterScheduler::new(config.schedule));
    app.insert_resource(engine);
    app.insert_resource(loaded.map);
    app.insert_resource(loaded.overlay);
    app.insert_resource(loaded.player);
    app.insert_resource(loaded.camera);
    app.insert_resource(save_state);
    app.insert_resource(FrameLimit {
        frames: options.frames,
        elapsed: 0,
    });
    app.insert_resource(game_folder_paths);
    app.insert_resource(config);

    app.add_event::<TileMutationEvent>();
    app.add_event::<SaveRequestEvent>();

    Ok(())
}

pub fn register_systems(app: &mut App) {
    // Fog is painted last so it covers whatever the world systems changed
    app.configure_sets(
        Update,
        (
            GameUpdateSet::WorldInput,
            GameUpdateSet::Visibility,
            GameUpdateSet::WorldPhysics,
            GameUpdateSet::Rendering,
            GameUpdateSet::Persistence,
        )
            .chain(),
    );

    app.add_systems(
        Update,
        handle_tile_mutations.in_set(GameUpdateSet::WorldInput),
    );
    app.add_systems(
        Update,
        (reveal_around_player_system, camera_follow_system)
            .chain()
            .in_set(GameUpdateSet::Visibility),
    );
    app.add_systems(
        Update,
        water_schedule_system.in_set(GameUpdateSet::WorldPhysics),
    );
    app.add_systems(Update, render_fog_system.in_set(GameUpdateSet::Rendering));

    // Chaining the two so that the exit save happens on the same frame as the request
    app.add_systems(
        Update,
        (frame_limit_system, save_world_system)
            .chain()
            .in_set(GameUpdateSet::Persistence),
    );
}

fn frame_limit_system(
    mut limit: ResMut<FrameLimit>,
    save_state: Res<WorldSaveState>,
    mut ev_save_request: EventWriter<SaveRequestEvent>,
    mut ev_app_exit: EventWriter<AppExit>,
) {
    limit.elapsed += 1;
    let Some(frames) = limit.frames else {
        return;
    };
    if limit.elapsed < frames {
        return;
    }

    info!("Reached frame limit of {}, exiting", frames);
    if save_state.dirty {
        ev_save_request.write(SaveRequestEvent);
    }
    ev_app_exit.write(AppExit::Success);
}
