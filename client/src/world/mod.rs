pub mod load_from_file;
pub mod save;

use bevy::prelude::*;
use bevy_log::{debug, info};
use shared::{
    water::{ScheduleOutcome, WaterFlowEngine, WaterScheduler},
    world::{GridTileMap, TileId, TileMap},
};

/// Name of the world being played, used for the save path.
#[derive(Resource, Debug, Clone)]
pub struct ActiveWorld {
    pub name: String,
}

/// Set whenever something worth persisting changed since the last save.
#[derive(Resource, Debug, Default)]
pub struct WorldSaveState {
    pub dirty: bool,
}

/// Dig, place or plant: replace the tile at `position` with `tile`.
#[derive(Event, Debug, Clone, Copy)]
pub struct TileMutationEvent {
    pub position: IVec2,
    pub tile: TileId,
}

pub fn handle_tile_mutations(
    mut world_map: ResMut<GridTileMap>,
    mut events: EventReader<TileMutationEvent>,
    mut scheduler: ResMut<WaterScheduler>,
    mut save_state: ResMut<WorldSaveState>,
) {
    for event in events.read() {
        let Some(previous) = world_map.get_tile(&event.position) else {
            debug!("Ignoring tile mutation outside the world at {:?}", event.position);
            continue;
        };
        if previous == event.tile {
            continue;
        }

        world_map.set_tile(&event.position, event.tile);
        scheduler.mark_dirty(event.position);
        save_state.dirty = true;
        debug!(
            "Tile at {:?} changed from {:?} to {:?}",
            event.position, previous, event.tile
        );
    }
}

pub fn water_schedule_system(
    engine: Res<WaterFlowEngine>,
    mut scheduler: ResMut<WaterScheduler>,
    mut world_map: ResMut<GridTileMap>,
    mut save_state: ResMut<WorldSaveState>,
) {
    if let ScheduleOutcome::Processed(stats) = scheduler.tick(&*engine, &mut *world_map) {
        if stats.mutated > 0 {
            save_state.dirty = true;
        }
    }
}

/// Full-world settle, used once at load. Returns the number of tiles the
/// commit changed.
pub fn settle_world(engine: &WaterFlowEngine, world_map: &mut GridTileMap) -> usize {
    let iterations = engine.config().default_iterations;
    let simulation = engine.simulate_water_physics(Some(&*world_map), iterations);
    let report = engine.apply_water_to_world(world_map, &simulation.levels);
    info!(
        "Settled water in {} passes (converged: {}), {} tiles changed",
        simulation.passes, simulation.converged, report.mutated
    );
    report.mutated
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::water::{WaterFlowConfig, WaterScheduleConfig};

    fn test_app(map: GridTileMap) -> App {
        let mut app = App::new();
        let engine = WaterFlowEngine::new(map.width(), map.height(), WaterFlowConfig::default());
        app.insert_resource(map)
            .insert_resource(engine)
            .insert_resource(WaterScheduler::new(WaterScheduleConfig {
                update_interval: 1,
                ..Default::default()
            }))
            .insert_resource(WorldSaveState::default())
            .add_event::<TileMutationEvent>()
            .add_systems(
                Update,
                (handle_tile_mutations, water_schedule_system).chain(),
            );
        app
    }

    #[test]
    fn digging_under_water_lets_it_fall() {
        let mut map = GridTileMap::filled(1, 3, TileId::Stone);
        map.set_tile(&IVec2::new(0, 0), TileId::Water);
        let mut app = test_app(map);

        app.world_mut().send_event(TileMutationEvent {
            position: IVec2::new(0, 1),
            tile: TileId::Air,
        });
        app.update();

        let map = app.world().resource::<GridTileMap>();
        assert_eq!(map.get_tile(&IVec2::new(0, 1)), Some(TileId::Water));
        assert!(app.world().resource::<WorldSaveState>().dirty);
    }

    #[test]
    fn no_op_mutations_do_not_queue_water() {
        let mut app = test_app(GridTileMap::new(4, 4));
        app.world_mut().send_event(TileMutationEvent {
            position: IVec2::new(1, 1),
            tile: TileId::Air,
        });
        app.world_mut().send_event(TileMutationEvent {
            position: IVec2::new(9, 9),
            tile: TileId::Stone,
        });
        app.update();

        assert!(app.world().resource::<WaterScheduler>().is_idle());
        assert!(!app.world().resource::<WorldSaveState>().dirty);
    }

    #[test]
    fn settle_world_fills_basins() {
        let mut map = GridTileMap::filled(3, 3, TileId::Stone);
        map.set_tile(&IVec2::new(1, 0), TileId::Water);
        map.set_tile(&IVec2::new(1, 1), TileId::Air);
        let engine = WaterFlowEngine::new(3, 3, WaterFlowConfig::default());

        assert_eq!(settle_world(&engine, &mut map), 1);
        assert_eq!(map.get_tile(&IVec2::new(1, 1)), Some(TileId::Water));
        assert_eq!(settle_world(&engine, &mut map), 0);
    }
}
