use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameUpdateSet {
    WorldInput,
    Visibility,
    WorldPhysics,
    Rendering,
    Persistence,
}
