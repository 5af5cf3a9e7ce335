//! Tile water.
//!
//! Water exists durably only as `TileId::Water` tiles. Simulation builds a
//! transient `WaterLevels` field from the map, lets it flow for a bounded
//! number of passes and commits the result back to tiles:
//!
//! ```text
//! tile map ──classify──▶ WaterLevels ──passes──▶ WaterLevels ──commit──▶ tile map
//! ```
//!
//! `WaterScheduler` decides when and where this runs so a frame never pays
//! for a full-world settle.

mod commit;
mod config;
mod flow;
mod levels;
pub mod schedule;

pub use commit::*;
pub use config::*;
pub use flow::*;
pub use levels::*;
pub use schedule::*;
