pub mod map;
pub mod tiles;
mod utils;

pub use map::*;
pub use tiles::*;
pub use utils::*;
