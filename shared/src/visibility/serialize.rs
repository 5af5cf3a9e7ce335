use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::VisibilityOverlay;

/// Sparse, save-file form of the overlay: `"<x>,<y>" -> true` for every
/// explored tile. Absent keys are unexplored. The key format is part of the
/// save format and must not change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExploredTiles(pub BTreeMap<String, bool>);

impl ExploredTiles {
    pub fn key(x: i32, y: i32) -> String {
        format!("{x},{y}")
    }

    /// Parses a `"<x>,<y>"` key. Anything else is `None`.
    pub fn parse_key(key: &str) -> Option<(i32, i32)> {
        let (x, y) = key.split_once(',')?;
        Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
    }

    pub fn insert(&mut self, x: i32, y: i32) {
        self.0.insert(Self::key(x, y), true);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lenient decode of a RON document. Malformed input is logged and
    /// treated as "nothing explored".
    pub fn from_ron_str(contents: &str) -> Self {
        match ron::de::from_str(contents) {
            Ok(tiles) => tiles,
            Err(err) => {
                log::warn!("Ignoring malformed explored tile data: {}", err);
                Self::default()
            }
        }
    }
}

impl VisibilityOverlay {
    /// Sparse snapshot of every explored tile.
    pub fn to_object(&self) -> ExploredTiles {
        let width = self.width as usize;
        let mut tiles = ExploredTiles::default();
        for index in self.explored_indices() {
            tiles.insert((index % width) as i32, (index / width) as i32);
        }
        tiles
    }

    /// Rebuilds an overlay from a sparse snapshot. Out-of-bounds, malformed
    /// and false entries are skipped; `None` gives an all-unexplored overlay.
    pub fn from_object(tiles: Option<&ExploredTiles>, width: u32, height: u32) -> Self {
        let mut overlay = Self::new(width, height);
        let Some(tiles) = tiles else {
            return overlay;
        };

        let mut ignored = 0;
        for (key, explored) in &tiles.0 {
            if !*explored {
                continue;
            }
            match ExploredTiles::parse_key(key) {
                Some((x, y)) if overlay.index(x, y).is_some() => {
                    overlay.set_explored(x, y);
                }
                _ => ignored += 1,
            }
        }
        if ignored > 0 {
            log::debug!("Ignored {} invalid explored tile entries", ignored);
        }
        overlay
    }
}
