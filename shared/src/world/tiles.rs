use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
pub enum TileTransparency {
    Solid,
    Liquid,
    Decoration,
    Empty,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
pub struct TileProperties {
    solid: bool,
    visibility: TileTransparency,
}

impl TileProperties {
    pub const fn solid_tile() -> Self {
        TileProperties {
            solid: true,
            visibility: TileTransparency::Solid,
        }
    }

    pub const fn decoration_tile() -> Self {
        TileProperties {
            solid: false,
            visibility: TileTransparency::Decoration,
        }
    }

    pub const fn liquid_tile() -> Self {
        TileProperties {
            solid: false,
            visibility: TileTransparency::Liquid,
        }
    }

    pub const fn empty_tile() -> Self {
        TileProperties {
            solid: false,
            visibility: TileTransparency::Empty,
        }
    }
}

/// Tile catalog. Only `Air`, `Water` and the `solid` flag matter to the
/// overlays, everything else is terrain or decoration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord, Default)]
pub enum TileId {
    #[default]
    Air,
    Water,
    Dirt,
    Grass,
    Stone,
    Sand,
    Wood,
    Leaves,
    Flower,
}

impl TileId {
    pub const fn get_properties(&self) -> TileProperties {
        match self {
            TileId::Air => TileProperties::empty_tile(),
            TileId::Water => TileProperties::liquid_tile(),
            TileId::Dirt
            | TileId::Grass
            | TileId::Stone
            | TileId::Sand
            | TileId::Wood => TileProperties::solid_tile(),
            TileId::Leaves | TileId::Flower => TileProperties::decoration_tile(),
        }
    }

    #[inline]
    pub const fn is_solid(&self) -> bool {
        self.get_properties().solid
    }

    #[inline]
    pub fn get_visibility(&self) -> TileTransparency {
        self.get_properties().visibility
    }

    /// Tiles the water commit is allowed to overwrite.
    #[inline]
    pub fn is_air_or_water(&self) -> bool {
        matches!(self, TileId::Air | TileId::Water)
    }
}
