//! Terrain kinds for map tiles.

use serde::{Deserialize, Serialize};

/// Base terrain type for a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Ocean,
    #[default]
    Land,
    /// A tile holding a city. Ground units may enter it.
    City,
    Mountains,
}

impl Terrain {
    /// Check if this is a water terrain type.
    pub const fn is_water(&self) -> bool {
        matches!(self, Terrain::Ocean)
    }

    /// Ground units may stand here.
    pub const fn is_ground(&self) -> bool {
        matches!(self, Terrain::Land | Terrain::City)
    }

    /// Get all terrain variants.
    pub const fn all() -> &'static [Terrain] {
        &[
            Terrain::Ocean,
            Terrain::Land,
            Terrain::City,
            Terrain::Mountains,
        ]
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Terrain::Ocean => "Ocean",
            Terrain::Land => "Land",
            Terrain::City => "City",
            Terrain::Mountains => "Mountains",
        };
        write!(f, "{}", name)
    }
}
