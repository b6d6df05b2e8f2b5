//! Passability oracle: the map capability consumed by movement code.
//!
//! The oracle answers tile-level questions only. Sub-tile reasoning, actor
//! occupancy and event lookup live in the simulation core; everything here is
//! about static map data.

use crate::{Direction, MapBounds, TileCoord};

/// Read-only map passability.
///
/// Implementations must be cheap to query; the movement resolver calls
/// [`is_passable`](PassabilityOracle::is_passable) several times per step.
/// Coordinates are always integral tiles. Off-map tiles are never passable.
pub trait PassabilityOracle: Send + Sync {
    /// Map extent.
    fn bounds(&self) -> MapBounds;

    /// Whether the tile lies on the map.
    fn is_valid(&self, tile: TileCoord) -> bool {
        self.bounds().contains(tile)
    }

    /// Whether an actor standing on `tile` may leave it toward `direction`.
    ///
    /// For a full tile step the caller also checks the destination tile in
    /// the reverse direction.
    fn is_passable(&self, tile: TileCoord, direction: Direction) -> bool;

    /// Whether standing on the tile deals floor damage.
    fn is_damage_floor(&self, _tile: TileCoord) -> bool {
        false
    }
}

/// An oracle where every on-map tile is passable in every direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenField {
    bounds: MapBounds,
}

impl OpenField {
    /// Create an open field of the given size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            bounds: MapBounds::new(width, height),
        }
    }
}

impl PassabilityOracle for OpenField {
    fn bounds(&self) -> MapBounds {
        self.bounds
    }

    fn is_passable(&self, tile: TileCoord, _direction: Direction) -> bool {
        self.is_valid(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_field_passes_on_map_only() {
        let field = OpenField::new(3, 3);
        assert!(field.is_passable(TileCoord::new(0, 0), Direction::North));
        assert!(!field.is_passable(TileCoord::new(3, 0), Direction::West));
        assert!(!field.is_damage_floor(TileCoord::new(1, 1)));
    }

    #[test]
    fn oracle_is_object_safe() {
        let oracle: Box<dyn PassabilityOracle> = Box::new(OpenField::new(2, 2));
        assert!(oracle.is_valid(TileCoord::new(1, 1)));
        assert!(!oracle.is_valid(TileCoord::new(-1, 1)));
    }
}
