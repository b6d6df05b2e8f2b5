//! # Tilegrid
//!
//! Tile grid substrate for sub-tile movement simulation.
//!
//! The world is a rectangular grid of tiles. Passability is a property of a
//! tile and a direction of travel, as in most tile-based RPG runtimes. On top
//! of that, every tile is split into a 3×3 grid of segments (a [`Quadrant`])
//! so that actors can appear to move in thirds of a tile while every map
//! query still happens at whole-tile granularity.
//!
//! - **Tiles**: [`TileCoord`] and [`MapBounds`]
//! - **Directions**: numpad-encoded 8-way [`Direction`]
//! - **Quadrants**: pure geometry for stepping between segments ([`quadrant`])
//! - **Oracles**: the [`PassabilityOracle`] capability, plus an in-memory
//!   [`TileGrid`] implementation that can be loaded from ASCII art
//!
//! ## Quick Start
//!
//! ```
//! use tilegrid::{Direction, PassabilityOracle, SubTilePosition, TileCoord, TileGrid};
//!
//! let grid = TileGrid::from_ascii(
//!     "....\n\
//!      .#..\n\
//!      ....",
//! )
//! .unwrap();
//!
//! assert!(!grid.is_passable(TileCoord::new(1, 1), Direction::South));
//!
//! let start = SubTilePosition::centered(TileCoord::new(0, 0));
//! let (next, crossed) = start.stepped(Direction::East);
//! assert!(!crossed);
//! assert_eq!(next.tile, TileCoord::new(0, 0));
//! assert!((next.x() - 0.33).abs() < 1e-4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod direction;
pub mod grid;
pub mod oracle;
pub mod quadrant;

use std::fmt;

use serde::{Deserialize, Serialize};

// Re-exports for convenience
pub use direction::Direction;
pub use grid::{GridError, PassFlags, TileGrid};
pub use oracle::{OpenField, PassabilityOracle};
pub use quadrant::{next_quadrant, round2, Quadrant, Segment, SubTilePosition};

/// Integer tile coordinate. `y` grows southward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl TileCoord {
    /// Create a tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring tile one step in `direction` (both axes for diagonals).
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Offset by an arbitrary delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Round a fractional coordinate pair to the nearest tile.
    ///
    /// Halves round away from zero, matching `f32::round`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn round_from(x: f32, y: f32) -> Self {
        Self::new(x.round() as i32, y.round() as i32)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Rectangular map extent, anchored at (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
}

impl MapBounds {
    /// Create bounds from dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check whether a tile lies on the map.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width as i32 && tile.y < self.height as i32
    }

    /// Total number of tiles.
    #[must_use]
    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of a tile, if it lies on the map.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn index_of(&self, tile: TileCoord) -> Option<usize> {
        if self.contains(tile) {
            Some(tile.y as usize * self.width as usize + tile.x as usize)
        } else {
            None
        }
    }
}
