//! In-memory tile grid with per-direction passability flags.
//!
//! Each tile stores a [`PassFlags`] value: one bit per blocked exit plus a
//! damage-floor bit. A step from `a` to its neighbour `b` in direction `d`
//! requires `a` to allow leaving toward `d` and `b` to allow leaving toward
//! `d.reverse()`, which is how walls block entry from every side.
//!
//! Grids are usually built from ASCII art:
//!
//! | Glyph | Meaning |
//! |-------|---------|
//! | `.`   | floor |
//! | `#`   | wall (every exit blocked) |
//! | `^`   | damage floor |
//! | `-`   | floor, north and south exits blocked |
//! | `\|`  | floor, east and west exits blocked |

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Direction, MapBounds, PassabilityOracle, TileCoord};

bitflags! {
    /// Per-tile passability and terrain bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PassFlags: u8 {
        /// Cannot leave southward
        const BLOCK_SOUTH = 1 << 0;
        /// Cannot leave westward
        const BLOCK_WEST  = 1 << 1;
        /// Cannot leave eastward
        const BLOCK_EAST  = 1 << 2;
        /// Cannot leave northward
        const BLOCK_NORTH = 1 << 3;
        /// Standing here deals floor damage
        const DAMAGE      = 1 << 4;

        /// Every exit blocked
        const WALL = Self::BLOCK_SOUTH.bits()
            | Self::BLOCK_WEST.bits()
            | Self::BLOCK_EAST.bits()
            | Self::BLOCK_NORTH.bits();
    }
}

impl PassFlags {
    /// The blocking bit(s) for leaving toward `direction`.
    ///
    /// Diagonals map to the union of their components.
    #[must_use]
    pub const fn blocking(direction: Direction) -> Self {
        match direction {
            Direction::South => Self::BLOCK_SOUTH,
            Direction::West => Self::BLOCK_WEST,
            Direction::East => Self::BLOCK_EAST,
            Direction::North => Self::BLOCK_NORTH,
            Direction::SouthWest => Self::BLOCK_SOUTH.union(Self::BLOCK_WEST),
            Direction::SouthEast => Self::BLOCK_SOUTH.union(Self::BLOCK_EAST),
            Direction::NorthWest => Self::BLOCK_NORTH.union(Self::BLOCK_WEST),
            Direction::NorthEast => Self::BLOCK_NORTH.union(Self::BLOCK_EAST),
        }
    }

    /// Flags for an ASCII map glyph.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::empty()),
            '#' => Some(Self::WALL),
            '^' => Some(Self::DAMAGE),
            '-' => Some(Self::BLOCK_NORTH.union(Self::BLOCK_SOUTH)),
            '|' => Some(Self::BLOCK_EAST.union(Self::BLOCK_WEST)),
            _ => None,
        }
    }
}

/// Errors raised while building a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The map has no rows or no columns
    #[error("map is empty")]
    Empty,

    /// A row's width differs from the first row
    #[error("row {row} has width {width}, expected {expected}")]
    RaggedRow {
        /// Zero-based row index
        row: usize,
        /// Width found
        width: usize,
        /// Width of the first row
        expected: usize,
    },

    /// A character that is not a known glyph
    #[error("unknown glyph {glyph:?} at {tile}")]
    UnknownGlyph {
        /// The offending character
        glyph: char,
        /// Where it appeared
        tile: TileCoord,
    },

    /// A tile outside the grid was addressed
    #[error("tile {0} is outside the map")]
    OutOfBounds(TileCoord),
}

/// Rectangular tile map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    bounds: MapBounds,
    tiles: Vec<PassFlags>,
}

impl TileGrid {
    /// Create an open grid (all floor).
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let bounds = MapBounds::new(width, height);
        Self {
            bounds,
            tiles: vec![PassFlags::empty(); bounds.area()],
        }
    }

    /// Parse an ASCII map, one row per line.
    ///
    /// Leading and trailing whitespace on each line is ignored, as are blank
    /// lines.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] for empty maps, ragged rows or unknown glyphs.
    pub fn from_ascii(text: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let expected = rows.first().map_or(0, |row| row.chars().count());
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let width = row.chars().count();
            if width != expected {
                return Err(GridError::RaggedRow {
                    row: y,
                    width,
                    expected,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let flags = PassFlags::from_glyph(glyph).ok_or(GridError::UnknownGlyph {
                    glyph,
                    tile: coord(x, y),
                })?;
                tiles.push(flags);
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let bounds = MapBounds::new(expected as u32, rows.len() as u32);
        debug!(width = bounds.width, height = bounds.height, "parsed tile grid");
        Ok(Self { bounds, tiles })
    }

    /// Flags of a tile, or `None` off the map.
    #[must_use]
    pub fn flags(&self, tile: TileCoord) -> Option<PassFlags> {
        self.bounds.index_of(tile).map(|i| self.tiles[i])
    }

    /// Replace the flags of a tile.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the tile is not on the map.
    pub fn set(&mut self, tile: TileCoord, flags: PassFlags) -> Result<(), GridError> {
        let index = self
            .bounds
            .index_of(tile)
            .ok_or(GridError::OutOfBounds(tile))?;
        self.tiles[index] = flags;
        Ok(())
    }

    /// Turn a tile into a wall.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the tile is not on the map.
    pub fn block(&mut self, tile: TileCoord) -> Result<(), GridError> {
        self.set(tile, PassFlags::WALL)
    }

    /// Block a single exit of a tile, leaving its other bits alone.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the tile is not on the map.
    pub fn block_exit(&mut self, tile: TileCoord, direction: Direction) -> Result<(), GridError> {
        let flags = self.flags(tile).ok_or(GridError::OutOfBounds(tile))?;
        self.set(tile, flags | PassFlags::blocking(direction))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn coord(x: usize, y: usize) -> TileCoord {
    TileCoord::new(x as i32, y as i32)
}

impl PassabilityOracle for TileGrid {
    fn bounds(&self) -> MapBounds {
        self.bounds
    }

    fn is_passable(&self, tile: TileCoord, direction: Direction) -> bool {
        self.flags(tile)
            .is_some_and(|flags| !flags.intersects(PassFlags::blocking(direction)))
    }

    fn is_damage_floor(&self, tile: TileCoord) -> bool {
        self.flags(tile)
            .is_some_and(|flags| flags.contains(PassFlags::DAMAGE))
    }
}
