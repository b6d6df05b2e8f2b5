//! Sub-tile quadrant geometry.
//!
//! Each tile is divided into a 3×3 grid. Per axis, a [`Segment`] is either the
//! center of the tile or one of its two edges. The pair of segments is a
//! [`Quadrant`]:
//!
//! ```text
//!     (2,2)  (0,2)  (1,2)        north edge
//!     (2,0)  (0,0)  (1,0)
//!     (2,1)  (0,1)  (1,1)        south edge
//! ```
//!
//! Stepping toward the positive side of an axis cycles
//! `Center -> Positive -> Negative -> Center`, and the tile coordinate
//! increases when leaving the positive edge: the actor then sits on the
//! negative edge of the next tile. Three steps in one direction therefore
//! move exactly one tile. The negative side mirrors this.
//!
//! All functions here are pure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Direction, TileCoord};

/// Round to two decimal places.
///
/// Fractional tile coordinates are kept at this precision so that repeated
/// stepping does not accumulate drift.
#[must_use]
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Segment
// =============================================================================

/// One axis component of a quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Segment {
    /// Middle third of the tile (code 0)
    #[default]
    Center = 0,
    /// Edge toward the positive axis, east or south (code 1)
    Positive = 1,
    /// Edge toward the negative axis, west or north (code 2)
    Negative = 2,
}

impl Segment {
    /// All segments in code order.
    pub const ALL: [Segment; 3] = [Segment::Center, Segment::Positive, Segment::Negative];

    /// Numeric code (0, 1 or 2).
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Center),
            1 => Some(Self::Positive),
            2 => Some(Self::Negative),
            _ => None,
        }
    }

    /// Fractional offset from the tile coordinate.
    #[must_use]
    pub const fn offset(self) -> f32 {
        match self {
            Self::Center => 0.0,
            Self::Positive => 0.33,
            Self::Negative => -0.33,
        }
    }

    /// The edge on the other side of the tile. The center maps to itself.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Center => Self::Center,
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    /// Whether this segment is one of the two edges.
    #[must_use]
    pub const fn is_edge(self) -> bool {
        !matches!(self, Self::Center)
    }

    /// Segment after one step toward the positive side, and whether the tile
    /// changes.
    #[must_use]
    pub const fn advance(self) -> (Segment, bool) {
        let (_, segment, crossed) = self.step(0, 1);
        (segment, crossed)
    }

    /// Segment after one step toward the negative side, and whether the tile
    /// changes.
    #[must_use]
    pub const fn retreat(self) -> (Segment, bool) {
        let (_, segment, crossed) = self.step(0, -1);
        (segment, crossed)
    }

    /// Step along an axis.
    ///
    /// `sign > 0` moves toward the positive side, `sign < 0` toward the
    /// negative side, `0` leaves the axis untouched. Returns the new tile
    /// coordinate on this axis, the new segment, and whether a tile boundary
    /// was crossed.
    #[must_use]
    pub const fn step(self, tile: i32, sign: i32) -> (i32, Segment, bool) {
        if sign > 0 {
            match self {
                Self::Center => (tile, Self::Positive, false),
                Self::Positive => (tile + 1, Self::Negative, true),
                Self::Negative => (tile, Self::Center, false),
            }
        } else if sign < 0 {
            match self {
                Self::Center => (tile, Self::Negative, false),
                Self::Negative => (tile - 1, Self::Positive, true),
                Self::Positive => (tile, Self::Center, false),
            }
        } else {
            (tile, self, false)
        }
    }
}

// =============================================================================
// Quadrant
// =============================================================================

/// Sub-tile position within a tile: one segment per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Quadrant {
    /// Horizontal segment
    pub x: Segment,
    /// Vertical segment
    pub y: Segment,
}

impl Quadrant {
    /// The middle of the tile.
    pub const CENTER: Quadrant = Quadrant {
        x: Segment::Center,
        y: Segment::Center,
    };

    /// Create a quadrant from its segments.
    #[must_use]
    pub const fn new(x: Segment, y: Segment) -> Self {
        Self { x, y }
    }

    /// Decode a `(qx, qy)` code pair. Each code must be 0, 1 or 2.
    #[must_use]
    pub const fn from_codes(qx: u8, qy: u8) -> Option<Self> {
        match (Segment::from_code(qx), Segment::from_code(qy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// The `(qx, qy)` code pair.
    #[must_use]
    pub const fn codes(self) -> (u8, u8) {
        (self.x.code(), self.y.code())
    }

    /// Whether both segments are centered.
    #[must_use]
    pub const fn is_center(self) -> bool {
        matches!(self.x, Segment::Center) && matches!(self.y, Segment::Center)
    }

    /// Segment on the axis of travel for an orthogonal direction.
    #[must_use]
    pub const fn along(self, direction: Direction) -> Segment {
        if direction.is_horizontal() {
            self.x
        } else {
            self.y
        }
    }

    /// Segment on the axis perpendicular to an orthogonal direction.
    #[must_use]
    pub const fn across(self, direction: Direction) -> Segment {
        if direction.is_horizontal() {
            self.y
        } else {
            self.x
        }
    }

    /// All nine quadrants.
    #[must_use]
    pub fn all() -> [Quadrant; 9] {
        let mut out = [Quadrant::CENTER; 9];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = Quadrant::new(Segment::ALL[i % 3], Segment::ALL[i / 3]);
        }
        out
    }

    /// Fractional render offset `(dx, dy)` from the tile coordinate.
    #[must_use]
    pub const fn render_offset(self) -> (f32, f32) {
        (self.x.offset(), self.y.offset())
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x.code(), self.y.code())
    }
}

/// Next quadrant after one step in `direction`.
///
/// Returns the new quadrant and whether the step crosses into a neighbouring
/// tile on either axis.
#[must_use]
pub const fn next_quadrant(current: Quadrant, direction: Direction) -> (Quadrant, bool) {
    let (dx, dy) = direction.delta();
    let (_, x, crossed_x) = current.x.step(0, dx);
    let (_, y, crossed_y) = current.y.step(0, dy);
    (Quadrant { x, y }, crossed_x || crossed_y)
}

// =============================================================================
// Sub-tile position
// =============================================================================

/// A tile plus the quadrant occupied within it.
///
/// The tile is authoritative for every map query; the fractional coordinate
/// (`x()`, `y()`) is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SubTilePosition {
    /// Tile the actor belongs to
    pub tile: TileCoord,
    /// Segment pair within the tile
    pub quadrant: Quadrant,
}

impl SubTilePosition {
    /// Create a position.
    #[must_use]
    pub const fn new(tile: TileCoord, quadrant: Quadrant) -> Self {
        Self { tile, quadrant }
    }

    /// Center of a tile.
    #[must_use]
    pub const fn centered(tile: TileCoord) -> Self {
        Self {
            tile,
            quadrant: Quadrant::CENTER,
        }
    }

    /// Recover a position from a fractional coordinate pair.
    ///
    /// The tile is the rounded coordinate; the segment follows the sign of
    /// the remainder.
    #[must_use]
    pub fn from_fractional(x: f32, y: f32) -> Self {
        let tile = TileCoord::round_from(x, y);
        #[allow(clippy::cast_precision_loss)]
        let segment = |value: f32, base: i32| {
            let rest = round2(value - base as f32);
            if rest > 0.0 {
                Segment::Positive
            } else if rest < 0.0 {
                Segment::Negative
            } else {
                Segment::Center
            }
        };
        Self::new(
            tile,
            Quadrant::new(segment(x, tile.x), segment(y, tile.y)),
        )
    }

    /// Fractional horizontal coordinate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn x(&self) -> f32 {
        round2(self.tile.x as f32 + self.quadrant.x.offset())
    }

    /// Fractional vertical coordinate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn y(&self) -> f32 {
        round2(self.tile.y as f32 + self.quadrant.y.offset())
    }

    /// Fractional coordinate pair as a vector.
    #[must_use]
    pub fn to_vec2(&self) -> glam::Vec2 {
        glam::Vec2::new(self.x(), self.y())
    }

    /// Position after one quadrant step in `direction`.
    ///
    /// Diagonal directions step both axes. The flag reports whether the tile
    /// changed.
    #[must_use]
    pub const fn stepped(&self, direction: Direction) -> (SubTilePosition, bool) {
        let (dx, dy) = direction.delta();
        let (tx, x, crossed_x) = self.quadrant.x.step(self.tile.x, dx);
        let (ty, y, crossed_y) = self.quadrant.y.step(self.tile.y, dy);
        (
            SubTilePosition {
                tile: TileCoord::new(tx, ty),
                quadrant: Quadrant { x, y },
            },
            crossed_x || crossed_y,
        )
    }

    /// Same tile, centered.
    #[must_use]
    pub const fn recentered(&self) -> Self {
        Self::centered(self.tile)
    }

    /// Whole-tile step that keeps the quadrant.
    #[must_use]
    pub const fn shifted(&self, direction: Direction) -> Self {
        Self {
            tile: self.tile.neighbor(direction),
            quadrant: self.quadrant,
        }
    }
}

impl fmt::Display for SubTilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.tile, self.quadrant)
    }
}
