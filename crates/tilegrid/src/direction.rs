//! Eight-way directions with numpad encoding.
//!
//! Codes follow the numeric keypad: 2 is south, 4 west, 6 east, 8 north and
//! the odd codes are the diagonals between them. Code 0 is the neutral "no
//! movement" value and maps to `None` in [`Direction::from_code`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Numpad 1
    SouthWest = 1,
    /// Numpad 2
    South = 2,
    /// Numpad 3
    SouthEast = 3,
    /// Numpad 4
    West = 4,
    /// Numpad 6
    East = 6,
    /// Numpad 7
    NorthWest = 7,
    /// Numpad 8
    North = 8,
    /// Numpad 9
    NorthEast = 9,
}

impl Direction {
    /// The four orthogonal directions.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::North,
    ];

    /// The four diagonal directions.
    pub const DIAGONAL: [Direction; 4] = [
        Direction::SouthWest,
        Direction::SouthEast,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    /// All eight directions in numpad order.
    pub const ALL: [Direction; 8] = [
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
        Direction::West,
        Direction::East,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
    ];

    /// Decode a numpad code. Returns `None` for 0 and any invalid code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::SouthWest),
            2 => Some(Self::South),
            3 => Some(Self::SouthEast),
            4 => Some(Self::West),
            6 => Some(Self::East),
            7 => Some(Self::NorthWest),
            8 => Some(Self::North),
            9 => Some(Self::NorthEast),
            _ => None,
        }
    }

    /// Numpad code of this direction.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Tile delta `(dx, dy)`; `dy` is positive southward.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::SouthWest => (-1, 1),
            Self::South => (0, 1),
            Self::SouthEast => (1, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
            Self::NorthWest => (-1, -1),
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
        }
    }

    /// Odd numpad codes are diagonal.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.code() % 2 == 1
    }

    /// True for east and west.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }

    /// True for north and south.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::SouthWest => Self::NorthEast,
            Self::South => Self::North,
            Self::SouthEast => Self::NorthWest,
            Self::West => Self::East,
            Self::East => Self::West,
            Self::NorthWest => Self::SouthEast,
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
        }
    }

    /// Split a diagonal into its `(horizontal, vertical)` components.
    ///
    /// Returns `None` for orthogonal directions.
    #[must_use]
    pub const fn components(self) -> Option<(Direction, Direction)> {
        match self {
            Self::SouthWest => Some((Self::West, Self::South)),
            Self::SouthEast => Some((Self::East, Self::South)),
            Self::NorthWest => Some((Self::West, Self::North)),
            Self::NorthEast => Some((Self::East, Self::North)),
            _ => None,
        }
    }

    /// Join a horizontal and a vertical direction into a diagonal.
    ///
    /// Returns `None` unless `horizontal` is east/west and `vertical` is
    /// north/south.
    #[must_use]
    pub const fn diagonal(horizontal: Direction, vertical: Direction) -> Option<Direction> {
        match (horizontal, vertical) {
            (Self::West, Self::South) => Some(Self::SouthWest),
            (Self::East, Self::South) => Some(Self::SouthEast),
            (Self::West, Self::North) => Some(Self::NorthWest),
            (Self::East, Self::North) => Some(Self::NorthEast),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SouthWest => "south-west",
            Self::South => "south",
            Self::SouthEast => "south-east",
            Self::West => "west",
            Self::East => "east",
            Self::NorthWest => "north-west",
            Self::North => "north",
            Self::NorthEast => "north-east",
        };
        f.write_str(name)
    }
}
