//! Character sheet cell selection, including the diagonal rows.
//!
//! A regular character sheet holds eight characters in a 4×2 grid of blocks,
//! each block three frames wide and four direction rows tall. Characters
//! drawn with diagonal facing use the block directly below their own, whose
//! rows hold the four diagonals.
//!
//! Selection is cosmetic; nothing here feeds back into movement.

use serde::{Deserialize, Serialize};
use tilegrid::Direction;

use crate::config::MovementConfig;
use crate::entity::Actor;

/// Animation frames per character block.
pub const CHARACTER_FRAMES: u32 = 3;

/// Where to cut a character out of its sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetCell {
    /// Horizontal block offset, in frames
    pub block_x: u32,
    /// Vertical block offset, in rows
    pub block_y: u32,
    /// Row within the block
    pub pattern_y: u32,
}

/// Row of a diagonal in the diagonal block.
#[must_use]
pub const fn diagonal_row(direction: Direction) -> Option<u32> {
    match direction {
        Direction::SouthEast => Some(0),
        Direction::SouthWest => Some(1),
        Direction::NorthEast => Some(2),
        Direction::NorthWest => Some(3),
        _ => None,
    }
}

/// The diagonal cell for an actor, if it should be drawn diagonally.
///
/// Only the top four characters of a regular sheet have a diagonal block.
#[must_use]
pub fn diagonal_cell(actor: &Actor, config: &MovementConfig) -> Option<SheetCell> {
    let sprite = actor.sprite;
    if !config.use_diagonal_sprites || sprite.big || sprite.index >= 4 {
        return None;
    }
    let pattern_y = diagonal_row(actor.movement.diagonal?)?;
    let index = u32::from(sprite.index) + 4;
    Some(SheetCell {
        block_x: index % 4 * CHARACTER_FRAMES,
        block_y: index / 4 * 4,
        pattern_y,
    })
}

/// The cell to draw an actor with.
#[must_use]
pub fn sheet_cell(actor: &Actor, config: &MovementConfig) -> SheetCell {
    if let Some(cell) = diagonal_cell(actor, config) {
        return cell;
    }
    let pattern_y = u32::from(actor.movement.facing.code().saturating_sub(2)) / 2;
    if actor.sprite.big {
        return SheetCell {
            block_x: 0,
            block_y: 0,
            pattern_y,
        };
    }
    let index = u32::from(actor.sprite.index);
    SheetCell {
        block_x: index % 4 * CHARACTER_FRAMES,
        block_y: index / 4 * 4,
        pattern_y,
    }
}
