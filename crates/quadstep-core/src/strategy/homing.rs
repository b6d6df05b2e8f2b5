//! Moving toward another actor.
//!
//! Homing always walks whole tiles, whatever the actor's mode; the mode is
//! restored afterwards. Offsets are measured between rounded tiles.

use tilegrid::{Direction, TileCoord};

use super::{strategy_for, MoveOutcome};
use crate::entity::{Actor, MovementMode, MovementState};
use crate::world_view::WorldView;

/// Horizontal and vertical directions pointing from `from` toward `to`,
/// plus the signed offsets `from - to`.
fn heading(from: TileCoord, to: TileCoord) -> (i32, i32, Direction, Direction) {
    let sx = from.x - to.x;
    let sy = from.y - to.y;
    let horizontal = if sx > 0 { Direction::West } else { Direction::East };
    let vertical = if sy > 0 { Direction::North } else { Direction::South };
    (sx, sy, horizontal, vertical)
}

/// Face a tile.
///
/// Facing follows the dominant axis. When both offsets have the same size
/// the diagonal facing is set as well; otherwise it is cleared. Facing one's
/// own tile only clears diagonal facing.
pub fn turn_toward(movement: &mut MovementState, target: TileCoord) {
    let (sx, sy, horizontal, vertical) = heading(movement.tile(), target);
    if sx.abs() > sy.abs() {
        movement.set_direction(horizontal);
    } else if sy != 0 {
        movement.set_direction(vertical);
    }
    movement.diagonal = if sx != 0 && sx.abs() == sy.abs() {
        Direction::diagonal(horizontal, vertical)
    } else {
        None
    };
}

/// One homing step toward `target`.
///
/// Moves diagonally when the target lies on an exact diagonal; otherwise
/// along the dominant axis, trying the other axis if that is blocked.
/// Standing on the target yields [`MoveOutcome::Stuck`].
pub fn approach(actor: &mut Actor, target: TileCoord, view: &WorldView) -> MoveOutcome {
    with_whole_tiles(actor, |actor| {
        turn_toward(&mut actor.movement, target);
        let strategy = strategy_for(MovementMode::WholeTile);
        let (sx, sy, horizontal, vertical) = heading(actor.movement.tile(), target);

        if actor.movement.diagonal.is_some() {
            return strategy.move_diagonal(actor, horizontal, vertical, view);
        }

        if sx.abs() > sy.abs() {
            let outcome = strategy.move_straight(actor, horizontal, view);
            if !outcome.is_success() && sy != 0 {
                return strategy.move_straight(actor, vertical, view);
            }
            outcome
        } else if sy != 0 {
            let outcome = strategy.move_straight(actor, vertical, view);
            if !outcome.is_success() && sx != 0 {
                return strategy.move_straight(actor, horizontal, view);
            }
            outcome
        } else {
            MoveOutcome::Stuck
        }
    })
}

/// One follower step toward `target`: diagonal when both offsets are
/// non-zero, straight otherwise.
pub fn chase(actor: &mut Actor, target: TileCoord, view: &WorldView) -> MoveOutcome {
    with_whole_tiles(actor, |actor| {
        let strategy = strategy_for(MovementMode::WholeTile);
        let (sx, sy, horizontal, vertical) = heading(actor.movement.tile(), target);
        match (sx != 0, sy != 0) {
            (true, true) => strategy.move_diagonal(actor, horizontal, vertical, view),
            (true, false) => strategy.move_straight(actor, horizontal, view),
            (false, true) => strategy.move_straight(actor, vertical, view),
            (false, false) => MoveOutcome::Stuck,
        }
    })
}

fn with_whole_tiles(actor: &mut Actor, step: impl FnOnce(&mut Actor) -> MoveOutcome) -> MoveOutcome {
    let previous = actor.movement.mode;
    actor.movement.mode = MovementMode::WholeTile;
    let outcome = step(actor);
    actor.movement.mode = previous;
    outcome
}
