//! Movement strategies: how a requested step turns into a new position.
//!
//! An actor's [`MovementMode`] selects the strategy at runtime:
//! - [`QuadrantStrategy`]: three steps per tile, with edge checks against the
//!   neighbouring tiles and diagonal sliding around corners
//! - [`WholeTileStrategy`]: classic one-tile steps
//!
//! Both strategies are stateless. They mutate the actor handed to them and
//! read everything else through a [`WorldView`].
//!
//! The tile-level checks shared by both strategies ([`can_pass`],
//! [`can_enter_tile`] and [`can_pass_diagonally`]) live here.

mod homing;
mod quadrant;
mod tile;

pub use homing::{approach, chase, turn_toward};
pub use quadrant::QuadrantStrategy;
pub use tile::WholeTileStrategy;

use serde::{Deserialize, Serialize};
use tilegrid::{Direction, TileCoord};
use tracing::trace;

use crate::entity::{Actor, MovementMode, MovementState};
use crate::world_view::WorldView;

/// Result of a move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Moved one step orthogonally
    Straight(Direction),
    /// Moved one step diagonally
    Diagonal {
        /// Horizontal component
        horizontal: Direction,
        /// Vertical component
        vertical: Direction,
    },
    /// Could not move; the actor now faces `direction`
    Blocked {
        /// Requested direction
        direction: Direction,
        /// Tile in front of the actor, for touch triggers
        front: TileCoord,
    },
    /// No component of a diagonal move was possible
    Stuck,
}

impl MoveOutcome {
    /// Whether the actor changed position.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Straight(_) | Self::Diagonal { .. })
    }
}

/// A way of resolving step requests.
pub trait MovementStrategy: Send + Sync {
    /// Attempt one step in an orthogonal direction.
    fn move_straight(&self, actor: &mut Actor, direction: Direction, view: &WorldView)
        -> MoveOutcome;

    /// Attempt one diagonal step given as its two components.
    fn move_diagonal(
        &self,
        actor: &mut Actor,
        horizontal: Direction,
        vertical: Direction,
        view: &WorldView,
    ) -> MoveOutcome;
}

static QUADRANT: QuadrantStrategy = QuadrantStrategy;
static WHOLE_TILE: WholeTileStrategy = WholeTileStrategy;

/// The strategy for a movement mode.
#[must_use]
pub fn strategy_for(mode: MovementMode) -> &'static dyn MovementStrategy {
    match mode {
        MovementMode::Quadrant => &QUADRANT,
        MovementMode::WholeTile => &WHOLE_TILE,
    }
}

/// Step in any of the eight directions using the actor's own strategy.
pub fn move_toward(actor: &mut Actor, direction: Direction, view: &WorldView) -> MoveOutcome {
    let strategy = strategy_for(actor.movement.mode);
    match direction.components() {
        Some((horizontal, vertical)) => strategy.move_diagonal(actor, horizontal, vertical, view),
        None => strategy.move_straight(actor, direction, view),
    }
}

// =============================================================================
// Tile-level checks
// =============================================================================

/// Whether `mover` may step from `tile` to its neighbour in `direction`.
///
/// The neighbour must be on the map. Through actors pass anything else;
/// everyone else needs the exit of `tile`, the entry of the neighbour and a
/// neighbour free of blocking actors.
#[must_use]
pub fn can_pass(view: &WorldView, mover: &Actor, tile: TileCoord, direction: Direction) -> bool {
    let next = tile.neighbor(direction);
    let pass = if !view.is_valid(next) {
        false
    } else if mover.movement.through {
        true
    } else if !view.is_passable(tile, direction) || !view.is_passable(next, direction.reverse()) {
        false
    } else {
        !view.is_blocked_by_actors(next, mover)
    };
    trace!(actor = %mover.id(), %tile, ?direction, pass, "tile check");
    pass
}

/// Whether `mover` may stand on `tile` after crossing into it.
///
/// Checks the tile against the mover's current facing rather than the
/// direction of travel.
#[must_use]
pub fn can_enter_tile(view: &WorldView, mover: &Actor, tile: TileCoord) -> bool {
    if !view.is_valid(tile) {
        return false;
    }
    if mover.movement.through {
        return true;
    }
    view.is_passable(tile, mover.movement.facing) && !view.is_blocked_by_actors(tile, mover)
}

/// Whether a whole-tile diagonal step is possible by either L-shaped path.
#[must_use]
pub fn can_pass_diagonally(
    view: &WorldView,
    mover: &Actor,
    tile: TileCoord,
    horizontal: Direction,
    vertical: Direction,
) -> bool {
    let via_vertical = can_pass(view, mover, tile, vertical)
        && can_pass(view, mover, tile.neighbor(vertical), horizontal);
    let via_horizontal = can_pass(view, mover, tile, horizontal)
        && can_pass(view, mover, tile.neighbor(horizontal), vertical);
    via_vertical || via_horizontal
}

/// Straighten facing after a diagonal attempt.
///
/// A facing opposite to either component snaps to that component; diagonal
/// facing is left alone.
pub(crate) fn straighten_facing(
    movement: &mut MovementState,
    horizontal: Direction,
    vertical: Direction,
) {
    if movement.facing == horizontal.reverse() {
        movement.snap_direction(horizontal);
    }
    if movement.facing == vertical.reverse() {
        movement.snap_direction(vertical);
    }
}
