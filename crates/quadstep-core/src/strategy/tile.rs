//! Whole-tile movement, used by followers, homing moves and vehicles.

use tilegrid::Direction;
use tracing::debug;

use super::{can_pass, can_pass_diagonally, straighten_facing, MoveOutcome, MovementStrategy};
use crate::entity::Actor;
use crate::world_view::WorldView;

/// One-step-per-tile movement.
///
/// The quadrant is carried along unchanged, so an actor switched to this
/// mode mid-tile keeps its offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeTileStrategy;

impl MovementStrategy for WholeTileStrategy {
    fn move_straight(
        &self,
        actor: &mut Actor,
        direction: Direction,
        view: &WorldView,
    ) -> MoveOutcome {
        actor.movement.diagonal = None;
        actor.movement.diagonal_slide = None;
        let tile = actor.movement.tile();

        if can_pass(view, actor, tile, direction) {
            let movement = &mut actor.movement;
            movement.set_direction(direction);
            movement.position = movement.position.shifted(direction);
            movement.trail_render(direction, 1.0);
            movement.increase_steps();
            debug!(actor = %actor.id(), from = %tile, ?direction, "tile step");
            MoveOutcome::Straight(direction)
        } else {
            actor.movement.set_direction(direction);
            MoveOutcome::Blocked {
                direction,
                front: tile.neighbor(direction),
            }
        }
    }

    fn move_diagonal(
        &self,
        actor: &mut Actor,
        horizontal: Direction,
        vertical: Direction,
        view: &WorldView,
    ) -> MoveOutcome {
        actor.movement.diagonal_slide = None;
        let Some(diagonal) = Direction::diagonal(horizontal, vertical) else {
            return MoveOutcome::Stuck;
        };
        let tile = actor.movement.tile();

        let outcome = if can_pass_diagonally(view, actor, tile, horizontal, vertical) {
            let movement = &mut actor.movement;
            movement.diagonal = Some(diagonal);
            movement.position = movement.position.shifted(diagonal);
            movement.trail_render(diagonal, 1.0);
            movement.increase_steps();
            debug!(actor = %actor.id(), from = %tile, ?diagonal, "tile diagonal step");
            MoveOutcome::Diagonal {
                horizontal,
                vertical,
            }
        } else if can_pass(view, actor, tile, horizontal) {
            self.move_straight(actor, horizontal, view)
        } else if can_pass(view, actor, tile, vertical) {
            self.move_straight(actor, vertical, view)
        } else {
            MoveOutcome::Stuck
        };

        straighten_facing(&mut actor.movement, horizontal, vertical);
        outcome
    }
}
