//! Quadrant movement: three steps per tile.
//!
//! Every step moves one segment along the travel axis. The map is only asked
//! about whole tiles, at two moments:
//!
//! - stepping onto the **leading edge** (the edge facing the direction of
//!   travel): the tile ahead must be reachable. If the actor also sits on a
//!   perpendicular edge, the tile ahead of the neighbouring row or column must
//!   be reachable too. When only that second check fails, the actor records a
//!   slide pair and tries to move diagonally away from the obstruction.
//! - crossing from the leading edge onto the **trailing edge** of the next
//!   tile: the entered tile must accept the actor.
//!
//! Moves within a tile are otherwise free.

use tilegrid::{Direction, Segment, SubTilePosition};
use tracing::debug;

use super::{can_enter_tile, can_pass, straighten_facing, MoveOutcome, MovementStrategy};
use crate::entity::Actor;
use crate::world_view::WorldView;

/// Render distance of one quadrant step, per axis.
const STEP: f32 = 0.33;

/// Three-steps-per-tile movement.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadrantStrategy;

/// Outcome of the passability check for one axis of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeCheck {
    Pass,
    Fail,
    /// Blocked on the perpendicular side only; `(horizontal, vertical)`
    Slide(Direction, Direction),
}

impl EdgeCheck {
    const fn passes(self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Edge segment on the side `direction` points to.
const fn leading_edge(direction: Direction) -> Segment {
    match direction {
        Direction::East | Direction::South => Segment::Positive,
        _ => Segment::Negative,
    }
}

/// Perpendicular directions `(positive side, negative side)`.
const fn perpendicular(direction: Direction) -> (Direction, Direction) {
    if direction.is_horizontal() {
        (Direction::South, Direction::North)
    } else {
        (Direction::East, Direction::West)
    }
}

/// Order a travel direction and a perpendicular one as `(horizontal, vertical)`.
const fn slide_pair(direction: Direction, side: Direction) -> EdgeCheck {
    if direction.is_horizontal() {
        EdgeCheck::Slide(direction, side)
    } else {
        EdgeCheck::Slide(side, direction)
    }
}

/// Check the `direction` axis of a step from `current` to `candidate`.
fn check(
    view: &WorldView,
    mover: &Actor,
    current: SubTilePosition,
    candidate: SubTilePosition,
    direction: Direction,
) -> EdgeCheck {
    let lead = leading_edge(direction);
    let along = candidate.quadrant.along(direction);

    if along == lead {
        if !can_pass(view, mover, candidate.tile, direction) {
            return EdgeCheck::Fail;
        }
        let (positive, negative) = perpendicular(direction);
        return match candidate.quadrant.across(direction) {
            Segment::Center => EdgeCheck::Pass,
            Segment::Positive => {
                if can_pass(view, mover, candidate.tile.neighbor(positive), direction) {
                    EdgeCheck::Pass
                } else {
                    slide_pair(direction, negative)
                }
            }
            Segment::Negative => {
                if can_pass(view, mover, candidate.tile.neighbor(negative), direction) {
                    EdgeCheck::Pass
                } else {
                    slide_pair(direction, positive)
                }
            }
        };
    }

    if along == lead.opposite() && current.quadrant.along(direction) == lead {
        return if can_enter_tile(view, mover, candidate.tile) {
            EdgeCheck::Pass
        } else {
            EdgeCheck::Fail
        };
    }

    EdgeCheck::Pass
}

impl QuadrantStrategy {
    fn straight(
        actor: &mut Actor,
        direction: Direction,
        view: &WorldView,
        allow_slide: bool,
    ) -> MoveOutcome {
        actor.movement.diagonal = None;
        actor.movement.diagonal_slide = None;

        let current = actor.movement.position;
        let (candidate, _) = current.stepped(direction);

        match check(view, actor, current, candidate, direction) {
            EdgeCheck::Pass => {
                let movement = &mut actor.movement;
                movement.set_direction(direction);
                movement.position = candidate;
                movement.trail_render(direction, STEP);
                movement.increase_steps();
                debug!(actor = %actor.id(), from = %current, to = %candidate, ?direction, "quadrant step");
                MoveOutcome::Straight(direction)
            }
            EdgeCheck::Slide(horizontal, vertical) if allow_slide => {
                actor.movement.diagonal_slide = Some((horizontal, vertical));
                debug!(actor = %actor.id(), ?horizontal, ?vertical, "diagonal slide");
                Self::diagonal(actor, horizontal, vertical, view)
            }
            EdgeCheck::Slide(..) | EdgeCheck::Fail => {
                actor.movement.set_direction(direction);
                MoveOutcome::Blocked {
                    direction,
                    front: current.tile.neighbor(direction),
                }
            }
        }
    }

    fn diagonal(
        actor: &mut Actor,
        horizontal: Direction,
        vertical: Direction,
        view: &WorldView,
    ) -> MoveOutcome {
        let Some(diagonal) = Direction::diagonal(horizontal, vertical) else {
            return MoveOutcome::Stuck;
        };
        let current = actor.movement.position;
        let (candidate, _) = current.stepped(diagonal);

        let joint = check(view, actor, current, candidate, vertical).passes()
            && check(view, actor, current, candidate, horizontal).passes();

        let outcome = if joint {
            let movement = &mut actor.movement;
            movement.diagonal = Some(diagonal);
            movement.position = candidate;
            movement.trail_render(diagonal, STEP);
            movement.increase_steps();
            debug!(actor = %actor.id(), from = %current, to = %candidate, ?diagonal, "quadrant diagonal step");
            MoveOutcome::Diagonal {
                horizontal,
                vertical,
            }
        } else {
            let (vertical_only, _) = current.stepped(vertical);
            let (horizontal_only, _) = current.stepped(horizontal);
            let vertical_clear = check(view, actor, current, vertical_only, vertical).passes();
            let horizontal_clear =
                check(view, actor, current, horizontal_only, horizontal).passes();

            if vertical_clear {
                Self::straight(actor, vertical, view, false)
            } else if horizontal_clear {
                Self::straight(actor, horizontal, view, false)
            } else {
                MoveOutcome::Stuck
            }
        };

        straighten_facing(&mut actor.movement, horizontal, vertical);
        outcome
    }
}

impl MovementStrategy for QuadrantStrategy {
    fn move_straight(
        &self,
        actor: &mut Actor,
        direction: Direction,
        view: &WorldView,
    ) -> MoveOutcome {
        Self::straight(actor, direction, view, true)
    }

    fn move_diagonal(
        &self,
        actor: &mut Actor,
        horizontal: Direction,
        vertical: Direction,
        view: &WorldView,
    ) -> MoveOutcome {
        actor.movement.diagonal_slide = None;
        Self::diagonal(actor, horizontal, vertical, view)
    }
}
