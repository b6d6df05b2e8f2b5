//! Standard controllers.
//!
//! - [`InputController`]: turns host input into player commands
//! - [`RouteController`]: runs move routes for the player and events
//! - [`WanderController`]: random movement for events
//! - [`ApproachController`]: events homing in on the player
//! - [`FollowerController`]: party members trailing their leader
//!
//! Use [`ControllerRegistry::default_bundles()`](crate::controller::ControllerRegistry::default_bundles)
//! for a registry with each controller bound to its actor kinds.

mod approach;
mod follower;
mod input;
mod route;
mod wander;

pub use approach::ApproachController;
pub use follower::FollowerController;
pub use input::InputController;
pub use route::RouteController;
pub use wander::WanderController;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilegrid::Direction;

use crate::controller::ControllerContext;
use crate::entity::{Actor, MoveType};
use crate::world_view::WorldView;

/// Generator for one controller run.
pub(crate) fn rng_for(ctx: &ControllerContext) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(ctx.trace_id.as_u64())
}

/// A uniformly chosen orthogonal direction.
pub(crate) fn random_direction(rng: &mut ChaCha8Rng) -> Direction {
    Direction::ORTHOGONAL[rng.gen_range(0..Direction::ORTHOGONAL.len())]
}

/// The event, if it is due for an autonomous move of the given type.
///
/// The event must be idle, have no route, not be the running event and have
/// been still for longer than its frequency threshold.
pub(crate) fn autonomous_event<'a>(
    ctx: &ControllerContext,
    view: &WorldView<'a>,
    move_type: MoveType,
) -> Option<&'a Actor> {
    let actor = view.actor(ctx.actor)?;
    let event = actor.as_event()?;
    if event.move_type != move_type
        || actor.movement.is_moving()
        || actor.movement.route.is_some()
        || view.arena().running_event() == Some(actor.id())
    {
        return None;
    }
    (actor.movement.stop_count > event.stop_threshold()).then_some(actor)
}
