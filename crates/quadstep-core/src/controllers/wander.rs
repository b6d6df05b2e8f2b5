//! Wander controller: random movement for events.
//!
//! Each time an idle random-type event has been still long enough, one roll
//! out of six decides its move:
//!
//! | Roll | Move |
//! |------|------|
//! | 0-1  | random step (skipped if the tile is blocked) |
//! | 2-4  | step forward |
//! | 5    | rest |

use rand::Rng;

use crate::controller::{Controller, ControllerContext, ControllerDeclaration};
use crate::entity::{Actor, ActorKind, MoveType};
use crate::output::{Command, CommandKind, ControllerId, MoveAction};
use crate::world_view::WorldView;

use super::{autonomous_event, random_direction, rng_for};

/// Controller for events with [`MoveType::Random`].
pub struct WanderController {
    declaration: ControllerDeclaration,
}

impl WanderController {
    /// Creates a new `WanderController`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: ControllerDeclaration {
                id: ControllerId::new("wander"),
                kinds: vec![ActorKind::Event],
                emits: vec![CommandKind::Move],
            },
        }
    }
}

impl Default for WanderController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for WanderController {
    fn declaration(&self) -> &ControllerDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &ControllerContext, view: &WorldView) -> Vec<Command> {
        let Some(actor) = autonomous_event(ctx, view, MoveType::Random) else {
            return vec![];
        };
        let mut rng = rng_for(ctx);
        let action = wander(actor, rng.gen_range(0..6), &mut rng);
        vec![Command::Move {
            actor: ctx.actor,
            action,
        }]
    }
}

/// The move for one wander roll.
pub(crate) fn wander(actor: &Actor, roll: u32, rng: &mut rand_chacha::ChaCha8Rng) -> MoveAction {
    match roll {
        0 | 1 => MoveAction::RandomStep(random_direction(rng)),
        2..=4 => MoveAction::Step(actor.movement.facing),
        _ => MoveAction::Rest,
    }
}

// =============================================================================
// Tests
// =============================================================================
