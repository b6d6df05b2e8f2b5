//! Approach controller: events that home in on the player.

use rand::Rng;

use crate::controller::{Controller, ControllerContext, ControllerDeclaration};
use crate::entity::{ActorKind, MoveType};
use crate::output::{Command, CommandKind, ControllerId, MoveAction};
use crate::world_view::WorldView;

use super::{autonomous_event, random_direction, rng_for};

/// Manhattan distance under which the player counts as near.
pub const NEAR_DISTANCE: i32 = 20;

/// Controller for events with [`MoveType::Approach`].
///
/// Near the player, four rolls out of six approach, one wanders and one
/// steps forward. Far from the player the event only wanders.
pub struct ApproachController {
    declaration: ControllerDeclaration,
}

impl ApproachController {
    /// Creates a new `ApproachController`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: ControllerDeclaration {
                id: ControllerId::new("approach"),
                kinds: vec![ActorKind::Event],
                emits: vec![CommandKind::Move],
            },
        }
    }
}

impl Default for ApproachController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for ApproachController {
    fn declaration(&self) -> &ControllerDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &ControllerContext, view: &WorldView) -> Vec<Command> {
        let Some(actor) = autonomous_event(ctx, view, MoveType::Approach) else {
            return vec![];
        };
        let mut rng = rng_for(ctx);

        let here = actor.movement.tile();
        let near_player = view.player().filter(|player| {
            let there = player.movement.tile();
            (here.x - there.x).abs() + (here.y - there.y).abs() < NEAR_DISTANCE
        });

        let action = match near_player {
            Some(player) => match rng.gen_range(0..6) {
                0..=3 => MoveAction::Approach(player.id()),
                4 => MoveAction::RandomStep(random_direction(&mut rng)),
                _ => MoveAction::Step(actor.movement.facing),
            },
            None => MoveAction::RandomStep(random_direction(&mut rng)),
        };

        vec![Command::Move {
            actor: ctx.actor,
            action,
        }]
    }
}

// =============================================================================
// Tests
// =============================================================================
