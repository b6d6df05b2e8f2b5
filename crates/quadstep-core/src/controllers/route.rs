//! Route controller: steps through an actor's move route.
//!
//! One command is issued per idle tick. Commands that need a decision
//! (homing target, random direction) are settled here so the resolver stays
//! free of randomness.

use crate::controller::{Controller, ControllerContext, ControllerDeclaration};
use crate::entity::{ActorKind, RouteAction, RouteCommand};
use crate::output::{Command, CommandKind, ControllerId};
use crate::world_view::WorldView;

use super::{random_direction, rng_for};

/// Controller running move routes.
///
/// # Example
///
/// ```
/// use quadstep_core::controllers::RouteController;
/// use quadstep_core::controller::Controller;
///
/// let controller = RouteController::new();
/// assert_eq!(controller.declaration().id.as_str(), "route");
/// ```
pub struct RouteController {
    declaration: ControllerDeclaration,
}

impl RouteController {
    /// Creates a new `RouteController`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: ControllerDeclaration {
                id: ControllerId::new("route"),
                kinds: vec![ActorKind::Player, ActorKind::Event],
                emits: vec![CommandKind::Route],
            },
        }
    }
}

impl Default for RouteController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for RouteController {
    fn declaration(&self) -> &ControllerDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &ControllerContext, view: &WorldView) -> Vec<Command> {
        let Some(actor) = view.actor(ctx.actor) else {
            return vec![];
        };
        let movement = &actor.movement;
        if movement.is_moving() || movement.wait_count > 0 {
            return vec![];
        }
        let Some(command) = movement.route.as_ref().and_then(|cursor| cursor.current()) else {
            return vec![];
        };

        let action = match command {
            RouteCommand::ApproachPlayer => match view.player() {
                Some(player) if player.id() != actor.id() => RouteAction::Approach(player.id()),
                _ => RouteAction::Run(command),
            },
            RouteCommand::RandomStep => {
                let mut rng = rng_for(ctx);
                RouteAction::RandomStep(random_direction(&mut rng))
            }
            _ => RouteAction::Run(command),
        };

        vec![Command::Route {
            actor: ctx.actor,
            action,
        }]
    }
}

// =============================================================================
// Tests
// =============================================================================
