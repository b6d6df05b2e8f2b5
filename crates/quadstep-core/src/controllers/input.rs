//! Input controller: host input to player commands.
//!
//! The host hands the simulation one [`InputState`](crate::arena::InputState)
//! per tick. This controller turns it into:
//! - `SetDashing` when the dash button state differs from the player's
//! - `Move(Step)` for the held direction (diagonals included)
//! - `Interact` while confirm is pressed
//!
//! Nothing is emitted while the player is still moving, while a move route
//! drives the player, or while the host is running an event.

use crate::controller::{Controller, ControllerContext, ControllerDeclaration};
use crate::entity::ActorKind;
use crate::output::{Command, CommandKind, ControllerId, MoveAction};
use crate::world_view::WorldView;

/// Controller mapping host input onto the player.
///
/// # Example
///
/// ```
/// use quadstep_core::controllers::InputController;
/// use quadstep_core::controller::Controller;
///
/// let controller = InputController::new();
/// assert_eq!(controller.declaration().id.as_str(), "input");
/// ```
pub struct InputController {
    declaration: ControllerDeclaration,
}

impl InputController {
    /// Creates a new `InputController`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: ControllerDeclaration {
                id: ControllerId::new("input"),
                kinds: vec![ActorKind::Player],
                emits: vec![CommandKind::Move, CommandKind::Dash, CommandKind::Interact],
            },
        }
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for InputController {
    fn declaration(&self) -> &ControllerDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &ControllerContext, view: &WorldView) -> Vec<Command> {
        let mut commands = vec![];

        let Some(actor) = view.actor(ctx.actor) else {
            return commands;
        };
        let Some(player) = actor.as_player() else {
            return commands;
        };
        if view.is_event_running()
            || actor.movement.route.is_some()
            || actor.movement.is_moving()
        {
            return commands;
        }

        let input = view.input();
        let dashing = input.dash && player.vehicle.is_none();
        if dashing != actor.movement.dashing {
            commands.push(Command::SetDashing {
                actor: ctx.actor,
                dashing,
            });
        }
        if let Some(direction) = input.direction {
            commands.push(Command::Move {
                actor: ctx.actor,
                action: MoveAction::Step(direction),
            });
        }
        if input.confirm {
            commands.push(Command::Interact { actor: ctx.actor });
        }

        commands
    }
}

// =============================================================================
// Tests
// =============================================================================
