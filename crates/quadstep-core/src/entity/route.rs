//! Move routes: scripted command lists run by the route controller.

use serde::{Deserialize, Serialize};
use tilegrid::Direction;

use super::ActorId;

/// One command of a move route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteCommand {
    /// Step in a direction (diagonals allowed)
    Step(Direction),
    /// Step in the facing direction
    StepForward,
    /// Turn without moving
    Turn(Direction),
    /// Re-center on the current tile, optionally facing itself first
    Center {
        /// Clear diagonal facing while centering
        face: bool,
    },
    /// Jump by a tile offset
    Jump {
        /// Horizontal offset in tiles
        dx: i32,
        /// Vertical offset in tiles
        dy: i32,
    },
    /// Idle for a number of ticks
    Wait(u32),
    /// Switch whole-tile movement on or off
    WholeTile(bool),
    /// One homing step toward the player
    ApproachPlayer,
    /// One random orthogonal step
    RandomStep,
}

/// A list of route commands.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveRoute {
    /// Commands in execution order
    pub commands: Vec<RouteCommand>,
    /// Start over after the last command
    pub repeat: bool,
    /// Move on when a command cannot be carried out
    pub skippable: bool,
}

impl MoveRoute {
    /// A one-shot route that waits on blocked commands.
    #[must_use]
    pub fn new(commands: Vec<RouteCommand>) -> Self {
        Self {
            commands,
            repeat: false,
            skippable: false,
        }
    }

    /// Set the repeat flag.
    #[must_use]
    pub const fn repeating(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Set the skippable flag.
    #[must_use]
    pub const fn skippable(mut self, skippable: bool) -> Self {
        self.skippable = skippable;
        self
    }
}

/// A route plus the index of the next command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCursor {
    /// The route being run
    pub route: MoveRoute,
    /// Index of the next command
    pub index: usize,
}

impl RouteCursor {
    /// Cursor at the first command.
    #[must_use]
    pub const fn new(route: MoveRoute) -> Self {
        Self { route, index: 0 }
    }

    /// The next command, if the route has one.
    #[must_use]
    pub fn current(&self) -> Option<RouteCommand> {
        self.route.commands.get(self.index).copied()
    }

    /// Move past the current command.
    ///
    /// Returns `false` once a one-shot route has run out of commands.
    pub fn advance(&mut self) -> bool {
        self.index += 1;
        if self.index < self.route.commands.len() {
            return true;
        }
        self.index = 0;
        self.route.repeat
    }
}

/// A resolved route step, as handed from the route controller to the
/// movement resolver.
///
/// Random and homing commands are resolved by the controller, so the
/// resolver never needs an RNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteAction {
    /// Run the command as a movement action
    Run(RouteCommand),
    /// Homing step toward an actor
    Approach(ActorId),
    /// Step in a chosen direction, skipped if the tile check fails
    RandomStep(Direction),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_route_ends() {
        let mut cursor = RouteCursor::new(MoveRoute::new(vec![
            RouteCommand::StepForward,
            RouteCommand::Wait(3),
        ]));
        assert_eq!(cursor.current(), Some(RouteCommand::StepForward));
        assert!(cursor.advance());
        assert_eq!(cursor.current(), Some(RouteCommand::Wait(3)));
        assert!(!cursor.advance());
    }

    #[test]
    fn repeating_route_wraps() {
        let mut cursor = RouteCursor::new(
            MoveRoute::new(vec![RouteCommand::Turn(Direction::North)]).repeating(true),
        );
        assert!(cursor.advance());
        assert_eq!(cursor.index, 0);
        assert_eq!(cursor.current(), Some(RouteCommand::Turn(Direction::North)));
    }

    #[test]
    fn empty_route_has_no_command() {
        let cursor = RouteCursor::new(MoveRoute::default());
        assert_eq!(cursor.current(), None);
    }
}
