//! Follower controller: party members trail their leader.

use crate::controller::{Controller, ControllerContext, ControllerDeclaration};
use crate::entity::ActorKind;
use crate::output::{Command, CommandKind, ControllerId, MoveAction};
use crate::world_view::WorldView;

/// Controller that keeps a follower next to its leader.
///
/// An idle follower more than one tile away from its leader on either axis
/// chases it by one whole tile.
pub struct FollowerController {
    declaration: ControllerDeclaration,
}

impl FollowerController {
    /// Creates a new `FollowerController`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declaration: ControllerDeclaration {
                id: ControllerId::new("follower"),
                kinds: vec![ActorKind::Follower],
                emits: vec![CommandKind::Move],
            },
        }
    }
}

impl Default for FollowerController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for FollowerController {
    fn declaration(&self) -> &ControllerDeclaration {
        &self.declaration
    }

    fn run(&self, ctx: &ControllerContext, view: &WorldView) -> Vec<Command> {
        let Some(actor) = view.actor(ctx.actor) else {
            return vec![];
        };
        let Some(leader) = actor
            .as_follower()
            .and_then(|follower| view.actor(follower.leader))
        else {
            return vec![];
        };
        if actor.movement.is_moving() {
            return vec![];
        }

        let here = actor.movement.tile();
        let there = leader.movement.tile();
        if (here.x - there.x).abs().max((here.y - there.y).abs()) <= 1 {
            return vec![];
        }

        vec![Command::Move {
            actor: ctx.actor,
            action: MoveAction::Chase(leader.id()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::output::TraceId;
    use tilegrid::{OpenField, TileCoord};

    fn run(leader_at: TileCoord, follower_at: TileCoord) -> Vec<Command> {
        let mut arena = Arena::new();
        let leader = arena.spawn_player(leader_at);
        let follower = arena.spawn_follower(follower_at, leader);
        let map = OpenField::new(10, 10);
        let view = WorldView::new(&arena, &map);
        let ctx = ControllerContext {
            actor: follower,
            tick: 0,
            trace_id: TraceId::new(0),
        };
        FollowerController::new().run(&ctx, &view)
    }

    #[test]
    fn adjacent_follower_waits() {
        assert!(run(TileCoord::new(5, 5), TileCoord::new(4, 4)).is_empty());
        assert!(run(TileCoord::new(5, 5), TileCoord::new(5, 5)).is_empty());
    }

    #[test]
    fn distant_follower_chases() {
        let commands = run(TileCoord::new(5, 5), TileCoord::new(3, 5));
        assert!(matches!(
            commands.as_slice(),
            [Command::Move {
                action: MoveAction::Chase(_),
                ..
            }]
        ));
    }
}
