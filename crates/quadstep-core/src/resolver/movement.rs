//! Movement resolver: steps, route commands and dash toggles.
//!
//! Commands are applied one at a time against `next`. For each command the
//! actor is taken out as a working copy, moved by its strategy against a
//! [`WorldView`] of `next`, and written back with its occupancy re-indexed.
//! Later commands therefore see earlier moves.
//!
//! Outcomes are journaled: `Moved` for steps, `Blocked` with the front tile
//! for refused steps (the trigger resolver reads these), `Jumped` for jumps
//! and `RouteFinished` when a one-shot route runs out.

use tilegrid::{Direction, PassabilityOracle};
use tracing::debug;

use crate::arena::Arena;
use crate::entity::{Actor, ActorId, MovementMode, RouteAction, RouteCommand};
use crate::output::{Command, CommandKind, Event, MoveAction, OutputEnvelope};
use crate::strategy::{self, can_pass, strategy_for, MoveOutcome};
use crate::world_view::WorldView;

use super::{ResolveContext, Resolver};

/// Resolver for [`CommandKind::Move`], [`CommandKind::Route`] and
/// [`CommandKind::Dash`].
///
/// # Example
///
/// ```
/// use quadstep_core::resolver::{MovementResolver, Resolver};
/// use quadstep_core::output::CommandKind;
///
/// let resolver = MovementResolver::new();
/// assert!(resolver.handles().contains(&CommandKind::Move));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementResolver;

impl MovementResolver {
    /// Creates a new movement resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Resolver for MovementResolver {
    fn handles(&self) -> &[CommandKind] {
        &[CommandKind::Move, CommandKind::Route, CommandKind::Dash]
    }

    fn resolve(
        &self,
        commands: &[&OutputEnvelope],
        ctx: &ResolveContext<'_>,
        _current: &Arena,
        next: &mut Arena,
    ) {
        for envelope in commands {
            match *envelope.command() {
                Command::SetDashing { actor, dashing } => {
                    if let Some(actor) = next.get_mut(actor) {
                        actor.movement.dashing = dashing;
                    }
                }
                Command::Move { actor, action } => {
                    let outcome =
                        with_actor(next, ctx.oracle, actor, |mover, view| {
                            apply_move(mover, action, view)
                        })
                        .flatten();
                    if let Some(outcome) = outcome {
                        record_outcome(next, actor, outcome);
                    }
                }
                Command::Route { actor, action } => resolve_route(next, ctx.oracle, actor, action),
                Command::Interact { .. } => {}
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Run `apply` on a working copy of an actor, then store the copy back.
fn with_actor<R>(
    next: &mut Arena,
    oracle: &dyn PassabilityOracle,
    id: ActorId,
    apply: impl FnOnce(&mut Actor, &WorldView<'_>) -> R,
) -> Option<R> {
    let mut actor = next.get(id)?.clone();
    let result = {
        let view = WorldView::new(next, oracle);
        apply(&mut actor, &view)
    };
    if let Some(slot) = next.get_mut(id) {
        *slot = actor;
    }
    next.update_occupancy(id);
    Some(result)
}

fn record_outcome(next: &mut Arena, actor: ActorId, outcome: MoveOutcome) {
    debug!(%actor, ?outcome, "move resolved");
    match outcome {
        MoveOutcome::Blocked { direction, front } => next.record(Event::Blocked {
            actor,
            direction,
            front,
        }),
        MoveOutcome::Stuck => {}
        MoveOutcome::Straight(_) | MoveOutcome::Diagonal { .. } => {
            next.record(Event::Moved { actor, outcome });
        }
    }
}

/// Apply one movement action. `None` means no move was attempted.
fn apply_move(actor: &mut Actor, action: MoveAction, view: &WorldView) -> Option<MoveOutcome> {
    match action {
        MoveAction::Step(direction) => Some(strategy::move_toward(actor, direction, view)),
        MoveAction::RandomStep(direction) => random_step(actor, direction, view),
        MoveAction::Approach(target) => {
            let tile = view.actor(target)?.movement.tile();
            Some(strategy::approach(actor, tile, view))
        }
        MoveAction::Chase(leader) => {
            let tile = view.actor(leader)?.movement.tile();
            Some(strategy::chase(actor, tile, view))
        }
        MoveAction::Rest => {
            actor.movement.stop_count = 0;
            None
        }
    }
}

/// A step taken only when the tile check passes.
fn random_step(actor: &mut Actor, direction: Direction, view: &WorldView) -> Option<MoveOutcome> {
    if !can_pass(view, actor, actor.movement.tile(), direction) {
        return None;
    }
    Some(strategy_for(actor.movement.mode).move_straight(actor, direction, view))
}

// =============================================================================
// Routes
// =============================================================================

/// What one route step did.
struct RouteStep {
    outcome: Option<MoveOutcome>,
    succeeded: bool,
    jumped: bool,
}

impl RouteStep {
    const fn done() -> Self {
        Self {
            outcome: None,
            succeeded: true,
            jumped: false,
        }
    }

    fn moved(outcome: MoveOutcome) -> Self {
        Self {
            outcome: Some(outcome),
            succeeded: outcome.is_success(),
            jumped: false,
        }
    }
}

fn resolve_route(next: &mut Arena, oracle: &dyn PassabilityOracle, id: ActorId, action: RouteAction) {
    let Some(step) = with_actor(next, oracle, id, |actor, view| run_route_action(actor, action, view))
    else {
        return;
    };

    if let Some(outcome) = step.outcome {
        record_outcome(next, id, outcome);
    }
    if step.jumped {
        if let Some(tile) = next.get(id).map(|actor| actor.movement.tile()) {
            next.record(Event::Jumped { actor: id, tile });
        }
    }

    let Some(actor) = next.get_mut(id) else {
        return;
    };
    let Some(cursor) = actor.movement.route.as_mut() else {
        return;
    };
    if !step.succeeded && !cursor.route.skippable {
        return;
    }
    if !cursor.advance() {
        actor.movement.route = None;
        debug!(actor = %id, "route finished");
        next.record(Event::RouteFinished { actor: id });
    }
}

fn run_route_action(actor: &mut Actor, action: RouteAction, view: &WorldView) -> RouteStep {
    match action {
        RouteAction::Approach(target) => match view.actor(target) {
            Some(target) => RouteStep::moved(strategy::approach(actor, target.movement.tile(), view)),
            None => RouteStep::done(),
        },
        RouteAction::RandomStep(direction) => RouteStep {
            outcome: random_step(actor, direction, view),
            succeeded: true,
            jumped: false,
        },
        RouteAction::Run(command) => run_route_command(actor, command, view),
    }
}

fn run_route_command(actor: &mut Actor, command: RouteCommand, view: &WorldView) -> RouteStep {
    match command {
        RouteCommand::Step(direction) => {
            return RouteStep::moved(strategy::move_toward(actor, direction, view));
        }
        RouteCommand::StepForward => {
            let facing = actor.movement.facing;
            return RouteStep::moved(strategy::move_toward(actor, facing, view));
        }
        _ => {}
    }

    let movement = &mut actor.movement;
    match command {
        RouteCommand::Turn(direction) => {
            let facing = direction.components().map_or(direction, |(_, vertical)| vertical);
            movement.set_direction(facing);
            RouteStep::done()
        }
        RouteCommand::Center { face } => {
            movement.center(face);
            RouteStep::done()
        }
        RouteCommand::Jump { dx, dy } => {
            movement.jump(dx, dy);
            RouteStep {
                outcome: None,
                succeeded: true,
                jumped: true,
            }
        }
        RouteCommand::Wait(ticks) => {
            movement.wait_count = ticks.saturating_sub(1);
            RouteStep::done()
        }
        RouteCommand::WholeTile(on) => {
            movement.mode = if on {
                MovementMode::WholeTile
            } else {
                MovementMode::Quadrant
            };
            RouteStep::done()
        }
        // Step commands returned above. Homing and random commands reach
        // here only when the controller had nothing to resolve them with.
        RouteCommand::Step(_)
        | RouteCommand::StepForward
        | RouteCommand::ApproachPlayer
        | RouteCommand::RandomStep => RouteStep::done(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementConfig;
    use crate::entity::{EventComponents, MoveRoute, RouteCursor};
    use crate::resolver::test_support::envelopes;
    use tilegrid::{OpenField, TileCoord, TileGrid};

    fn resolve(map: &dyn PassabilityOracle, arena: &mut Arena, commands: &[Command]) {
        let config = MovementConfig::default();
        let ctx = ResolveContext {
            oracle: map,
            config: &config,
        };
        let envelopes = envelopes(commands);
        let refs: Vec<_> = envelopes.iter().collect();
        let current = arena.clone();
        MovementResolver::new().resolve(&refs, &ctx, &current, arena);
    }

    fn give_route(arena: &mut Arena, id: ActorId, route: MoveRoute) {
        if let Some(actor) = arena.get_mut(id) {
            actor.movement.route = Some(RouteCursor::new(route));
        }
    }

    fn route_step(id: ActorId, command: RouteCommand) -> Command {
        Command::Route {
            actor: id,
            action: RouteAction::Run(command),
        }
    }

    mod move_tests {
        use super::*;

        #[test]
        fn step_moves_and_journals() {
            let map = OpenField::new(5, 5);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(2, 2));

            resolve(
                &map,
                &mut arena,
                &[Command::Move {
                    actor: player,
                    action: MoveAction::Step(Direction::North),
                }],
            );

            let actor = arena.get(player).unwrap();
            assert_eq!(actor.movement.position.quadrant.codes(), (0, 2));
            assert_eq!(
                arena.journal(),
                &[Event::Moved {
                    actor: player,
                    outcome: MoveOutcome::Straight(Direction::North)
                }]
            );
        }

        #[test]
        fn later_moves_see_earlier_ones() {
            let map = OpenField::new(5, 1);
            let mut arena = Arena::new();
            let first = arena.spawn_event(TileCoord::new(1, 0), EventComponents::default());
            let second = arena.spawn_event(TileCoord::new(3, 0), EventComponents::default());

            resolve(
                &map,
                &mut arena,
                &[
                    Command::Move {
                        actor: first,
                        action: MoveAction::Step(Direction::East),
                    },
                    Command::Move {
                        actor: second,
                        action: MoveAction::Step(Direction::West),
                    },
                ],
            );

            assert_eq!(arena.get(first).unwrap().movement.tile(), TileCoord::new(2, 0));
            assert_eq!(arena.get(second).unwrap().movement.tile(), TileCoord::new(3, 0));
            assert_eq!(arena.occupancy().actors_at(TileCoord::new(2, 0)), vec![first]);
            assert!(matches!(
                arena.journal()[1],
                Event::Blocked { actor, front, .. } if actor == second && front == TileCoord::new(2, 0)
            ));
        }

        #[test]
        fn random_step_skips_blocked_tiles() {
            let map = TileGrid::from_ascii(".#").unwrap();
            let mut arena = Arena::new();
            let event = arena.spawn_event(TileCoord::new(0, 0), EventComponents::default());

            resolve(
                &map,
                &mut arena,
                &[Command::Move {
                    actor: event,
                    action: MoveAction::RandomStep(Direction::East),
                }],
            );

            let actor = arena.get(event).unwrap();
            assert_eq!(actor.movement.facing, Direction::South);
            assert!(arena.journal().is_empty());
        }

        #[test]
        fn rest_resets_idle_counter() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            let event = arena.spawn_event(TileCoord::new(1, 1), EventComponents::default());
            if let Some(actor) = arena.get_mut(event) {
                actor.movement.stop_count = 77;
            }

            resolve(
                &map,
                &mut arena,
                &[Command::Move {
                    actor: event,
                    action: MoveAction::Rest,
                }],
            );
            assert_eq!(arena.get(event).unwrap().movement.stop_count, 0);
        }

        #[test]
        fn dash_toggle() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(1, 1));
            resolve(
                &map,
                &mut arena,
                &[Command::SetDashing {
                    actor: player,
                    dashing: true,
                }],
            );
            assert!(arena.get(player).unwrap().movement.dashing);
        }

        #[test]
        fn missing_actor_is_ignored() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            resolve(
                &map,
                &mut arena,
                &[Command::Move {
                    actor: ActorId::new(40),
                    action: MoveAction::Step(Direction::East),
                }],
            );
            assert!(arena.journal().is_empty());
        }
    }

    mod route_tests {
        use super::*;

        #[test]
        fn one_shot_route_finishes() {
            let map = OpenField::new(5, 5);
            let mut arena = Arena::new();
            let event = arena.spawn_event(TileCoord::new(2, 2), EventComponents::default());
            give_route(
                &mut arena,
                event,
                MoveRoute::new(vec![RouteCommand::Turn(Direction::West)]),
            );

            resolve(&map, &mut arena, &[route_step(event, RouteCommand::Turn(Direction::West))]);

            let actor = arena.get(event).unwrap();
            assert_eq!(actor.movement.facing, Direction::West);
            assert!(actor.movement.route.is_none());
            assert_eq!(arena.journal(), &[Event::RouteFinished { actor: event }]);
        }

        #[test]
        fn blocked_step_holds_route_unless_skippable() {
            let map = TileGrid::from_ascii(".#").unwrap();
            let mut arena = Arena::new();
            let event = arena.spawn_event(TileCoord::new(0, 0), EventComponents::default());
            let commands = vec![RouteCommand::Step(Direction::East), RouteCommand::Wait(2)];

            give_route(&mut arena, event, MoveRoute::new(commands.clone()));
            resolve(&map, &mut arena, &[route_step(event, RouteCommand::Step(Direction::East))]);
            let cursor = arena.get(event).unwrap().movement.route.clone().unwrap();
            assert_eq!(cursor.index, 0);

            give_route(&mut arena, event, MoveRoute::new(commands).skippable(true));
            resolve(&map, &mut arena, &[route_step(event, RouteCommand::Step(Direction::East))]);
            let cursor = arena.get(event).unwrap().movement.route.clone().unwrap();
            assert_eq!(cursor.index, 1);
        }

        #[test]
        fn wait_sets_counter() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            let event = arena.spawn_event(TileCoord::new(1, 1), EventComponents::default());
            give_route(
                &mut arena,
                event,
                MoveRoute::new(vec![RouteCommand::Wait(5)]).repeating(true),
            );
            resolve(&map, &mut arena, &[route_step(event, RouteCommand::Wait(5))]);

            let actor = arena.get(event).unwrap();
            assert_eq!(actor.movement.wait_count, 4);
            assert!(actor.movement.route.is_some());
        }

        #[test]
        fn jump_lands_centered_and_journals() {
            let map = OpenField::new(6, 6);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(1, 1));
            give_route(
                &mut arena,
                player,
                MoveRoute::new(vec![RouteCommand::Jump { dx: 2, dy: 0 }]),
            );
            resolve(
                &map,
                &mut arena,
                &[route_step(player, RouteCommand::Jump { dx: 2, dy: 0 })],
            );

            let actor = arena.get(player).unwrap();
            assert_eq!(actor.movement.tile(), TileCoord::new(3, 1));
            assert!(actor.movement.position.quadrant.is_center());
            assert!(actor.movement.is_jumping());
            assert_eq!(
                arena.journal(),
                &[
                    Event::Jumped {
                        actor: player,
                        tile: TileCoord::new(3, 1)
                    },
                    Event::RouteFinished { actor: player },
                ]
            );
        }

        #[test]
        fn whole_tile_toggle_changes_step_length() {
            let map = OpenField::new(6, 6);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(1, 1));
            give_route(
                &mut arena,
                player,
                MoveRoute::new(vec![
                    RouteCommand::WholeTile(true),
                    RouteCommand::Step(Direction::East),
                ]),
            );
            resolve(
                &map,
                &mut arena,
                &[
                    route_step(player, RouteCommand::WholeTile(true)),
                    route_step(player, RouteCommand::Step(Direction::East)),
                ],
            );

            let actor = arena.get(player).unwrap();
            assert_eq!(actor.movement.mode, MovementMode::WholeTile);
            assert_eq!(actor.movement.tile(), TileCoord::new(2, 1));
        }

        #[test]
        fn approach_route_step() {
            let map = OpenField::new(8, 8);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(5, 1));
            let event = arena.spawn_event(TileCoord::new(1, 1), EventComponents::default());
            give_route(
                &mut arena,
                event,
                MoveRoute::new(vec![RouteCommand::ApproachPlayer]),
            );
            resolve(
                &map,
                &mut arena,
                &[Command::Route {
                    actor: event,
                    action: RouteAction::Approach(player),
                }],
            );
            assert_eq!(arena.get(event).unwrap().movement.tile(), TileCoord::new(2, 1));
        }
    }
}
