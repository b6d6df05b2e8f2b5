//! Trigger resolver: render motion, tile triggers and the cooldown gate.
//!
//! Runs after movement every tick, in this order:
//!
//! 1. Touch triggers for moves that were blocked this tick
//! 2. Render motion and idle counters for every actor
//! 3. Step completion for the player: floor damage, then the "here" check
//! 4. The confirm button
//! 5. One tick of the player's trigger gate
//!
//! Autorun and parallel events are the host's business and never start here.

use tilegrid::TileCoord;
use tracing::debug;

use crate::arena::Arena;
use crate::config::MovementConfig;
use crate::entity::{ActorId, EventFlags, MovementState, Trigger, VehicleKind};
use crate::output::{Command, CommandKind, Event, OutputEnvelope};
use crate::world_view::WorldView;

use super::{ResolveContext, Resolver};

const TOUCH: &[Trigger] = &[Trigger::PlayerTouch, Trigger::EventTouch];
const BUTTON: &[Trigger] = &[Trigger::ActionButton];
const BUTTON_OR_TOUCH: &[Trigger] = &[
    Trigger::ActionButton,
    Trigger::PlayerTouch,
    Trigger::EventTouch,
];

/// Resolver for [`CommandKind::Interact`] and the per-tick trigger checks.
///
/// Runs every tick even without commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerResolver;

impl TriggerResolver {
    /// Creates a new trigger resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Resolver for TriggerResolver {
    fn handles(&self) -> &[CommandKind] {
        &[CommandKind::Interact]
    }

    fn resolve(
        &self,
        commands: &[&OutputEnvelope],
        ctx: &ResolveContext<'_>,
        current: &Arena,
        next: &mut Arena,
    ) {
        blocked_touches(next, ctx);
        advance_motion(next, ctx.config);
        finish_player_step(current, next, ctx);

        let player = next.player_id();
        let interact = commands.iter().any(|envelope| {
            matches!(envelope.command(), Command::Interact { actor } if Some(*actor) == player)
        });
        if interact {
            press_confirm(next, ctx);
        }

        if let Some(components) = next.player_mut().and_then(|player| player.as_player_mut()) {
            components.gate.tick();
        }
    }
}

// =============================================================================
// Firing
// =============================================================================

/// An event picked for starting.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: ActorId,
    trigger: Trigger,
    no_delay: bool,
}

/// Events on `tile` whose layer matches `normal` and whose trigger is in
/// `triggers`, sorted by ID.
fn candidates(
    next: &Arena,
    ctx: &ResolveContext<'_>,
    tile: TileCoord,
    triggers: &[Trigger],
    normal: bool,
) -> Vec<Candidate> {
    let view = WorldView::new(next, ctx.oracle);
    view.events_at(tile)
        .into_iter()
        .filter_map(|actor| {
            let event = actor.as_event()?;
            let matches = triggers.contains(&event.trigger) && event.priority.is_normal() == normal;
            matches.then_some(Candidate {
                id: actor.id(),
                trigger: event.trigger,
                no_delay: event.flags.contains(EventFlags::NO_DELAY),
            })
        })
        .collect()
}

/// Start every candidate and arm the gate once.
///
/// Nothing starts while another event runs. The first event started becomes
/// the running event.
fn fire(next: &mut Arena, by: ActorId, started: &[Candidate], config: &MovementConfig) -> bool {
    if next.running_event().is_some() || started.is_empty() {
        return false;
    }
    for candidate in started {
        debug!(event = %candidate.id, %by, trigger = ?candidate.trigger, "trigger fired");
        next.record(Event::TriggerFired {
            event: candidate.id,
            by,
            trigger: candidate.trigger,
        });
    }
    if started.iter().any(|candidate| !candidate.no_delay) {
        if let Some(player) = next.player_mut() {
            let dashing = player.movement.dashing;
            if let Some(components) = player.as_player_mut() {
                components.gate.arm(config.trigger_cooldown_frames, dashing);
            }
        }
    }
    next.set_running_event(started.first().map(|candidate| candidate.id));
    true
}

/// Whether the player's gate lets tile triggers through.
fn gate_is_armed(next: &Arena) -> bool {
    next.player()
        .and_then(|player| player.as_player())
        .is_some_and(|components| components.gate.is_armed())
}

/// Map events are not started from inside an airship.
fn can_start_local_events(next: &Arena) -> bool {
    next.player()
        .and_then(|player| player.as_player())
        .is_some_and(|components| components.vehicle != Some(VehicleKind::Airship))
}

// =============================================================================
// Phases
// =============================================================================

fn blocked_touches(next: &mut Arena, ctx: &ResolveContext<'_>) {
    let Some(player_id) = next.player_id() else {
        return;
    };
    let blocked: Vec<(ActorId, TileCoord)> = next
        .journal()
        .iter()
        .filter_map(|event| match *event {
            Event::Blocked { actor, front, .. } => Some((actor, front)),
            _ => None,
        })
        .collect();

    for (actor, front) in blocked {
        // both directions of a touch wait for the gate
        if !gate_is_armed(next) || !can_start_local_events(next) {
            continue;
        }
        if actor == player_id {
            let started = candidates(next, ctx, front, TOUCH, true);
            fire(next, player_id, &started, ctx.config);
        } else if let Some(candidate) = event_touch(next, actor, front) {
            fire(next, actor, &[candidate], ctx.config);
        }
    }
}

/// An event-touch event that bumped into the player.
fn event_touch(next: &Arena, id: ActorId, front: TileCoord) -> Option<Candidate> {
    let actor = next.get(id)?;
    let event = actor.as_event()?;
    let player_tile = next.player()?.movement.tile();
    let touches = event.trigger == Trigger::EventTouch
        && event.priority.is_normal()
        && player_tile == front
        && !actor.movement.is_jumping();
    touches.then_some(Candidate {
        id,
        trigger: event.trigger,
        no_delay: event.flags.contains(EventFlags::NO_DELAY),
    })
}

fn advance_motion(next: &mut Arena, config: &MovementConfig) {
    let party = next
        .player()
        .map(|player| (player.movement.move_speed, player.movement.dashing));

    for actor in next.actors_sorted_mut() {
        if let (true, Some((speed, dashing))) = (actor.is_follower(), party) {
            actor.movement.move_speed = speed;
            actor.movement.dashing = dashing;
        }
        let movement = &mut actor.movement;
        if movement.is_moving() {
            let speed = movement.real_move_speed(config.diagonal_speed_factor);
            movement.update_motion(MovementState::distance_per_frame(speed));
        } else {
            movement.stop_count = movement.stop_count.saturating_add(1);
            movement.wait_count = movement.wait_count.saturating_sub(1);
        }
    }
}

fn finish_player_step(current: &Arena, next: &mut Arena, ctx: &ResolveContext<'_>) {
    let Some(player_id) = next.player_id() else {
        return;
    };
    let stepped = next
        .journal()
        .iter()
        .any(|event| matches!(event, Event::Moved { actor, .. } if *actor == player_id));
    let was_moving = stepped || current.player().is_some_and(|player| player.movement.is_moving());
    let Some(player) = next.player() else {
        return;
    };
    if !was_moving || player.movement.is_moving() || next.running_event().is_some() {
        return;
    }
    let tile = player.movement.tile();
    let dashing = player.movement.dashing;
    let on_foot = player
        .as_player()
        .is_some_and(|components| components.vehicle.is_none());

    if on_foot && ctx.oracle.is_damage_floor(tile) && gate_is_armed(next) {
        debug!(actor = %player_id, %tile, "floor damage");
        next.record(Event::FloorDamage {
            actor: player_id,
            tile,
        });
        if let Some(components) = next.player_mut().and_then(|player| player.as_player_mut()) {
            components.gate.arm(ctx.config.trigger_cooldown_frames, dashing);
        }
    }

    if gate_is_armed(next) && can_start_local_events(next) {
        let started = candidates(next, ctx, tile, TOUCH, false);
        fire(next, player_id, &started, ctx.config);
    }
}

/// Confirm button: events underneath first, then the one in front.
///
/// Neither half waits for the trigger gate, including the check underneath
/// that a cooldown-gated "here" check would otherwise block. A start still
/// arms the gate.
fn press_confirm(next: &mut Arena, ctx: &ResolveContext<'_>) {
    let Some(player) = next.player() else {
        return;
    };
    if player.movement.is_moving() || next.running_event().is_some() || !can_start_local_events(next)
    {
        return;
    }
    let player_id = player.id();
    let tile = player.movement.tile();
    let front = tile.neighbor(player.movement.facing);

    let here = candidates(next, ctx, tile, BUTTON, false);
    if fire(next, player_id, &here, ctx.config) {
        return;
    }
    let there = candidates(next, ctx, front, BUTTON_OR_TOUCH, true);
    fire(next, player_id, &there, ctx.config);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EventComponents, MoveType, Priority};
    use crate::gate::GateState;
    use crate::resolver::test_support::envelopes;
    use crate::strategy::MoveOutcome;
    use tilegrid::{Direction, OpenField, PassabilityOracle, TileGrid};

    fn resolve_with(
        map: &dyn PassabilityOracle,
        current: &Arena,
        next: &mut Arena,
        commands: &[Command],
    ) {
        let config = MovementConfig::default();
        let ctx = ResolveContext {
            oracle: map,
            config: &config,
        };
        let envelopes = envelopes(commands);
        let refs: Vec<_> = envelopes.iter().collect();
        TriggerResolver::new().resolve(&refs, &ctx, current, next);
    }

    fn resolve(map: &dyn PassabilityOracle, next: &mut Arena, commands: &[Command]) {
        let current = next.clone();
        resolve_with(map, &current, next, commands);
    }

    fn event(trigger: Trigger, priority: Priority) -> EventComponents {
        EventComponents {
            trigger,
            priority,
            ..EventComponents::default()
        }
    }

    fn gate(arena: &Arena) -> GateState {
        arena.player().unwrap().as_player().unwrap().gate.state()
    }

    fn cool_gate(arena: &mut Arena, frames: u32) {
        let player = arena.player_mut().unwrap();
        player.as_player_mut().unwrap().gate.arm(frames, false);
    }

    fn fired(arena: &Arena) -> Vec<ActorId> {
        arena
            .journal()
            .iter()
            .filter_map(|event| match event {
                Event::TriggerFired { event, .. } => Some(*event),
                _ => None,
            })
            .collect()
    }

    mod touch_tests {
        use super::*;

        fn bump(arena: &mut Arena, player: ActorId) {
            arena.record(Event::Blocked {
                actor: player,
                direction: Direction::East,
                front: TileCoord::new(1, 0),
            });
        }

        #[test]
        fn blocked_player_starts_touch_event_in_front() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            let door = arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::PlayerTouch, Priority::SameAsCharacters),
            );
            bump(&mut arena, player);

            resolve(&map, &mut arena, &[]);

            assert_eq!(fired(&arena), vec![door]);
            assert_eq!(arena.running_event(), Some(door));
            // armed for 30, then ticked once
            assert_eq!(gate(&arena), GateState::Cooling(29));
        }

        #[test]
        fn cooling_gate_suppresses_touch() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::PlayerTouch, Priority::SameAsCharacters),
            );
            cool_gate(&mut arena, 5);
            bump(&mut arena, player);

            resolve(&map, &mut arena, &[]);

            assert!(fired(&arena).is_empty());
            assert_eq!(gate(&arena), GateState::Cooling(4));
        }

        #[test]
        fn no_delay_event_leaves_gate_armed() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            arena.spawn_event(
                TileCoord::new(1, 0),
                EventComponents {
                    flags: EventFlags::NO_DELAY,
                    ..event(Trigger::PlayerTouch, Priority::SameAsCharacters)
                },
            );
            bump(&mut arena, player);

            resolve(&map, &mut arena, &[]);

            assert_eq!(fired(&arena).len(), 1);
            assert_eq!(gate(&arena), GateState::Armed);
        }

        #[test]
        fn dashing_halves_the_cooldown() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            arena.get_mut(player).unwrap().movement.dashing = true;
            arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::EventTouch, Priority::SameAsCharacters),
            );
            bump(&mut arena, player);

            resolve(&map, &mut arena, &[]);

            assert_eq!(gate(&arena), GateState::Cooling(14));
        }

        #[test]
        fn nothing_starts_while_an_event_runs() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            let busy = arena.spawn_event(TileCoord::new(2, 0), EventComponents::default());
            arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::PlayerTouch, Priority::SameAsCharacters),
            );
            arena.set_running_event(Some(busy));
            bump(&mut arena, player);

            resolve(&map, &mut arena, &[]);

            assert!(fired(&arena).is_empty());
            assert_eq!(arena.running_event(), Some(busy));
        }

        #[test]
        fn event_touch_event_bumping_player_starts() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            arena.spawn_player(TileCoord::new(0, 0));
            let slime = arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::EventTouch, Priority::SameAsCharacters),
            );
            arena.record(Event::Blocked {
                actor: slime,
                direction: Direction::West,
                front: TileCoord::new(0, 0),
            });

            resolve(&map, &mut arena, &[]);

            assert_eq!(fired(&arena), vec![slime]);
            assert_eq!(gate(&arena), GateState::Cooling(29));
        }

        #[test]
        fn cooling_gate_suppresses_event_bumping_player() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            arena.spawn_player(TileCoord::new(0, 0));
            let slime = arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::EventTouch, Priority::SameAsCharacters),
            );
            cool_gate(&mut arena, 10);
            arena.record(Event::Blocked {
                actor: slime,
                direction: Direction::West,
                front: TileCoord::new(0, 0),
            });

            resolve(&map, &mut arena, &[]);

            assert!(fired(&arena).is_empty());
            assert_eq!(arena.running_event(), None);
            assert_eq!(gate(&arena), GateState::Cooling(9));
        }

        #[test]
        fn autorun_never_starts() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::Autorun, Priority::SameAsCharacters),
            );
            bump(&mut arena, player);
            resolve(&map, &mut arena, &[Command::Interact { actor: player }]);
            assert!(fired(&arena).is_empty());
        }
    }

    mod step_tests {
        use super::*;

        /// Player that just finished a step onto `tile`.
        fn arrived(arena: &mut Arena, tile: TileCoord) -> (Arena, ActorId) {
            let player = arena.spawn_player(tile);
            let mut current = arena.clone();
            current.get_mut(player).unwrap().movement.real.x -= 0.33;
            (current, player)
        }

        #[test]
        fn here_check_starts_below_touch_event() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            let (current, _) = arrived(&mut arena, TileCoord::new(1, 1));
            let plate = arena.spawn_event(
                TileCoord::new(1, 1),
                event(Trigger::PlayerTouch, Priority::BelowCharacters),
            );
            resolve_with(&map, &current, &mut arena, &[]);
            assert_eq!(fired(&arena), vec![plate]);
        }

        #[test]
        fn here_check_ignores_character_layer() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            let (current, _) = arrived(&mut arena, TileCoord::new(1, 1));
            arena.spawn_event(
                TileCoord::new(1, 1),
                event(Trigger::PlayerTouch, Priority::SameAsCharacters),
            );
            resolve_with(&map, &current, &mut arena, &[]);
            assert!(fired(&arena).is_empty());
        }

        #[test]
        fn quadrant_step_completed_within_the_tick_counts() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(1, 1));
            let plate = arena.spawn_event(
                TileCoord::new(1, 1),
                event(Trigger::PlayerTouch, Priority::BelowCharacters),
            );
            arena.record(Event::Moved {
                actor: player,
                outcome: MoveOutcome::Straight(Direction::East),
            });
            resolve(&map, &mut arena, &[]);
            assert_eq!(fired(&arena), vec![plate]);
        }

        #[test]
        fn standing_still_checks_nothing() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            arena.spawn_player(TileCoord::new(1, 1));
            arena.spawn_event(
                TileCoord::new(1, 1),
                event(Trigger::PlayerTouch, Priority::BelowCharacters),
            );
            resolve(&map, &mut arena, &[]);
            assert!(fired(&arena).is_empty());
        }

        #[test]
        fn damage_floor_hurts_once_per_cooldown() {
            let map = TileGrid::from_ascii(".^.").unwrap();
            let mut arena = Arena::new();
            let (current, player) = arrived(&mut arena, TileCoord::new(1, 0));
            arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::PlayerTouch, Priority::BelowCharacters),
            );

            resolve_with(&map, &current, &mut arena, &[]);
            assert_eq!(
                arena.journal()[0],
                Event::FloorDamage {
                    actor: player,
                    tile: TileCoord::new(1, 0)
                }
            );
            // the damage armed the gate, so the touch event waits
            assert!(fired(&arena).is_empty());
            assert_eq!(gate(&arena), GateState::Cooling(29));

            let current = {
                let mut moving = arena.clone();
                moving.get_mut(player).unwrap().movement.real.x -= 0.33;
                moving
            };
            arena.clear_journal();
            resolve_with(&map, &current, &mut arena, &[]);
            assert!(arena.journal().is_empty());
        }

        #[test]
        fn vehicles_skip_floor_damage() {
            let map = TileGrid::from_ascii("^").unwrap();
            let mut arena = Arena::new();
            let (current, _) = arrived(&mut arena, TileCoord::new(0, 0));
            arena.player_mut().unwrap().as_player_mut().unwrap().vehicle = Some(VehicleKind::Boat);
            resolve_with(&map, &current, &mut arena, &[]);
            assert!(arena.journal().is_empty());
        }
    }

    mod confirm_tests {
        use super::*;

        #[test]
        fn confirm_starts_event_in_front_even_while_cooling() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            arena.get_mut(player).unwrap().movement.facing = Direction::East;
            let sign = arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::ActionButton, Priority::SameAsCharacters),
            );
            cool_gate(&mut arena, 10);

            resolve(&map, &mut arena, &[Command::Interact { actor: player }]);

            assert_eq!(fired(&arena), vec![sign]);
            assert_eq!(gate(&arena), GateState::Cooling(9));
        }

        #[test]
        fn confirm_prefers_event_underneath() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            arena.get_mut(player).unwrap().movement.facing = Direction::East;
            let chest = arena.spawn_event(
                TileCoord::new(0, 0),
                event(Trigger::ActionButton, Priority::BelowCharacters),
            );
            arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::ActionButton, Priority::SameAsCharacters),
            );

            resolve(&map, &mut arena, &[Command::Interact { actor: player }]);

            assert_eq!(fired(&arena), vec![chest]);
            assert_eq!(gate(&arena), GateState::Cooling(29));
        }

        #[test]
        fn confirm_ignored_while_moving() {
            let map = OpenField::new(3, 1);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            {
                let movement = &mut arena.get_mut(player).unwrap().movement;
                movement.facing = Direction::East;
                movement.real.x -= 0.33;
            }
            arena.spawn_event(
                TileCoord::new(1, 0),
                event(Trigger::ActionButton, Priority::SameAsCharacters),
            );
            resolve(&map, &mut arena, &[Command::Interact { actor: player }]);
            assert!(fired(&arena).is_empty());
        }
    }

    mod motion_tests {
        use super::*;

        #[test]
        fn render_catches_up_and_idles_count() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(1, 1));
            let statue = arena.spawn_event(
                TileCoord::new(0, 0),
                EventComponents {
                    move_type: MoveType::Fixed,
                    ..EventComponents::default()
                },
            );
            arena.get_mut(player).unwrap().movement.real.x -= 0.33;
            arena.get_mut(statue).unwrap().movement.wait_count = 2;

            for _ in 0..8 {
                resolve(&map, &mut arena, &[]);
            }

            let player = arena.get(player).unwrap();
            assert!(!player.movement.is_moving());
            let statue = arena.get(statue).unwrap();
            assert_eq!(statue.movement.stop_count, 8);
            assert_eq!(statue.movement.wait_count, 0);
        }

        #[test]
        fn followers_mirror_party_speed() {
            let map = OpenField::new(3, 3);
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(1, 1));
            let follower = arena.spawn_follower(TileCoord::new(1, 2), player);
            {
                let movement = &mut arena.get_mut(player).unwrap().movement;
                movement.dashing = true;
                movement.move_speed = 5;
            }
            resolve(&map, &mut arena, &[]);
            let follower = arena.get(follower).unwrap();
            assert!(follower.movement.dashing);
            assert_eq!(follower.movement.move_speed, 5);
        }
    }
}
