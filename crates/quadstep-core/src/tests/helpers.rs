//! Test helper functions for setting up simulations and driving input.

use std::sync::Arc;

use tilegrid::{Direction, OpenField, SubTilePosition, TileCoord, TileGrid};

use crate::arena::InputState;
use crate::entity::{ActorId, EventComponents, Priority, Trigger};
use crate::gate::GateState;
use crate::output::Event;
use crate::simulation::Simulation;

/// Upper bound on ticks any helper loop may take.
pub const TICK_LIMIT: u64 = 2_000;

// =============================================================================
// Scenario Setup
// =============================================================================

/// A simulation on an open field.
pub fn open_sim(seed: u64, width: u32, height: u32) -> Simulation {
    Simulation::new(seed, Arc::new(OpenField::new(width, height)))
}

/// A simulation on an ASCII map.
///
/// # Panics
///
/// Panics if the map text is malformed.
pub fn grid_sim(seed: u64, map: &str) -> Simulation {
    let grid = TileGrid::from_ascii(map).expect("test map should parse");
    Simulation::new(seed, Arc::new(grid))
}

/// Spawns an event with the given trigger and layer.
pub fn spawn_trigger(
    sim: &mut Simulation,
    tile: TileCoord,
    trigger: Trigger,
    priority: Priority,
) -> ActorId {
    sim.arena_mut().spawn_event(
        tile,
        EventComponents {
            trigger,
            priority,
            ..EventComponents::default()
        },
    )
}

// =============================================================================
// Input
// =============================================================================

/// Holds a direction, optionally dashing.
pub fn hold(sim: &mut Simulation, direction: Direction, dash: bool) {
    sim.set_input(InputState {
        direction: Some(direction),
        dash,
        confirm: false,
    });
}

/// Presses confirm with no direction held.
pub fn press_confirm(sim: &mut Simulation) {
    sim.set_input(InputState {
        confirm: true,
        ..InputState::default()
    });
}

/// Lets go of every button.
pub fn release(sim: &mut Simulation) {
    sim.set_input(InputState::default());
}

// =============================================================================
// Driving
// =============================================================================

/// Steps once and returns that tick's journal.
pub fn step_events(sim: &mut Simulation) -> Vec<Event> {
    sim.step();
    sim.arena().journal().to_vec()
}

/// Steps until `done` holds, collecting the journal along the way.
///
/// # Panics
///
/// Panics if `done` does not hold within [`TICK_LIMIT`] ticks.
pub fn run_until(sim: &mut Simulation, mut done: impl FnMut(&Simulation) -> bool) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..TICK_LIMIT {
        if done(sim) {
            return events;
        }
        events.extend(step_events(sim));
    }
    panic!("condition not reached within {TICK_LIMIT} ticks");
}

/// Walks the player `steps` quadrant steps, then releases and lets the
/// render position catch up.
pub fn walk(sim: &mut Simulation, direction: Direction, steps: u32) -> Vec<Event> {
    let player = player_id(sim);
    let start = sim.arena().get(player).map_or(0, |actor| actor.movement.steps);
    hold(sim, direction, false);
    let mut events = run_until(sim, |sim| steps_of(sim, player) >= start + steps);
    release(sim);
    events.extend(settle(sim, player));
    events
}

/// Steps until the actor stops moving.
pub fn settle(sim: &mut Simulation, id: ActorId) -> Vec<Event> {
    run_until(sim, |sim| {
        sim.arena()
            .get(id)
            .is_some_and(|actor| !actor.movement.is_moving())
    })
}

// =============================================================================
// Inspection
// =============================================================================

/// The player's ID.
///
/// # Panics
///
/// Panics if no player was spawned.
pub fn player_id(sim: &Simulation) -> ActorId {
    sim.arena().player_id().expect("a player should be spawned")
}

/// Logical position of an actor.
///
/// # Panics
///
/// Panics if the actor does not exist.
pub fn position(sim: &Simulation, id: ActorId) -> SubTilePosition {
    sim.arena().get(id).expect("actor should exist").movement.position
}

/// Successful steps an actor has taken.
pub fn steps_of(sim: &Simulation, id: ActorId) -> u32 {
    sim.arena().get(id).map_or(0, |actor| actor.movement.steps)
}

/// State of the player's trigger gate.
///
/// # Panics
///
/// Panics if no player was spawned.
pub fn gate_state(sim: &Simulation) -> GateState {
    sim.arena()
        .player()
        .and_then(|player| player.as_player())
        .expect("a player should be spawned")
        .gate
        .state()
}

/// Events started in a journal, in order.
pub fn fired(events: &[Event]) -> Vec<ActorId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::TriggerFired { event, .. } => Some(*event),
            _ => None,
        })
        .collect()
}
