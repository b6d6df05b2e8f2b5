//! Arena module: the container for every actor on the map.
//!
//! The Arena provides:
//! - Actor storage with deterministic iteration order (`BTreeMap`)
//! - A tile occupancy index for collision and event lookup
//! - Actor lifecycle management (spawn/despawn)
//! - Per-tick host input, the running-event marker and the event journal
//!
//! # Occupancy Index Synchronization
//!
//! The occupancy index is NOT updated automatically when a position changes.
//! After moving an actor through `get_mut()`, call `update_occupancy(id)`.
//! Spawning and despawning keep the index in sync on their own.
//!
//! ```
//! # use quadstep_core::arena::Arena;
//! # use tilegrid::TileCoord;
//! # let mut arena = Arena::new();
//! # let player = arena.spawn_player(TileCoord::new(0, 0));
//! if let Some(actor) = arena.get_mut(player) {
//!     actor.movement.warp(TileCoord::new(4, 2));
//! }
//! // REQUIRED: sync the index after a position change
//! arena.update_occupancy(player);
//! assert_eq!(arena.occupancy().actors_at(TileCoord::new(4, 2)), vec![player]);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tilegrid::{Direction, TileCoord};

use crate::entity::{Actor, ActorId, ActorInner, EventComponents, MovementState};
use crate::output::Event;

// =============================================================================
// Occupancy Index
// =============================================================================

/// Tile of every actor, for "who stands here" queries.
///
/// Keyed by actor so lookups stay ordered; tile queries scan, which is cheap
/// at map-event counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyIndex {
    tiles: BTreeMap<ActorId, TileCoord>,
}

impl OccupancyIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or moves an actor.
    pub fn insert(&mut self, id: ActorId, tile: TileCoord) {
        self.tiles.insert(id, tile);
    }

    /// Removes an actor.
    pub fn remove(&mut self, id: ActorId) {
        self.tiles.remove(&id);
    }

    /// Tile of an actor, if indexed.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<TileCoord> {
        self.tiles.get(&id).copied()
    }

    /// Actors on a tile, sorted by ID.
    #[must_use]
    pub fn actors_at(&self, tile: TileCoord) -> Vec<ActorId> {
        self.tiles
            .iter()
            .filter(|(_, t)| **t == tile)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of indexed actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

// =============================================================================
// Host input
// =============================================================================

/// Input the host supplies for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    /// Held direction, if any
    pub direction: Option<Direction>,
    /// Dash button held
    pub dash: bool,
    /// Confirm button pressed
    pub confirm: bool,
}

// =============================================================================
// Arena
// =============================================================================

/// Container for every actor plus the per-tick shared state.
///
/// Actor IDs are assigned monotonically and iteration follows ID order, so a
/// tick always visits actors in the same sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    next_id: u64,
    actors: BTreeMap<ActorId, Actor>,
    occupancy: OccupancyIndex,
    tick: u64,
    player: Option<ActorId>,
    input: InputState,
    running_event: Option<ActorId>,
    journal: Vec<Event>,
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an actor and indexes its tile.
    ///
    /// The first player spawned becomes the arena's player.
    ///
    /// # Arguments
    ///
    /// * `movement` - Initial movement state
    /// * `inner` - Kind-specific components
    ///
    /// # Returns
    ///
    /// The ID assigned to the new actor.
    pub fn spawn(&mut self, movement: MovementState, inner: ActorInner) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        self.insert(Actor::new(id, movement, inner))
    }

    /// Spawns the player centered on a tile.
    pub fn spawn_player(&mut self, tile: TileCoord) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        self.insert(Actor::new_player(id, tile))
    }

    /// Spawns a follower trailing `leader`.
    pub fn spawn_follower(&mut self, tile: TileCoord, leader: ActorId) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        self.insert(Actor::new_follower(id, tile, leader))
    }

    /// Spawns an event.
    pub fn spawn_event(&mut self, tile: TileCoord, components: EventComponents) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        self.insert(Actor::new_event(id, tile, components))
    }

    fn insert(&mut self, actor: Actor) -> ActorId {
        let id = actor.id();
        if actor.is_player() && self.player.is_none() {
            self.player = Some(id);
        }
        self.occupancy.insert(id, actor.movement.tile());
        self.actors.insert(id, actor);
        id
    }

    /// Removes an actor.
    ///
    /// # Returns
    ///
    /// The removed actor, if it existed.
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        self.occupancy.remove(id);
        if self.player == Some(id) {
            self.player = None;
        }
        if self.running_event == Some(id) {
            self.running_event = None;
        }
        self.actors.remove(&id)
    }

    /// Returns an actor by ID.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Returns an actor by ID, mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Actor IDs in deterministic order.
    pub fn actor_ids_sorted(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    /// Actors in deterministic order.
    pub fn actors_sorted(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.values()
    }

    /// Actors in deterministic order, mutably.
    pub fn actors_sorted_mut(&mut self) -> impl Iterator<Item = &mut Actor> + '_ {
        self.actors.values_mut()
    }

    /// Number of actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Returns true if the arena holds no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// The occupancy index.
    #[must_use]
    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    /// Re-index an actor's tile after its position changed.
    pub fn update_occupancy(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get(&id) {
            self.occupancy.insert(id, actor.movement.tile());
        }
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// ID of the player, if one was spawned.
    #[must_use]
    pub const fn player_id(&self) -> Option<ActorId> {
        self.player
    }

    /// The player actor.
    #[must_use]
    pub fn player(&self) -> Option<&Actor> {
        self.player.and_then(|id| self.actors.get(&id))
    }

    /// The player actor, mutably.
    #[must_use]
    pub fn player_mut(&mut self) -> Option<&mut Actor> {
        self.player.and_then(|id| self.actors.get_mut(&id))
    }

    /// Input for the current tick.
    #[must_use]
    pub const fn input(&self) -> InputState {
        self.input
    }

    /// Replace the input for the next tick.
    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// Event the host is currently running, if any.
    #[must_use]
    pub const fn running_event(&self) -> Option<ActorId> {
        self.running_event
    }

    /// Mark an event as running, or clear the marker.
    pub fn set_running_event(&mut self, event: Option<ActorId>) {
        self.running_event = event;
    }

    /// Events recorded during the last tick.
    #[must_use]
    pub fn journal(&self) -> &[Event] {
        &self.journal
    }

    /// Append to the journal.
    pub fn record(&mut self, event: Event) {
        self.journal.push(event);
    }

    /// Drop the journal.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ActorKind, MovementMode, PlayerComponents};

    mod occupancy_tests {
        use super::*;

        #[test]
        fn actors_at_is_sorted() {
            let mut index = OccupancyIndex::new();
            let tile = TileCoord::new(2, 2);
            index.insert(ActorId::new(5), tile);
            index.insert(ActorId::new(1), tile);
            index.insert(ActorId::new(3), TileCoord::new(0, 0));
            assert_eq!(index.actors_at(tile), vec![ActorId::new(1), ActorId::new(5)]);
        }

        #[test]
        fn insert_moves_existing_entry() {
            let mut index = OccupancyIndex::new();
            index.insert(ActorId::new(1), TileCoord::new(0, 0));
            index.insert(ActorId::new(1), TileCoord::new(1, 0));
            assert_eq!(index.len(), 1);
            assert_eq!(index.get(ActorId::new(1)), Some(TileCoord::new(1, 0)));
        }

        #[test]
        fn remove_nonexistent_is_noop() {
            let mut index = OccupancyIndex::new();
            index.remove(ActorId::new(9));
            assert!(index.is_empty());
        }
    }

    mod arena_tests {
        use super::*;

        #[test]
        fn ids_are_monotonic() {
            let mut arena = Arena::new();
            let a = arena.spawn_player(TileCoord::new(0, 0));
            let b = arena.spawn_event(TileCoord::new(1, 0), EventComponents::default());
            assert!(a < b);
            assert_eq!(arena.actor_ids_sorted().collect::<Vec<_>>(), vec![a, b]);
        }

        #[test]
        fn first_player_is_tracked() {
            let mut arena = Arena::new();
            let first = arena.spawn_player(TileCoord::new(0, 0));
            let _second = arena.spawn(
                MovementState::at(TileCoord::new(1, 1), MovementMode::Quadrant),
                ActorInner::Player(PlayerComponents::default()),
            );
            assert_eq!(arena.player_id(), Some(first));
            assert_eq!(arena.player().map(Actor::kind), Some(ActorKind::Player));
        }

        #[test]
        fn despawn_clears_markers() {
            let mut arena = Arena::new();
            let player = arena.spawn_player(TileCoord::new(0, 0));
            let event = arena.spawn_event(TileCoord::new(1, 0), EventComponents::default());
            arena.set_running_event(Some(event));
            assert!(arena.despawn(event).is_some());
            assert_eq!(arena.running_event(), None);
            assert!(arena.despawn(player).is_some());
            assert_eq!(arena.player_id(), None);
            assert!(arena.occupancy().is_empty());
        }

        #[test]
        fn update_occupancy_follows_position() {
            let mut arena = Arena::new();
            let id = arena.spawn_player(TileCoord::new(0, 0));
            if let Some(actor) = arena.get_mut(id) {
                actor.movement.warp(TileCoord::new(3, 3));
            }
            assert_eq!(arena.occupancy().get(id), Some(TileCoord::new(0, 0)));
            arena.update_occupancy(id);
            assert_eq!(arena.occupancy().get(id), Some(TileCoord::new(3, 3)));
        }

        #[test]
        fn journal_records_and_clears() {
            let mut arena = Arena::new();
            arena.record(Event::RouteFinished { actor: ActorId::new(0) });
            assert_eq!(arena.journal().len(), 1);
            arena.clear_journal();
            assert!(arena.journal().is_empty());
        }

        #[test]
        fn arena_serializes() {
            let mut arena = Arena::new();
            arena.spawn_player(TileCoord::new(2, 2));
            let json = serde_json::to_string(&arena).unwrap();
            let back: Arena = serde_json::from_str(&json).unwrap();
            assert_eq!(back.actor_count(), 1);
            assert_eq!(back.player_id(), arena.player_id());
        }
    }
}
