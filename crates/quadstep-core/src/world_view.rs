//! `WorldView` provides read-only access to the arena plus the map.
//!
//! Controllers and movement strategies never touch the arena directly. They
//! receive a [`WorldView`] that answers:
//! - map questions through the host's [`PassabilityOracle`]
//! - actor questions (who stands where, who blocks whom) from the arena
//!
//! Every query uses whole tiles; sub-tile positions never reach the oracle.
//!
//! # Example
//!
//! ```
//! use quadstep_core::arena::Arena;
//! use quadstep_core::entity::EventComponents;
//! use quadstep_core::world_view::WorldView;
//! use tilegrid::{OpenField, TileCoord};
//!
//! let mut arena = Arena::new();
//! let player = arena.spawn_player(TileCoord::new(1, 1));
//! let chest = arena.spawn_event(TileCoord::new(2, 1), EventComponents::default());
//! let field = OpenField::new(5, 5);
//!
//! let view = WorldView::new(&arena, &field);
//! let mover = view.actor(player).unwrap();
//!
//! assert_eq!(view.events_at(TileCoord::new(2, 1))[0].id(), chest);
//! assert!(view.is_blocked_by_actors(TileCoord::new(2, 1), mover));
//! ```

use tilegrid::{Direction, PassabilityOracle, TileCoord};

use crate::arena::{Arena, InputState};
use crate::entity::{Actor, ActorId};

// =============================================================================
// WorldView
// =============================================================================

/// Read-only view of the arena and the map.
pub struct WorldView<'a> {
    arena: &'a Arena,
    oracle: &'a dyn PassabilityOracle,
}

impl std::fmt::Debug for WorldView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldView")
            .field("tick", &self.arena.current_tick())
            .field("actors", &self.arena.actor_count())
            .field("bounds", &self.oracle.bounds())
            .finish()
    }
}

impl<'a> WorldView<'a> {
    /// Creates a view over an arena and a map.
    #[must_use]
    pub fn new(arena: &'a Arena, oracle: &'a dyn PassabilityOracle) -> Self {
        Self { arena, oracle }
    }

    /// The arena being viewed.
    #[must_use]
    pub const fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    // -------------------------------------------------------------------------
    // Map queries
    // -------------------------------------------------------------------------

    /// Whether a tile lies on the map.
    #[must_use]
    pub fn is_valid(&self, tile: TileCoord) -> bool {
        self.oracle.is_valid(tile)
    }

    /// Whether an actor may leave `tile` toward `direction`.
    #[must_use]
    pub fn is_passable(&self, tile: TileCoord, direction: Direction) -> bool {
        self.oracle.is_passable(tile, direction)
    }

    /// Whether standing on `tile` deals floor damage.
    #[must_use]
    pub fn is_damage_floor(&self, tile: TileCoord) -> bool {
        self.oracle.is_damage_floor(tile)
    }

    // -------------------------------------------------------------------------
    // Actor queries
    // -------------------------------------------------------------------------

    /// Looks up an actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&'a Actor> {
        self.arena.get(id)
    }

    /// The player actor.
    #[must_use]
    pub fn player(&self) -> Option<&'a Actor> {
        self.arena.player()
    }

    /// Host input for this tick.
    #[must_use]
    pub const fn input(&self) -> InputState {
        self.arena.input()
    }

    /// Whether the host is running an event.
    #[must_use]
    pub const fn is_event_running(&self) -> bool {
        self.arena.running_event().is_some()
    }

    /// Events on a tile, sorted by ID.
    #[must_use]
    pub fn events_at(&self, tile: TileCoord) -> Vec<&'a Actor> {
        self.arena
            .occupancy()
            .actors_at(tile)
            .into_iter()
            .filter_map(|id| self.arena.get(id))
            .filter(|actor| actor.is_event())
            .collect()
    }

    /// Events on a tile that are not passing through, sorted by ID.
    #[must_use]
    pub fn events_at_nt(&self, tile: TileCoord) -> Vec<&'a Actor> {
        self.events_at(tile)
            .into_iter()
            .filter(|actor| !actor.movement.through)
            .collect()
    }

    /// Whether actors on `tile` stop `mover` from entering.
    ///
    /// Character-layer events block everyone. Character-layer events are in
    /// turn blocked by the party unless the player passes through. The mover
    /// never blocks itself.
    #[must_use]
    pub fn is_blocked_by_actors(&self, tile: TileCoord, mover: &Actor) -> bool {
        let by_event = self
            .events_at_nt(tile)
            .into_iter()
            .any(|event| event.id() != mover.id() && event.is_solid());
        if by_event {
            return true;
        }

        let mover_is_solid_event = mover
            .as_event()
            .is_some_and(|event| event.priority.is_normal());
        if !mover_is_solid_event {
            return false;
        }
        self.is_party_at(tile)
    }

    fn is_party_at(&self, tile: TileCoord) -> bool {
        let Some(player) = self.player() else {
            return false;
        };
        if player.movement.through {
            return false;
        }
        self.arena
            .occupancy()
            .actors_at(tile)
            .into_iter()
            .filter_map(|id| self.arena.get(id))
            .any(|actor| actor.is_player() || actor.is_follower())
    }
}

// =============================================================================
// Tests
// =============================================================================
