//! Actor types for the Controller-Resolver architecture.
//!
//! - [`ActorId`]: Unique identifier for actors
//! - [`ActorKind`]: Classification used for controller bundle selection
//! - [`ActorInner`]: Type-safe storage for kind-specific components
//! - [`Actor`]: The complete actor container
//!
//! Every actor carries a [`MovementState`] regardless of kind; only the
//! trigger, leader and gate data differ between kinds.
//!
//! # Example
//!
//! ```
//! use quadstep_core::entity::{Actor, ActorId, ActorKind};
//! use tilegrid::TileCoord;
//!
//! let player = Actor::new_player(ActorId::new(0), TileCoord::new(3, 4));
//!
//! assert_eq!(player.kind(), ActorKind::Player);
//! assert_eq!(player.movement.tile(), TileCoord::new(3, 4));
//! ```

pub mod components;
pub mod route;

use std::fmt;

use serde::{Deserialize, Serialize};
use tilegrid::TileCoord;

pub use components::{
    CharacterSprite, EventComponents, EventFlags, FollowerComponents, MoveType, MovementMode,
    MovementState, PlayerComponents, Priority, Trigger, VehicleKind,
};
pub use route::{MoveRoute, RouteAction, RouteCommand, RouteCursor};

/// Unique identifier for an actor.
///
/// Actor IDs are ordered by their numeric value, which fixes the order in
/// which actors are visited every tick.
///
/// ```
/// use quadstep_core::entity::ActorId;
///
/// assert!(ActorId::new(1) < ActorId::new(2));
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates an `ActorId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Actor classification for controller bundle selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActorKind {
    /// The player character
    Player,
    /// A party member trailing the player
    Follower,
    /// A map event
    Event,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Follower => write!(f, "Follower"),
            Self::Event => write!(f, "Event"),
        }
    }
}

/// Kind-specific components.
///
/// The variant always matches the actor's [`ActorKind`]; [`Actor::new`]
/// derives the kind from it so the two cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorInner {
    /// Player components
    Player(PlayerComponents),
    /// Follower components
    Follower(FollowerComponents),
    /// Event components
    Event(EventComponents),
}

impl ActorInner {
    /// The kind matching this variant.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        match self {
            Self::Player(_) => ActorKind::Player,
            Self::Follower(_) => ActorKind::Follower,
            Self::Event(_) => ActorKind::Event,
        }
    }
}

/// A complete actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    kind: ActorKind,
    /// Movement state, shared by every kind
    pub movement: MovementState,
    /// Sheet slot used for drawing
    pub sprite: CharacterSprite,
    inner: ActorInner,
}

impl Actor {
    /// Creates an actor from a movement state and kind-specific components.
    #[must_use]
    pub fn new(id: ActorId, movement: MovementState, inner: ActorInner) -> Self {
        Self {
            id,
            kind: inner.kind(),
            movement,
            sprite: CharacterSprite::default(),
            inner,
        }
    }

    /// Creates a player centered on a tile.
    #[must_use]
    pub fn new_player(id: ActorId, tile: TileCoord) -> Self {
        Self::new(
            id,
            MovementState::at(tile, MovementMode::Quadrant),
            ActorInner::Player(PlayerComponents::default()),
        )
    }

    /// Creates a follower trailing `leader`.
    ///
    /// Followers walk whole tiles and pass through other actors.
    #[must_use]
    pub fn new_follower(id: ActorId, tile: TileCoord, leader: ActorId) -> Self {
        let mut movement = MovementState::at(tile, MovementMode::WholeTile);
        movement.through = true;
        Self::new(
            id,
            movement,
            ActorInner::Follower(FollowerComponents { leader }),
        )
    }

    /// Creates an event. Events walk whole tiles.
    #[must_use]
    pub fn new_event(id: ActorId, tile: TileCoord, components: EventComponents) -> Self {
        Self::new(
            id,
            MovementState::at(tile, MovementMode::WholeTile),
            ActorInner::Event(components),
        )
    }

    /// Returns the actor's identifier.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Returns the actor's kind.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Returns the kind-specific components.
    #[must_use]
    pub const fn inner(&self) -> &ActorInner {
        &self.inner
    }

    /// Returns the kind-specific components mutably.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut ActorInner {
        &mut self.inner
    }

    /// Returns `true` if this is the player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::Player)
    }

    /// Returns `true` if this is a follower.
    #[must_use]
    pub const fn is_follower(&self) -> bool {
        matches!(self.kind, ActorKind::Follower)
    }

    /// Returns `true` if this is an event.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(self.kind, ActorKind::Event)
    }

    /// Player components, if this is the player.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerComponents> {
        match &self.inner {
            ActorInner::Player(components) => Some(components),
            _ => None,
        }
    }

    /// Player components mutably, if this is the player.
    #[must_use]
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerComponents> {
        match &mut self.inner {
            ActorInner::Player(components) => Some(components),
            _ => None,
        }
    }

    /// Follower components, if this is a follower.
    #[must_use]
    pub const fn as_follower(&self) -> Option<&FollowerComponents> {
        match &self.inner {
            ActorInner::Follower(components) => Some(components),
            _ => None,
        }
    }

    /// Event components, if this is an event.
    #[must_use]
    pub const fn as_event(&self) -> Option<&EventComponents> {
        match &self.inner {
            ActorInner::Event(components) => Some(components),
            _ => None,
        }
    }

    /// Event components mutably, if this is an event.
    #[must_use]
    pub fn as_event_mut(&mut self) -> Option<&mut EventComponents> {
        match &mut self.inner {
            ActorInner::Event(components) => Some(components),
            _ => None,
        }
    }

    /// Whether this actor stops others from entering its tile.
    ///
    /// Through actors never block. Events block only on the character layer;
    /// the player and followers always occupy their tile.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        if self.movement.through {
            return false;
        }
        match &self.inner {
            ActorInner::Event(event) => event.priority.is_normal(),
            ActorInner::Player(_) | ActorInner::Follower(_) => true,
        }
    }
}
