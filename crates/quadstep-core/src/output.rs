//! Output system for the Controller-Resolver architecture.
//!
//! Controllers emit [`Command`]s: proposals for state changes that the
//! resolution phase validates and applies. Resolvers record what actually
//! happened as [`Event`]s in the arena journal, which the host reads after
//! each tick.
//!
//! Every command is wrapped in an [`OutputEnvelope`] carrying the emitting
//! controller instance, a trace ID, the tick and a sequence number. The
//! envelope metadata fixes the resolution order.
//!
//! # Example
//!
//! ```
//! use quadstep_core::output::{
//!     Command, ControllerId, ControllerInstanceId, MoveAction, OutputEnvelope, TraceId,
//! };
//! use quadstep_core::entity::ActorId;
//! use tilegrid::Direction;
//!
//! let command = Command::Move {
//!     actor: ActorId::new(0),
//!     action: MoveAction::Step(Direction::East),
//! };
//!
//! let envelope = OutputEnvelope::new(
//!     command,
//!     ControllerInstanceId::new(ActorId::new(0), ControllerId::new("input")),
//!     TraceId::new(42),
//!     100, // tick
//!     0,   // sequence
//! );
//!
//! assert_eq!(envelope.actor(), ActorId::new(0));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tilegrid::{Direction, TileCoord};

use crate::entity::{ActorId, RouteAction, Trigger};
use crate::strategy::MoveOutcome;

// =============================================================================
// Controller Identification Types
// =============================================================================

/// Unique identifier for a controller type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ControllerId(String);

impl ControllerId {
    /// Creates a new `ControllerId` from a string.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Returns the controller ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ControllerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifies a specific controller instance (actor + controller type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerInstanceId {
    actor: ActorId,
    controller: ControllerId,
}

impl ControllerInstanceId {
    /// Creates a new controller instance identifier.
    #[must_use]
    pub fn new(actor: ActorId, controller: ControllerId) -> Self {
        Self { actor, controller }
    }

    /// Returns the actor of this instance.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Returns the controller of this instance.
    #[must_use]
    pub fn controller(&self) -> &ControllerId {
        &self.controller
    }
}

impl fmt::Display for ControllerInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.controller, self.actor)
    }
}

/// Identifier grouping the outputs of one controller run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(u64);

impl TraceId {
    /// Creates a new trace ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this trace ID.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trace:{}", self.0)
    }
}

// =============================================================================
// Commands
// =============================================================================

/// A movement request for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveAction {
    /// Step in a direction; diagonals go through the diagonal resolver
    Step(Direction),
    /// Step only if the whole-tile check passes, otherwise do nothing
    RandomStep(Direction),
    /// Homing step toward an actor
    Approach(ActorId),
    /// Whole-tile chase step toward a leader
    Chase(ActorId),
    /// Stay put and restart the idle counter
    Rest,
}

/// Command outputs request state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Move an actor
    Move {
        /// Actor to move
        actor: ActorId,
        /// Requested movement
        action: MoveAction,
    },
    /// Run the current step of an actor's move route
    Route {
        /// Actor running the route
        actor: ActorId,
        /// Resolved route step
        action: RouteAction,
    },
    /// Toggle dashing
    SetDashing {
        /// Actor whose dash flag changes
        actor: ActorId,
        /// New dash flag
        dashing: bool,
    },
    /// Confirm button: check for action-button events
    Interact {
        /// Interacting actor
        actor: ActorId,
    },
}

/// Routing key for [`Command`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// [`Command::Move`]
    Move,
    /// [`Command::Route`]
    Route,
    /// [`Command::SetDashing`]
    Dash,
    /// [`Command::Interact`]
    Interact,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => write!(f, "Move"),
            Self::Route => write!(f, "Route"),
            Self::Dash => write!(f, "Dash"),
            Self::Interact => write!(f, "Interact"),
        }
    }
}

impl Command {
    /// Routing key of this command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Move { .. } => CommandKind::Move,
            Self::Route { .. } => CommandKind::Route,
            Self::SetDashing { .. } => CommandKind::Dash,
            Self::Interact { .. } => CommandKind::Interact,
        }
    }

    /// The actor this command targets.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        match self {
            Self::Move { actor, .. }
            | Self::Route { actor, .. }
            | Self::SetDashing { actor, .. }
            | Self::Interact { actor } => *actor,
        }
    }
}

// =============================================================================
// Journal Events
// =============================================================================

/// Something that happened during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// An actor took a step
    Moved {
        /// The actor
        actor: ActorId,
        /// How the move resolved
        outcome: MoveOutcome,
    },
    /// A move was blocked
    Blocked {
        /// The actor
        actor: ActorId,
        /// Requested direction
        direction: Direction,
        /// Tile that blocked the move
        front: TileCoord,
    },
    /// An actor jumped
    Jumped {
        /// The actor
        actor: ActorId,
        /// Landing tile
        tile: TileCoord,
    },
    /// An actor was placed on a tile without walking
    Warped {
        /// The actor
        actor: ActorId,
        /// Destination tile
        tile: TileCoord,
    },
    /// An event was started
    TriggerFired {
        /// The event that starts
        event: ActorId,
        /// Actor that caused it
        by: ActorId,
        /// Which trigger matched
        trigger: Trigger,
    },
    /// The player finished a step on a damage floor
    FloorDamage {
        /// The actor taking damage
        actor: ActorId,
        /// The damaging tile
        tile: TileCoord,
    },
    /// A one-shot move route ran out of commands
    RouteFinished {
        /// The actor
        actor: ActorId,
    },
}

impl Event {
    /// The actor the event is about.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        match self {
            Self::Moved { actor, .. }
            | Self::Blocked { actor, .. }
            | Self::Jumped { actor, .. }
            | Self::Warped { actor, .. }
            | Self::FloorDamage { actor, .. }
            | Self::RouteFinished { actor } => *actor,
            Self::TriggerFired { event, .. } => *event,
        }
    }
}

// =============================================================================
// Output Envelope
// =============================================================================

/// A command plus the metadata that orders and traces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEnvelope {
    command: Command,
    source: ControllerInstanceId,
    trace_id: TraceId,
    tick: u64,
    sequence: u32,
}

impl OutputEnvelope {
    /// Creates a new output envelope.
    ///
    /// # Arguments
    ///
    /// * `command` - The command to wrap
    /// * `source` - The controller instance that emitted it
    /// * `trace_id` - Trace ID of the controller run
    /// * `tick` - Current simulation tick
    /// * `sequence` - Position within the controller's outputs
    #[must_use]
    pub fn new(
        command: Command,
        source: ControllerInstanceId,
        trace_id: TraceId,
        tick: u64,
        sequence: u32,
    ) -> Self {
        Self {
            command,
            source,
            trace_id,
            tick,
            sequence,
        }
    }

    /// Returns the wrapped command.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.command
    }

    /// Returns the source controller instance.
    #[must_use]
    pub const fn source(&self) -> &ControllerInstanceId {
        &self.source
    }

    /// Returns the actor the command targets.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.command.actor()
    }

    /// Returns the trace ID.
    #[must_use]
    pub const fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Returns the tick when this command was emitted.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Returns the sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns the routing key of the wrapped command.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.command.kind()
    }
}

// =============================================================================
// Tests
// =============================================================================
