//! Controller system for the Controller-Resolver architecture.
//!
//! Controllers decide what an actor wants to do this tick. They read from an
//! immutable [`WorldView`] and emit [`Command`]s, which the resolution phase
//! validates against the map and applies.
//!
//! # Architecture
//!
//! Controllers follow a strict read-only paradigm:
//! - Controllers receive a [`WorldView`] over the frozen `current` arena
//! - Controllers emit [`Command`]s as proposals for state changes
//! - Controllers cannot mutate state
//! - Randomness comes from a generator seeded with the run's [`TraceId`]
//!
//! # Controller Registry
//!
//! The [`ControllerRegistry`] bundles controllers by [`ActorKind`], so each
//! actor runs exactly the controllers registered for its kind.
//!
//! # Example
//!
//! ```
//! use quadstep_core::controller::{
//!     Controller, ControllerContext, ControllerDeclaration, ControllerRegistry,
//! };
//! use quadstep_core::entity::ActorKind;
//! use quadstep_core::output::{Command, CommandKind, ControllerId, MoveAction};
//! use quadstep_core::world_view::WorldView;
//! use std::sync::Arc;
//!
//! struct Idle {
//!     declaration: ControllerDeclaration,
//! }
//!
//! impl Controller for Idle {
//!     fn declaration(&self) -> &ControllerDeclaration {
//!         &self.declaration
//!     }
//!
//!     fn run(&self, ctx: &ControllerContext, _view: &WorldView) -> Vec<Command> {
//!         vec![Command::Move { actor: ctx.actor, action: MoveAction::Rest }]
//!     }
//! }
//!
//! let mut registry = ControllerRegistry::new();
//! registry.register(
//!     ActorKind::Event,
//!     Arc::new(Idle {
//!         declaration: ControllerDeclaration {
//!             id: ControllerId::new("idle"),
//!             kinds: vec![ActorKind::Event],
//!             emits: vec![CommandKind::Move],
//!         },
//!     }),
//! );
//!
//! assert_eq!(registry.controllers_for(ActorKind::Event).len(), 1);
//! assert!(registry.controllers_for(ActorKind::Player).is_empty());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::entity::{ActorId, ActorKind};
use crate::output::{Command, CommandKind, ControllerId, TraceId};
use crate::world_view::WorldView;

// =============================================================================
// Controller Declaration
// =============================================================================

/// What a controller runs on and what it may emit.
#[derive(Debug, Clone)]
pub struct ControllerDeclaration {
    /// Unique identifier for this controller.
    pub id: ControllerId,
    /// Actor kinds this controller operates on.
    pub kinds: Vec<ActorKind>,
    /// Command kinds this controller may emit.
    pub emits: Vec<CommandKind>,
}

impl ControllerDeclaration {
    /// Checks if this controller operates on the given actor kind.
    #[must_use]
    pub fn supports_kind(&self, kind: ActorKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Checks if this controller emits the given command kind.
    #[must_use]
    pub fn emits_command(&self, kind: CommandKind) -> bool {
        self.emits.contains(&kind)
    }
}

// =============================================================================
// Controller Context
// =============================================================================

/// Contextual information passed to a controller during execution.
#[derive(Debug, Clone, Copy)]
pub struct ControllerContext {
    /// The actor this controller instance is operating on.
    pub actor: ActorId,
    /// The current simulation tick.
    pub tick: u64,
    /// Trace ID of this run; also the seed for any randomness.
    pub trace_id: TraceId,
}

// =============================================================================
// Controller Trait
// =============================================================================

/// Decides the commands for one actor.
///
/// # Implementation Guidelines
///
/// 1. **No side effects**: everything a controller wants changed goes out
///    as a [`Command`].
///
/// 2. **Determinism**: the same view and context produce the same commands.
///    Seed any RNG from [`ControllerContext::trace_id`].
///
/// 3. **Idle actors only**: a controller issues movement only to actors
///    whose render position has caught up with their logical position.
pub trait Controller: Send + Sync {
    /// Returns the controller's declaration.
    fn declaration(&self) -> &ControllerDeclaration;

    /// Executes the controller logic.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context containing the actor ID, tick, and trace ID
    /// * `view` - Immutable view of the world state
    ///
    /// # Returns
    ///
    /// The commands this actor issues this tick.
    fn run(&self, ctx: &ControllerContext, view: &WorldView) -> Vec<Command>;
}

// =============================================================================
// Controller Registry
// =============================================================================

/// Registry of controllers organized by actor kind.
#[derive(Default)]
pub struct ControllerRegistry {
    bundles: HashMap<ActorKind, Vec<Arc<dyn Controller>>>,
}

impl ControllerRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: HashMap::new(),
        }
    }

    /// Registers a controller for the given actor kind.
    ///
    /// Controllers run in registration order.
    ///
    /// # Arguments
    ///
    /// * `kind` - The actor kind to register the controller for
    /// * `controller` - The controller (wrapped in Arc for shared ownership)
    pub fn register(&mut self, kind: ActorKind, controller: Arc<dyn Controller>) {
        self.bundles.entry(kind).or_default().push(controller);
    }

    /// Returns the controllers registered for the given actor kind.
    #[must_use]
    pub fn controllers_for(&self, kind: ActorKind) -> &[Arc<dyn Controller>] {
        self.bundles.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Returns the total number of registrations.
    ///
    /// A controller registered for several kinds is counted once per kind.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.bundles.values().map(Vec::len).sum()
    }

    /// Returns true if the registry has no controllers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.values().all(Vec::is_empty)
    }

    /// Removes every controller.
    pub fn clear(&mut self) {
        self.bundles.clear();
    }

    /// Creates a registry with the standard bundles.
    ///
    /// - Player: route, input
    /// - Follower: follower
    /// - Event: route, wander, approach
    ///
    /// # Example
    ///
    /// ```
    /// use quadstep_core::controller::ControllerRegistry;
    /// use quadstep_core::entity::ActorKind;
    ///
    /// let registry = ControllerRegistry::default_bundles();
    /// assert_eq!(registry.controllers_for(ActorKind::Player).len(), 2);
    /// assert_eq!(registry.controllers_for(ActorKind::Follower).len(), 1);
    /// assert_eq!(registry.controllers_for(ActorKind::Event).len(), 3);
    /// ```
    #[must_use]
    pub fn default_bundles() -> Self {
        use crate::controllers::{
            ApproachController, FollowerController, InputController, RouteController,
            WanderController,
        };

        let mut registry = Self::new();
        let route: Arc<dyn Controller> = Arc::new(RouteController::new());

        registry.register(ActorKind::Player, Arc::clone(&route));
        registry.register(ActorKind::Player, Arc::new(InputController::new()));

        registry.register(ActorKind::Follower, Arc::new(FollowerController::new()));

        registry.register(ActorKind::Event, route);
        registry.register(ActorKind::Event, Arc::new(WanderController::new()));
        registry.register(ActorKind::Event, Arc::new(ApproachController::new()));

        registry
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("bundle_count", &self.bundles.len())
            .field("registration_count", &self.registration_count())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
