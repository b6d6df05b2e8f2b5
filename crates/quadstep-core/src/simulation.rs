//! Simulation module with the 4-phase execution loop.
//!
//! The `Simulation` struct orchestrates the Controller-Resolver architecture
//! through a deterministic execution loop:
//!
//! 1. **SNAPSHOT**: Freeze current state (implicit - `current` is immutable during controllers)
//! 2. **CONTROL**: Run every controller of every actor, collecting commands
//! 3. **RESOLUTION**: Clone current to next, run resolvers with the commands
//! 4. **APPLY**: Swap buffers, advance tick
//!
//! # Determinism
//!
//! - Commands are sorted by (actor, controller, sequence) before resolution
//! - Actors are iterated in ID order (via `BTreeMap`)
//! - Trace IDs, and the random draws seeded from them, derive from the master seed
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use quadstep_core::arena::InputState;
//! use quadstep_core::simulation::Simulation;
//! use tilegrid::{Direction, OpenField, TileCoord};
//!
//! let mut sim = Simulation::new(42, Arc::new(OpenField::new(10, 10)));
//! let player = sim.arena_mut().spawn_player(TileCoord::new(5, 5));
//!
//! sim.set_input(InputState {
//!     direction: Some(Direction::South),
//!     ..InputState::default()
//! });
//! for _ in 0..60 {
//!     sim.step();
//! }
//!
//! assert_eq!(sim.tick(), 60);
//! assert!(sim.arena().get(player).unwrap().movement.tile().y > 5);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tilegrid::PassabilityOracle;
use tracing::{debug, warn};

use crate::arena::{Arena, InputState};
use crate::config::MovementConfig;
use crate::controller::{ControllerContext, ControllerRegistry};
use crate::output::{ControllerInstanceId, OutputEnvelope, TraceId};
use crate::resolver::{MovementResolver, ResolveContext, Resolver, TriggerResolver};
use crate::script::ScriptApi;
use crate::world_view::WorldView;

// =============================================================================
// Simulation
// =============================================================================

/// The main simulation orchestrator implementing the 4-phase execution loop.
///
/// `Simulation` manages:
/// - Current and next arena state (double-buffered)
/// - Controller registry for actor-to-controller mapping
/// - Resolvers for command processing
/// - The host's map and the movement settings
/// - Master seed for deterministic trace ID generation
///
/// # Double Buffering
///
/// - `current`: Read-only snapshot for controllers
/// - `next`: Mutable state that resolvers write to
///
/// After each tick, the buffers are swapped to avoid copying.
pub struct Simulation {
    /// Current arena state (read-only during the control phase).
    current: Arena,
    /// Next arena state (written to by resolvers).
    next: Arena,
    /// Controllers organized by actor kind.
    controllers: ControllerRegistry,
    /// Resolvers that process controller commands, in order.
    resolvers: Vec<Box<dyn Resolver>>,
    /// The host's map.
    oracle: Arc<dyn PassabilityOracle>,
    /// Movement settings.
    config: MovementConfig,
    /// Master seed for deterministic trace ID generation.
    master_seed: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("current", &self.current)
            .field("controllers", &self.controllers)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("bounds", &self.oracle.bounds())
            .field("config", &self.config)
            .field("master_seed", &self.master_seed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a new simulation on a map with the default movement settings.
    ///
    /// The simulation starts at tick 0 with an empty arena, the default
    /// controller bundles and the default resolvers (Movement, Trigger).
    ///
    /// # Arguments
    ///
    /// * `seed` - Master seed for deterministic trace ID generation
    /// * `oracle` - The map actors move on
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use quadstep_core::simulation::Simulation;
    /// use tilegrid::OpenField;
    ///
    /// let sim = Simulation::new(12345, Arc::new(OpenField::new(4, 4)));
    /// assert_eq!(sim.tick(), 0);
    /// assert_eq!(sim.seed(), 12345);
    /// ```
    #[must_use]
    pub fn new(seed: u64, oracle: Arc<dyn PassabilityOracle>) -> Self {
        Self::with_config(seed, oracle, MovementConfig::default())
    }

    /// Creates a new simulation with explicit movement settings.
    #[must_use]
    pub fn with_config(
        seed: u64,
        oracle: Arc<dyn PassabilityOracle>,
        config: MovementConfig,
    ) -> Self {
        Self {
            current: Arena::default(),
            next: Arena::default(),
            controllers: ControllerRegistry::default_bundles(),
            resolvers: vec![
                Box::new(MovementResolver::new()),
                Box::new(TriggerResolver::new()),
            ],
            oracle,
            config,
            master_seed: seed,
        }
    }

    /// Executes one simulation tick using the 4-phase execution loop.
    ///
    /// # Execution Phases
    ///
    /// 1. **SNAPSHOT**: The current arena is treated as immutable during this tick.
    ///
    /// 2. **CONTROL**: Every controller registered for an actor's kind runs
    ///    against a `WorldView` of the current arena and emits `Command`s
    ///    wrapped in `OutputEnvelope`s.
    ///
    /// 3. **RESOLUTION**: The next arena is cloned from current and its
    ///    journal cleared. Each resolver processes its relevant commands and
    ///    mutates the next arena.
    ///
    /// 4. **APPLY**: The current and next arenas are swapped and the tick
    ///    counter is advanced.
    pub fn step(&mut self) {
        let tick = self.current.current_tick();

        // PHASE 1: SNAPSHOT (implicit - current is immutable during controllers)

        // PHASE 2: CONTROL
        let commands = self.execute_controllers(tick);

        // PHASE 3: RESOLUTION
        self.next.clone_from(&self.current);
        self.next.clear_journal();
        let ctx = ResolveContext {
            oracle: self.oracle.as_ref(),
            config: &self.config,
        };
        for resolver in &self.resolvers {
            let relevant: Vec<_> = commands
                .iter()
                .filter(|envelope| resolver.handles().contains(&envelope.kind()))
                .collect();
            resolver.resolve(&relevant, &ctx, &self.current, &mut self.next);
        }

        // PHASE 4: APPLY
        std::mem::swap(&mut self.current, &mut self.next);
        self.current.advance_tick();
        debug!(
            tick,
            commands = commands.len(),
            events = self.current.journal().len(),
            "tick resolved"
        );
    }

    /// Runs `ticks` steps.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Runs every controller and collects their commands.
    ///
    /// A controller only runs on actor kinds its declaration lists, and
    /// commands of a kind it does not declare are dropped.
    ///
    /// # Returns
    ///
    /// Envelopes sorted by (actor, controller id, sequence).
    fn execute_controllers(&self, tick: u64) -> Vec<OutputEnvelope> {
        let view = WorldView::new(&self.current, self.oracle.as_ref());

        let mut all_commands: Vec<OutputEnvelope> = self
            .current
            .actors_sorted()
            .flat_map(|actor| {
                self.controllers
                    .controllers_for(actor.kind())
                    .iter()
                    .enumerate()
                    .filter(move |(_, controller)| {
                        controller.declaration().supports_kind(actor.kind())
                    })
                    .map(move |(idx, controller)| (actor.id(), idx, controller))
            })
            .flat_map(|(actor, idx, controller)| {
                let decl = controller.declaration();
                let trace_id = self.generate_trace_id(tick, actor.as_u64(), idx as u64);
                let ctx = ControllerContext {
                    actor,
                    tick,
                    trace_id,
                };

                // A controller emits a handful of commands per tick at most.
                #[allow(clippy::cast_possible_truncation)]
                controller
                    .run(&ctx, &view)
                    .into_iter()
                    .filter(|command| {
                        let declared = decl.emits_command(command.kind());
                        if !declared {
                            warn!(
                                controller = decl.id.as_str(),
                                kind = ?command.kind(),
                                "undeclared command dropped"
                            );
                        }
                        declared
                    })
                    .enumerate()
                    .map(|(seq, command)| {
                        OutputEnvelope::new(
                            command,
                            ControllerInstanceId::new(actor, decl.id.clone()),
                            trace_id,
                            tick,
                            seq as u32,
                        )
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        all_commands.sort_by(|a, b| {
            a.source()
                .actor()
                .cmp(&b.source().actor())
                .then_with(|| {
                    a.source()
                        .controller()
                        .as_str()
                        .cmp(b.source().controller().as_str())
                })
                .then_with(|| a.sequence().cmp(&b.sequence()))
        });

        all_commands
    }

    /// Hash of (seed, tick, actor, controller index).
    fn generate_trace_id(&self, tick: u64, actor: u64, controller: u64) -> TraceId {
        let mut hasher = DefaultHasher::new();
        self.master_seed.hash(&mut hasher);
        tick.hash(&mut hasher);
        actor.hash(&mut hasher);
        controller.hash(&mut hasher);
        TraceId::new(hasher.finish())
    }

    // -------------------------------------------------------------------------
    // Host surface
    // -------------------------------------------------------------------------

    /// Returns a read-only reference to the current arena state.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.current
    }

    /// Returns a mutable reference to the current arena.
    ///
    /// Use this for setup (spawning actors) between steps. Call
    /// [`Arena::update_occupancy`] after moving an actor by hand.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.current
    }

    /// The current arena together with the map, for scripted moves.
    pub(crate) fn parts_mut(&mut self) -> (&mut Arena, &dyn PassabilityOracle) {
        (&mut self.current, self.oracle.as_ref())
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.current.current_tick()
    }

    /// Returns the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.master_seed
    }

    /// Sets the host input used from the next step on.
    pub fn set_input(&mut self, input: InputState) {
        self.current.set_input(input);
    }

    /// Marks the running event as finished so triggers and input resume.
    pub fn finish_event(&mut self) {
        if let Some(event) = self.current.running_event() {
            debug!(%event, "event finished");
        }
        self.current.set_running_event(None);
    }

    /// The map actors move on.
    #[must_use]
    pub fn oracle(&self) -> &dyn PassabilityOracle {
        self.oracle.as_ref()
    }

    /// Replaces the map, for example after a transfer.
    pub fn set_oracle(&mut self, oracle: Arc<dyn PassabilityOracle>) {
        self.oracle = oracle;
    }

    /// The movement settings.
    #[must_use]
    pub const fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Replaces the movement settings.
    pub fn set_config(&mut self, config: MovementConfig) {
        self.config = config;
    }

    /// Scripting calls against the player.
    #[must_use]
    pub fn script(&mut self) -> ScriptApi<'_> {
        ScriptApi::new(self)
    }

    /// Returns a mutable reference to the controller registry.
    #[must_use]
    pub fn controllers_mut(&mut self) -> &mut ControllerRegistry {
        &mut self.controllers
    }

    /// Adds a custom resolver, run after the default ones.
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    /// Returns the number of resolvers in the simulation.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
