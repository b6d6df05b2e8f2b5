//! Resolver module for the Controller-Resolver architecture.
//!
//! Resolvers process controller commands and mutate the next state. They are
//! the final phase of the tick, where proposed moves become actual ones.
//!
//! # Architecture
//!
//! Each resolver declares which command kinds it handles via
//! [`Resolver::handles()`]. During resolution:
//! 1. Commands are collected from all controllers and sorted
//! 2. Commands are routed to resolvers based on their kind
//! 3. Each resolver processes its commands and mutates `next`
//!
//! # Invariants
//!
//! - Controllers see `current`; movement resolution reads and writes `next`
//!   in command order, so each move sees the moves resolved before it
//! - Resolvers MUST be deterministic given the same inputs and command order
//! - Every resolver runs once per tick, even without commands
//!
//! # Available Resolvers
//!
//! - [`MovementResolver`]: steps, route commands and dash toggles
//! - [`TriggerResolver`]: render interpolation, tile triggers, floor damage,
//!   the confirm button and the trigger cooldown

mod movement;
mod trigger;

pub use movement::MovementResolver;
pub use trigger::TriggerResolver;

use tilegrid::PassabilityOracle;

use crate::arena::Arena;
use crate::config::MovementConfig;
use crate::output::{CommandKind, OutputEnvelope};

/// Shared, read-only inputs for one resolution pass.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// The host's map
    pub oracle: &'a dyn PassabilityOracle,
    /// Movement settings
    pub config: &'a MovementConfig,
}

impl std::fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveContext")
            .field("bounds", &self.oracle.bounds())
            .field("config", self.config)
            .finish()
    }
}

/// Resolver processes commands and mutates the next arena.
///
/// # Example
///
/// ```
/// use quadstep_core::arena::Arena;
/// use quadstep_core::output::{CommandKind, OutputEnvelope};
/// use quadstep_core::resolver::{ResolveContext, Resolver};
///
/// struct Noop;
///
/// impl Resolver for Noop {
///     fn handles(&self) -> &[CommandKind] {
///         &[CommandKind::Move]
///     }
///
///     fn resolve(
///         &self,
///         _commands: &[&OutputEnvelope],
///         _ctx: &ResolveContext<'_>,
///         _current: &Arena,
///         _next: &mut Arena,
///     ) {
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Returns the command kinds this resolver handles.
    fn handles(&self) -> &[CommandKind];

    /// Resolves commands into state mutations.
    ///
    /// # Arguments
    ///
    /// * `commands` - The commands routed to this resolver, in resolution order
    /// * `ctx` - Map and configuration
    /// * `current` - The state controllers saw this tick
    /// * `next` - The state being built (mutate this)
    fn resolve(
        &self,
        commands: &[&OutputEnvelope],
        ctx: &ResolveContext<'_>,
        current: &Arena,
        next: &mut Arena,
    );
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn Resolver>) {}
        fn _accepts_slice(_resolvers: &[Box<dyn Resolver>]) {}
    }

    #[test]
    fn handled_kinds_do_not_overlap() {
        let movement = MovementResolver::new();
        let trigger = TriggerResolver::new();
        for kind in movement.handles() {
            assert!(!trigger.handles().contains(kind));
        }
    }
}
