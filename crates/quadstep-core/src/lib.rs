//! # Quadstep Core
//!
//! Deterministic sub-tile movement simulation for tile-based RPG maps.
//!
//! Actors move in thirds of a tile through a 3×3 quadrant grid, slide along
//! walls when a diagonal is half blocked, and start map events through touch
//! and button triggers guarded by a cooldown gate. Map knowledge comes from a
//! [`tilegrid::PassabilityOracle`] supplied by the host.
//!
//! ## Architecture
//!
//! The tick follows the Controller-Resolver pattern:
//!
//! - **Actors**: the player, party followers and map events ([`entity`])
//! - **Controllers**: input, move routes, wandering, homing and following
//!   ([`controller`], [`controllers`])
//! - **Resolvers**: movement and triggers ([`resolver`])
//! - **Strategies**: quadrant and whole-tile stepping ([`strategy`])
//!
//! Around the tick sit the host-facing [`script`] commands, the cosmetic
//! [`sprite`] cell selection and the battle [`scope`] change rules.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use quadstep_core::{InputState, Simulation};
//! use tilegrid::{Direction, OpenField, Segment, TileCoord};
//!
//! let mut sim = Simulation::new(7, Arc::new(OpenField::new(10, 10)));
//! let player = sim.arena_mut().spawn_player(TileCoord::new(5, 5));
//!
//! sim.set_input(InputState {
//!     direction: Some(Direction::East),
//!     ..InputState::default()
//! });
//! sim.step();
//!
//! let position = sim.arena().get(player).unwrap().movement.position;
//! assert_eq!(position.quadrant.x, Segment::Positive);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arena;
pub mod config;
pub mod controller;
pub mod controllers;
pub mod entity;
pub mod gate;
pub mod output;
pub mod resolver;
pub mod scope;
pub mod script;
pub mod simulation;
pub mod sprite;
pub mod strategy;
pub mod world_view;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use arena::{Arena, InputState};
pub use config::{ConfigError, MovementConfig};
pub use entity::{Actor, ActorId, ActorKind, MoveRoute, MovementMode, RouteCommand};
pub use gate::TriggerGate;
pub use output::{Command, Event};
pub use script::{ScriptApi, ScriptError};
pub use simulation::Simulation;
pub use strategy::MoveOutcome;
