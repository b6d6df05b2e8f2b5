//! Test module for determinism and integration tests.
//!
//! These tests drive whole [`Simulation`](crate::simulation::Simulation)
//! ticks rather than single resolvers:
//! - **Integration tests**: walking, sliding, triggers, followers, scripting
//! - **Determinism tests**: same seed and inputs give the same arena
//! - **Property tests**: quadrant stepping and re-centering on random maps
//!
//! # Test Structure
//!
//! - `helpers.rs`: Simulation setup and input utilities
//! - `integration.rs`: End-to-end scenarios
//! - `determinism.rs`: Replay checks
//! - `properties.rs`: proptest suites

mod helpers;

// Re-export for convenience
pub use helpers::*;
