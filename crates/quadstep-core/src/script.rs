//! Scripting surface for map events and the host.
//!
//! Everything here acts on the player. Quadrant queries use the segment codes
//! of [`tilegrid::Segment`]: 0 for the tile center, 1 for the east or south
//! edge, 2 for the west or north edge.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use quadstep_core::simulation::Simulation;
//! use tilegrid::{OpenField, TileCoord};
//!
//! let mut sim = Simulation::new(1, Arc::new(OpenField::new(8, 8)));
//! sim.arena_mut().spawn_player(TileCoord::new(3, 3));
//!
//! let script = sim.script();
//! assert!(script.pos(0, 0).unwrap());
//! assert!(script.x_pos(&[0, 1]).unwrap());
//! ```

use thiserror::Error;
use tilegrid::{Direction, TileCoord};
use tracing::debug;

use crate::entity::{Actor, ActorId, MoveRoute, MovementMode, RouteCursor, VehicleKind};
use crate::output::Event;
use crate::simulation::Simulation;
use crate::strategy::strategy_for;
use crate::world_view::WorldView;

/// Errors from scripting calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The arena has no player actor.
    #[error("no player actor on the map")]
    NoPlayer,
}

/// Scripting calls, borrowed from a [`Simulation`] between steps.
#[derive(Debug)]
pub struct ScriptApi<'a> {
    sim: &'a mut Simulation,
}

impl<'a> ScriptApi<'a> {
    /// Wraps a simulation.
    #[must_use]
    pub fn new(sim: &'a mut Simulation) -> Self {
        Self { sim }
    }

    fn player(&self) -> Result<&Actor, ScriptError> {
        self.sim.arena().player().ok_or(ScriptError::NoPlayer)
    }

    fn player_mut(&mut self) -> Result<&mut Actor, ScriptError> {
        self.sim.arena_mut().player_mut().ok_or(ScriptError::NoPlayer)
    }

    // -------------------------------------------------------------------------
    // Quadrant queries
    // -------------------------------------------------------------------------

    /// Whether the player's horizontal segment is any of `codes`.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn x_pos(&self, codes: &[u8]) -> Result<bool, ScriptError> {
        let (qx, _) = self.player()?.movement.position.quadrant.codes();
        Ok(codes.contains(&qx))
    }

    /// Whether the player's vertical segment is any of `codes`.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn y_pos(&self, codes: &[u8]) -> Result<bool, ScriptError> {
        let (_, qy) = self.player()?.movement.position.quadrant.codes();
        Ok(codes.contains(&qy))
    }

    /// Whether the player's quadrant is exactly `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn pos(&self, x: u8, y: u8) -> Result<bool, ScriptError> {
        Ok(self.player()?.movement.position.quadrant.codes() == (x, y))
    }

    // -------------------------------------------------------------------------
    // Movement
    // -------------------------------------------------------------------------

    /// Re-center the player on its tile, optionally facing itself first.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn center(&mut self, face: bool) -> Result<(), ScriptError> {
        let id = {
            let player = self.player_mut()?;
            player.movement.center(face);
            player.id()
        };
        self.sim.arena_mut().update_occupancy(id);
        Ok(())
    }

    /// Switch the player between whole-tile and quadrant movement.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn set_whole_tile(&mut self, on: bool) -> Result<(), ScriptError> {
        self.player_mut()?.movement.mode = if on {
            MovementMode::WholeTile
        } else {
            MovementMode::Quadrant
        };
        Ok(())
    }

    /// Give the player a move route. Empty routes are ignored.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn run_route(&mut self, route: MoveRoute) -> Result<(), ScriptError> {
        let player = self.player_mut()?;
        if route.commands.is_empty() {
            return Ok(());
        }
        player.movement.route = Some(RouteCursor::new(route));
        Ok(())
    }

    /// Place the player on the center of `tile`, with the party behind it.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn transfer(&mut self, tile: TileCoord, facing: Option<Direction>) -> Result<(), ScriptError> {
        let id = {
            let player = self.player_mut()?;
            player.movement.center(false);
            player.movement.warp(tile);
            if let Some(facing) = facing {
                player.movement.set_direction(facing);
            }
            player.id()
        };
        let facing = self.player()?.movement.facing;

        let arena = self.sim.arena_mut();
        let followers: Vec<ActorId> = arena
            .actors_sorted()
            .filter(|actor| actor.is_follower())
            .map(Actor::id)
            .collect();
        for follower in followers {
            if let Some(actor) = arena.get_mut(follower) {
                actor.movement.warp(tile);
                actor.movement.set_direction(facing);
            }
            arena.update_occupancy(follower);
        }
        arena.update_occupancy(id);
        arena.record(Event::Warped { actor: id, tile });
        debug!(actor = %id, %tile, "transfer");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Vehicles
    // -------------------------------------------------------------------------

    /// Board a vehicle.
    ///
    /// The airship is boarded in place; other vehicles are entered with a
    /// forced step forward. Movement stays whole-tile until
    /// [`leave_vehicle`](Self::leave_vehicle).
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn board_vehicle(&mut self, kind: VehicleKind) -> Result<(), ScriptError> {
        if kind == VehicleKind::Airship {
            self.center(false)?;
        } else {
            self.force_move_forward()?;
        }
        let player = self.player_mut()?;
        player.movement.mode = MovementMode::WholeTile;
        if let Some(components) = player.as_player_mut() {
            components.vehicle = Some(kind);
        }
        Ok(())
    }

    /// Leave the current vehicle and return to quadrant movement.
    ///
    /// Boats and ships are left with a forced step forward. Leaving the
    /// airship faces south in place.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn leave_vehicle(&mut self) -> Result<(), ScriptError> {
        let vehicle = {
            let player = self.player_mut()?;
            player.movement.mode = MovementMode::Quadrant;
            player
                .as_player_mut()
                .and_then(|components| components.vehicle.take())
        };
        match vehicle {
            Some(VehicleKind::Airship) => self.player_mut()?.movement.set_direction(Direction::South),
            Some(_) => self.force_move_forward()?,
            None => {}
        }
        Ok(())
    }

    /// Re-center, then take one whole-tile step forward ignoring collisions.
    ///
    /// The movement mode and the through flag are restored afterwards.
    ///
    /// # Errors
    ///
    /// [`ScriptError::NoPlayer`] without a player.
    pub fn force_move_forward(&mut self) -> Result<(), ScriptError> {
        self.center(false)?;
        let (arena, oracle) = self.sim.parts_mut();
        let mut actor = arena.player().cloned().ok_or(ScriptError::NoPlayer)?;
        let id = actor.id();

        let (mode, through) = (actor.movement.mode, actor.movement.through);
        actor.movement.mode = MovementMode::WholeTile;
        actor.movement.through = true;
        let outcome = {
            let view = WorldView::new(arena, oracle);
            let facing = actor.movement.facing;
            strategy_for(MovementMode::WholeTile).move_straight(&mut actor, facing, &view)
        };
        actor.movement.mode = mode;
        actor.movement.through = through;

        if let Some(slot) = arena.get_mut(id) {
            *slot = actor;
        }
        arena.update_occupancy(id);
        if outcome.is_success() {
            arena.record(Event::Moved { actor: id, outcome });
        }
        debug!(actor = %id, ?outcome, "forced step");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::RouteCommand;
    use std::sync::Arc;
    use tilegrid::{OpenField, Quadrant, TileGrid};

    fn sim_with_player(tile: TileCoord) -> Simulation {
        let mut sim = Simulation::new(3, Arc::new(OpenField::new(10, 10)));
        sim.arena_mut().spawn_player(tile);
        sim
    }

    fn set_quadrant(sim: &mut Simulation, qx: u8, qy: u8) {
        let player = sim.arena_mut().player_mut().unwrap();
        player.movement.position.quadrant = Quadrant::from_codes(qx, qy).unwrap();
        player.movement.snap_render();
    }

    mod query_tests {
        use super::*;

        #[test]
        fn x_and_y_membership() {
            let mut sim = sim_with_player(TileCoord::new(2, 2));
            set_quadrant(&mut sim, 1, 2);
            let script = sim.script();
            assert!(script.x_pos(&[1]).unwrap());
            assert!(script.x_pos(&[0, 1, 2]).unwrap());
            assert!(!script.x_pos(&[0, 2]).unwrap());
            assert!(script.y_pos(&[2]).unwrap());
            assert!(!script.y_pos(&[]).unwrap());
        }

        #[test]
        fn pos_compares_both_codes() {
            let mut sim = sim_with_player(TileCoord::new(2, 2));
            set_quadrant(&mut sim, 1, 2);
            let script = sim.script();
            assert!(script.pos(1, 2).unwrap());
            assert!(!script.pos(0, 0).unwrap());
            assert!(!script.pos(2, 1).unwrap());
        }

        #[test]
        fn no_player_is_an_error() {
            let mut sim = Simulation::new(3, Arc::new(OpenField::new(4, 4)));
            let mut script = sim.script();
            assert_eq!(script.x_pos(&[0]), Err(ScriptError::NoPlayer));
            assert_eq!(script.center(true), Err(ScriptError::NoPlayer));
            assert_eq!(
                ScriptError::NoPlayer.to_string(),
                "no player actor on the map"
            );
        }
    }

    mod movement_tests {
        use super::*;

        #[test]
        fn center_is_idempotent() {
            let mut sim = sim_with_player(TileCoord::new(4, 4));
            set_quadrant(&mut sim, 2, 1);
            sim.arena_mut().player_mut().unwrap().movement.diagonal = Some(Direction::SouthWest);

            sim.script().center(true).unwrap();
            let once = sim.arena().player().unwrap().movement.clone();
            sim.script().center(true).unwrap();
            let twice = sim.arena().player().unwrap().movement.clone();

            assert_eq!(once, twice);
            assert!(once.position.quadrant.is_center());
            assert_eq!(once.tile(), TileCoord::new(4, 4));
            assert_eq!(once.diagonal, None);
        }

        #[test]
        fn whole_tile_toggle() {
            let mut sim = sim_with_player(TileCoord::new(4, 4));
            sim.script().set_whole_tile(true).unwrap();
            assert_eq!(
                sim.arena().player().unwrap().movement.mode,
                MovementMode::WholeTile
            );
            sim.script().set_whole_tile(false).unwrap();
            assert_eq!(
                sim.arena().player().unwrap().movement.mode,
                MovementMode::Quadrant
            );
        }

        #[test]
        fn empty_route_is_ignored() {
            let mut sim = sim_with_player(TileCoord::new(4, 4));
            sim.script().run_route(MoveRoute::default()).unwrap();
            assert!(sim.arena().player().unwrap().movement.route.is_none());

            sim.script()
                .run_route(MoveRoute::new(vec![RouteCommand::StepForward]))
                .unwrap();
            assert!(sim.arena().player().unwrap().movement.route.is_some());
        }

        #[test]
        fn transfer_brings_the_party() {
            let mut sim = sim_with_player(TileCoord::new(1, 1));
            let player = sim.arena().player_id().unwrap();
            let follower = sim.arena_mut().spawn_follower(TileCoord::new(1, 2), player);
            set_quadrant(&mut sim, 1, 1);

            sim.script()
                .transfer(TileCoord::new(7, 3), Some(Direction::West))
                .unwrap();

            let arena = sim.arena();
            let moved = arena.get(player).unwrap();
            assert_eq!(moved.movement.tile(), TileCoord::new(7, 3));
            assert!(moved.movement.position.quadrant.is_center());
            assert_eq!(moved.movement.facing, Direction::West);
            assert!(!moved.movement.is_moving());
            assert_eq!(arena.get(follower).unwrap().movement.tile(), TileCoord::new(7, 3));
            assert_eq!(
                arena.journal(),
                &[Event::Warped {
                    actor: player,
                    tile: TileCoord::new(7, 3)
                }]
            );
        }
    }

    mod vehicle_tests {
        use super::*;

        #[test]
        fn boarding_a_boat_steps_forward_through_water() {
            let map = TileGrid::from_ascii(".#.").unwrap();
            let mut sim = Simulation::new(3, Arc::new(map));
            let player = sim.arena_mut().spawn_player(TileCoord::new(0, 0));
            sim.arena_mut().get_mut(player).unwrap().movement.facing = Direction::East;
            set_quadrant(&mut sim, 1, 0);

            sim.script().board_vehicle(VehicleKind::Boat).unwrap();

            let actor = sim.arena().get(player).unwrap();
            assert_eq!(actor.movement.tile(), TileCoord::new(1, 0));
            assert!(actor.movement.position.quadrant.is_center());
            assert_eq!(actor.movement.mode, MovementMode::WholeTile);
            assert!(!actor.movement.through);
            assert_eq!(actor.as_player().unwrap().vehicle, Some(VehicleKind::Boat));
        }

        #[test]
        fn airship_boards_in_place() {
            let mut sim = sim_with_player(TileCoord::new(5, 5));
            set_quadrant(&mut sim, 2, 2);
            sim.script().board_vehicle(VehicleKind::Airship).unwrap();

            let actor = sim.arena().player().unwrap();
            assert_eq!(actor.movement.tile(), TileCoord::new(5, 5));
            assert!(actor.movement.position.quadrant.is_center());
            assert_eq!(actor.movement.mode, MovementMode::WholeTile);
        }

        #[test]
        fn leaving_restores_quadrant_movement() {
            let mut sim = sim_with_player(TileCoord::new(5, 5));
            sim.arena_mut().player_mut().unwrap().movement.facing = Direction::North;
            sim.script().board_vehicle(VehicleKind::Ship).unwrap();
            assert_eq!(sim.arena().player().unwrap().movement.tile(), TileCoord::new(5, 4));

            sim.script().leave_vehicle().unwrap();

            let actor = sim.arena().player().unwrap();
            assert_eq!(actor.movement.tile(), TileCoord::new(5, 3));
            assert_eq!(actor.movement.mode, MovementMode::Quadrant);
            assert_eq!(actor.as_player().unwrap().vehicle, None);
        }

        #[test]
        fn leaving_airship_faces_south() {
            let mut sim = sim_with_player(TileCoord::new(5, 5));
            sim.arena_mut().player_mut().unwrap().movement.facing = Direction::East;
            sim.script().board_vehicle(VehicleKind::Airship).unwrap();
            sim.script().leave_vehicle().unwrap();

            let actor = sim.arena().player().unwrap();
            assert_eq!(actor.movement.tile(), TileCoord::new(5, 5));
            assert_eq!(actor.movement.facing, Direction::South);
        }

        #[test]
        fn forced_step_keeps_mode() {
            let mut sim = sim_with_player(TileCoord::new(5, 5));
            sim.arena_mut().player_mut().unwrap().movement.facing = Direction::West;
            sim.script().force_move_forward().unwrap();

            let actor = sim.arena().player().unwrap();
            assert_eq!(actor.movement.tile(), TileCoord::new(4, 5));
            assert_eq!(actor.movement.mode, MovementMode::Quadrant);
            assert!(matches!(sim.arena().journal(), [Event::Moved { .. }]));
        }
    }
}
