//! Component structs for actors.
//!
//! Every actor carries a [`MovementState`]. The kind-specific structs hold
//! what only one kind of actor needs: the trigger gate for the player, the
//! leader link for followers and the trigger setup for events.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tilegrid::{round2, Direction, SubTilePosition, TileCoord};

use super::route::RouteCursor;
use super::ActorId;
use crate::gate::TriggerGate;

/// Default move speed (RPG runtimes use 1..=6, 4 is "normal").
pub const DEFAULT_MOVE_SPEED: u8 = 4;

// =============================================================================
// Movement
// =============================================================================

/// Which movement strategy resolves an actor's moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementMode {
    /// Three steps per tile through the quadrant grid
    #[default]
    Quadrant,
    /// One step per tile
    WholeTile,
}

/// Per-actor movement state.
///
/// The logical position (`position`) is authoritative. `real` is the render
/// position: it trails the logical position after each step and is moved
/// toward it every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    /// Logical position
    pub position: SubTilePosition,
    /// Render position, in fractional tiles
    pub real: Vec2,
    /// Facing direction (always orthogonal)
    pub facing: Direction,
    /// Diagonal facing, set only by a successful diagonal move
    pub diagonal: Option<Direction>,
    /// Movement strategy selector
    pub mode: MovementMode,
    /// Last recorded diagonal slide pair `(horizontal, vertical)`
    pub diagonal_slide: Option<(Direction, Direction)>,
    /// Base move speed
    pub move_speed: u8,
    /// Dash flag, adds one to the speed
    pub dashing: bool,
    /// Facing never changes while set
    pub direction_fix: bool,
    /// Passes through everything while set
    pub through: bool,
    /// Successful steps taken
    pub steps: u32,
    /// Remaining jump ticks
    pub jump_count: u32,
    /// Ticks left on a route wait
    pub wait_count: u32,
    /// Consecutive idle ticks
    pub stop_count: u32,
    /// Active move route, if any
    pub route: Option<RouteCursor>,
}

impl MovementState {
    /// State centered on a tile, facing south.
    #[must_use]
    pub fn at(tile: TileCoord, mode: MovementMode) -> Self {
        let position = SubTilePosition::centered(tile);
        Self {
            position,
            real: position.to_vec2(),
            facing: Direction::South,
            diagonal: None,
            mode,
            diagonal_slide: None,
            move_speed: DEFAULT_MOVE_SPEED,
            dashing: false,
            direction_fix: false,
            through: false,
            steps: 0,
            jump_count: 0,
            wait_count: 0,
            stop_count: 0,
            route: None,
        }
    }

    /// Logical position as a vector.
    #[must_use]
    pub fn logical(&self) -> Vec2 {
        self.position.to_vec2()
    }

    /// Current tile.
    #[must_use]
    pub const fn tile(&self) -> TileCoord {
        self.position.tile
    }

    /// Whether a jump is in progress.
    #[must_use]
    pub const fn is_jumping(&self) -> bool {
        self.jump_count > 0
    }

    /// Whether the render position still trails the logical one.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.is_jumping() || self.real != self.logical()
    }

    /// Turn to face `direction`, clearing diagonal facing.
    pub fn set_direction(&mut self, direction: Direction) {
        self.diagonal = None;
        self.snap_direction(direction);
    }

    /// Turn to face `direction`, keeping diagonal facing.
    pub fn snap_direction(&mut self, direction: Direction) {
        if !self.direction_fix {
            self.facing = direction;
        }
        self.stop_count = 0;
    }

    /// Record a successful step.
    pub fn increase_steps(&mut self) {
        self.steps = self.steps.wrapping_add(1);
        self.stop_count = 0;
    }

    /// Put the render position one step behind the logical one.
    ///
    /// `distance` is the step length per axis (a third of a tile for
    /// quadrant steps, one tile for whole-tile steps).
    pub fn trail_render(&mut self, direction: Direction, distance: f32) {
        let (dx, dy) = direction.delta();
        #[allow(clippy::cast_precision_loss)]
        let back = Vec2::new(dx as f32, dy as f32) * distance;
        let logical = self.logical();
        self.real = Vec2::new(round2(logical.x - back.x), round2(logical.y - back.y));
    }

    /// Snap the render position onto the logical one.
    pub fn snap_render(&mut self) {
        self.real = self.logical();
        self.jump_count = 0;
    }

    /// Re-center within the current tile.
    ///
    /// Diagonal facing is always cleared. With `face` the actor also turns
    /// toward itself, which restarts the idle counter. Calling this twice is
    /// the same as calling it once.
    pub fn center(&mut self, face: bool) {
        self.diagonal = None;
        if face {
            self.stop_count = 0;
        }
        self.position = self.position.recentered();
        self.snap_render();
    }

    /// Move to the center of another tile.
    pub fn warp(&mut self, tile: TileCoord) {
        self.position = SubTilePosition::centered(tile);
        self.snap_render();
    }

    /// Speed exponent after dash and diagonal adjustments.
    ///
    /// `diagonal_factor` is a percentage applied while diagonal facing is set.
    #[must_use]
    pub fn real_move_speed(&self, diagonal_factor: u32) -> f32 {
        let base = f32::from(self.move_speed) + if self.dashing { 1.0 } else { 0.0 };
        if self.diagonal.is_some() {
            #[allow(clippy::cast_precision_loss)]
            let factor = diagonal_factor as f32 / 100.0;
            base * factor
        } else {
            base
        }
    }

    /// Render distance covered per tick at the given speed exponent.
    #[must_use]
    pub fn distance_per_frame(speed: f32) -> f32 {
        speed.exp2() / 256.0
    }

    /// Start a jump of `(dx, dy)` tiles.
    ///
    /// Facing follows the dominant axis; the landing spot is a tile center.
    pub fn jump(&mut self, dx: i32, dy: i32) {
        if dx.abs() > dy.abs() {
            self.set_direction(if dx < 0 { Direction::West } else { Direction::East });
        } else if dy != 0 {
            self.set_direction(if dy < 0 { Direction::North } else { Direction::South });
        } else {
            self.diagonal = None;
        }
        self.position = SubTilePosition::centered(self.position.tile.offset(dx, dy));

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let distance = f64::from(dx * dx + dy * dy).sqrt().round() as u32;
        let peak = (10 + distance).saturating_sub(u32::from(self.move_speed)).max(1);
        self.jump_count = peak * 2;
        self.stop_count = 0;
    }

    /// Advance the render position by one tick.
    ///
    /// Jumps blend toward the landing spot; ordinary moves advance by
    /// `distance` per axis and clamp onto the logical position.
    pub fn update_motion(&mut self, distance: f32) {
        let target = self.logical();
        if self.jump_count > 0 {
            self.jump_count -= 1;
            #[allow(clippy::cast_precision_loss)]
            let remaining = self.jump_count as f32;
            self.real = (self.real * remaining + target) / (remaining + 1.0);
            if self.jump_count == 0 {
                self.real = target;
            }
            return;
        }
        self.real.x = approach(self.real.x, target.x, distance);
        self.real.y = approach(self.real.y, target.y, distance);
    }
}

fn approach(from: f32, to: f32, distance: f32) -> f32 {
    if to < from {
        (from - distance).max(to)
    } else if to > from {
        (from + distance).min(to)
    } else {
        from
    }
}

// =============================================================================
// Events
// =============================================================================

/// What starts an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Trigger {
    /// Confirm button while facing or standing on the event
    #[default]
    ActionButton,
    /// The player touches the event
    PlayerTouch,
    /// The player or the event touches the other
    EventTouch,
    /// Starts on its own and blocks the player
    Autorun,
    /// Runs alongside the map
    Parallel,
}

impl Trigger {
    /// Whether the trigger is one of the tile-touch triggers.
    #[must_use]
    pub const fn is_touch(self) -> bool {
        matches!(self, Self::PlayerTouch | Self::EventTouch)
    }
}

/// Drawing layer of an event, which also decides collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    /// Under characters; walkable
    #[default]
    BelowCharacters,
    /// Same layer as characters; blocks movement
    SameAsCharacters,
    /// Over characters; walkable
    AboveCharacters,
}

impl Priority {
    /// Same-as-characters events collide and are checked in front of the
    /// player rather than underneath.
    #[must_use]
    pub const fn is_normal(self) -> bool {
        matches!(self, Self::SameAsCharacters)
    }
}

/// Autonomous movement pattern of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveType {
    /// Stands still unless given a route
    #[default]
    Fixed,
    /// Wanders randomly
    Random,
    /// Homes in on the player
    Approach,
}

bitflags! {
    /// Event metadata flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EventFlags: u8 {
        /// Firing does not start the trigger cooldown
        const NO_DELAY = 1 << 0;
    }
}

impl EventFlags {
    /// Flags declared in an event's note text (`<noDelay>`).
    #[must_use]
    pub fn from_note(note: &str) -> Self {
        let mut flags = Self::empty();
        if note.to_ascii_lowercase().contains("<nodelay>") {
            flags |= Self::NO_DELAY;
        }
        flags
    }
}

/// Components for map events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventComponents {
    /// Start condition
    pub trigger: Trigger,
    /// Drawing and collision layer
    pub priority: Priority,
    /// Metadata flags
    pub flags: EventFlags,
    /// Autonomous movement
    pub move_type: MoveType,
    /// 1 (lowest) to 5 (highest)
    pub move_frequency: u8,
}

impl Default for EventComponents {
    fn default() -> Self {
        Self {
            trigger: Trigger::ActionButton,
            priority: Priority::SameAsCharacters,
            flags: EventFlags::empty(),
            move_type: MoveType::Fixed,
            move_frequency: 3,
        }
    }
}

impl EventComponents {
    /// Idle ticks required before the next autonomous move.
    #[must_use]
    pub fn stop_threshold(&self) -> u32 {
        30 * (5 - u32::from(self.move_frequency.clamp(1, 5)))
    }
}

// =============================================================================
// Player and followers
// =============================================================================

/// Vehicle the player is riding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleKind {
    /// Small boat
    Boat,
    /// Ship
    Ship,
    /// Airship; boarded in place
    Airship,
}

/// Components for the player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerComponents {
    /// Tile trigger cooldown
    pub gate: TriggerGate,
    /// Vehicle being ridden
    pub vehicle: Option<VehicleKind>,
}

/// Components for party followers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerComponents {
    /// Actor this follower trails
    pub leader: ActorId,
}

// =============================================================================
// Sprites
// =============================================================================

/// Character sheet slot used to draw an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CharacterSprite {
    /// Slot on the sheet, 0..8 for regular sheets
    pub index: u8,
    /// Single-character sheet
    pub big: bool,
}
