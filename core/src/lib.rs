#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bounce engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable snapshots and
//! describe the mutations they want as [`Command`] values, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values that adapters log and analytics folds into session statistics.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Title used by the window that hosts the game.
pub const WINDOW_TITLE: &str = "Bounce Game";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Restores the player, flags, camera and coins to their spawn state.
    Reset,
    /// Advances the simulation clock by a single tick.
    Tick,
    /// Replaces the player's kinematic state with a resolved motion.
    MovePlayer {
        /// Motion produced by the movement system for this tick.
        motion: PlayerMotion,
    },
    /// Replaces an obstacle's horizontal state with a resolved patrol step.
    PatrolObstacle {
        /// Identifier of the obstacle that moved.
        obstacle: ObstacleId,
        /// Patrol resolution produced for this tick.
        step: PatrolStep,
    },
    /// Removes the listed coins from the live collection and credits the player.
    CollectCoins {
        /// Coins whose bounds intersected the player this tick.
        coins: Vec<CoinId>,
    },
    /// Marks the level as completed if no coins remain.
    CompleteLevel,
    /// Moves the camera to the provided center while the level is in play.
    TrackCamera {
        /// Camera center expressed in world units.
        center: Vec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just started.
        tick: u64,
    },
    /// The player left the ground under its own power.
    PlayerJumped,
    /// The player touched down on a platform while falling.
    PlayerLanded {
        /// Platform that resolved the landing last.
        platform: PlatformId,
        /// Upward speed the player rebounded with.
        rebound_speed: f32,
    },
    /// The player ran into the side of a wall and was pushed back out.
    PlayerBlocked {
        /// Wall that stopped horizontal movement last.
        wall: WallId,
    },
    /// An obstacle flipped the sign of its horizontal velocity.
    ObstacleReversed {
        /// Obstacle that turned around.
        obstacle: ObstacleId,
        /// What triggered the reversal.
        cause: ReversalCause,
    },
    /// A coin was picked up and removed from the live collection.
    CoinCollected {
        /// Coin that was collected.
        coin: CoinId,
        /// Coins collected since the last reset, including this one.
        total: u32,
    },
    /// The player reached the goal with every coin collected.
    LevelCompleted {
        /// Coins collected during the winning run.
        coins: u32,
    },
    /// The world returned to its spawn state.
    GameReset,
}

/// Reasons an obstacle reverses direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReversalCause {
    /// The obstacle reached one of its configured patrol limits.
    PatrolLimit,
    /// The obstacle's bounds overlapped a wall.
    Wall {
        /// Wall that the obstacle ran into.
        wall: WallId,
    },
}

/// Opaque RGB colour attached to level geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Pure red, used for the player and obstacles.
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    /// Pure green, used for platforms and the floor.
    pub const GREEN: Self = Self::from_rgb(0, 255, 0);
    /// Pure blue, used for walls.
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);
    /// Yellow, used for coins and the goal.
    pub const YELLOW: Self = Self::from_rgb(255, 255, 0);
    /// Cyan, used as the sky.
    pub const CYAN: Self = Self::from_rgb(0, 255, 255);
    /// White, used for the heads-up display.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);

    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::from_rgb(red, green, blue)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.red, color.green, color.blue]
    }
}

/// Axis-aligned rectangle anchored at its top-left corner, in world units.
///
/// World space grows to the right along x and downwards along y.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Aabb {
    /// Creates a rectangle from its top-left corner and dimensions.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square that encloses a circle whose bounding box starts at `top_left`.
    #[must_use]
    pub fn enclosing_circle(top_left: Vec2, radius: f32) -> Self {
        let diameter = radius * 2.0;
        Self::new(top_left.x, top_left.y, diameter, diameter)
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height of the rectangle.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Smallest x coordinate covered by the rectangle.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Smallest y coordinate covered by the rectangle.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Largest x coordinate covered by the rectangle.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Largest y coordinate covered by the rectangle.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Horizontal extent of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Reports whether the two rectangles share interior area.
    ///
    /// Rectangles that merely touch along an edge do not intersect, so a body
    /// resting exactly on top of a platform is not considered to overlap it.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        let left = self.left().max(other.left());
        let right = self.right().min(other.right());
        let top = self.top().max(other.top());
        let bottom = self.bottom().min(other.bottom());
        left < right && top < bottom
    }

    /// Returns a copy of the rectangle moved to a new top-left corner.
    #[must_use]
    pub fn with_origin(self, origin: Vec2) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }
}

/// Unique identifier assigned to a platform, in level order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformId(u32);

impl PlatformId {
    /// Creates a new platform identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a wall, in level order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WallId(u32);

impl WallId {
    /// Creates a new wall identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an obstacle, in level order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a coin, equal to the index of its default spawn position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoinId(u32);

impl CoinId {
    /// Creates a new coin identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

fn default_platform_color() -> Rgb {
    Rgb::GREEN
}

fn default_wall_color() -> Rgb {
    Rgb::BLUE
}

fn default_obstacle_color() -> Rgb {
    Rgb::RED
}

fn default_goal_color() -> Rgb {
    Rgb::YELLOW
}

/// Closed set of entity kinds a level is assembled from.
///
/// Behaviour differences between kinds are carried entirely by data, so the
/// world and systems match on the variant rather than dispatching dynamically.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum LevelEntity {
    /// Static surface the player can land on. The floor is a platform too.
    Platform {
        /// Rectangle occupied by the platform.
        bounds: Aabb,
        /// Fill colour of the platform.
        #[serde(default = "default_platform_color")]
        color: Rgb,
    },
    /// Static vertical barrier that stops horizontal movement.
    Wall {
        /// Rectangle occupied by the wall.
        bounds: Aabb,
        /// Fill colour of the wall.
        #[serde(default = "default_wall_color")]
        color: Rgb,
    },
    /// Rectangle patrolling horizontally between two limits.
    Obstacle {
        /// Rectangle occupied by the obstacle when the level starts.
        bounds: Aabb,
        /// Leftmost x coordinate the obstacle may reach before turning.
        left_limit: f32,
        /// Rightmost x coordinate the obstacle may reach before turning.
        right_limit: f32,
        /// Fill colour of the obstacle.
        #[serde(default = "default_obstacle_color")]
        color: Rgb,
    },
    /// Default spawn position of a collectible coin.
    Coin {
        /// Left edge of the coin's bounding square.
        x: f32,
        /// Top edge of the coin's bounding square.
        y: f32,
    },
    /// Region that completes the level once every coin is collected.
    Goal {
        /// Rectangle occupied by the goal.
        bounds: Aabb,
        /// Fill colour of the goal.
        #[serde(default = "default_goal_color")]
        color: Rgb,
    },
}

/// Physical constants that drive the simulation, expressed per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration added to the vertical velocity every tick.
    pub gravity: f32,
    /// Vertical velocity applied when jumping; negative values point up.
    pub jump_velocity: f32,
    /// Horizontal speed while a direction key is held.
    pub move_speed: f32,
    /// Multiplier applied to horizontal speed when no direction is held.
    pub damping: f32,
    /// Fraction of vertical speed kept when bouncing off a platform.
    pub restitution: f32,
    /// Radius of the player's ball.
    pub player_radius: f32,
    /// Radius of every coin.
    pub coin_radius: f32,
    /// Initial horizontal speed of every obstacle.
    pub obstacle_speed: f32,
    /// Top-left corner of the player's bounding square after a reset.
    pub spawn: Vec2,
    /// Horizontal distance the camera keeps ahead of the player.
    pub camera_lead: f32,
    /// Fixed vertical coordinate of the camera center.
    pub camera_height: f32,
    /// Dimensions of the visible region in world units.
    pub view_size: Vec2,
    /// Offset from the camera center to the victory overlay's top-left corner.
    pub victory_offset: Vec2,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            jump_velocity: -12.0,
            move_speed: 5.0,
            damping: 0.9,
            restitution: 0.7,
            player_radius: 20.0,
            coin_radius: 10.0,
            obstacle_speed: 2.0,
            spawn: Vec2::new(400.0, 300.0),
            camera_lead: 200.0,
            camera_height: 300.0,
            view_size: Vec2::new(800.0, 600.0),
            victory_offset: Vec2::new(-200.0, -150.0),
        }
    }
}

/// Key state sampled by adapters once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Controls {
    /// Whether the move-left key is held.
    pub left: bool,
    /// Whether the move-right key is held.
    pub right: bool,
    /// Whether the jump key is held.
    pub jump: bool,
    /// Whether the restart key was pressed this frame.
    pub restart: bool,
    /// Whether any key at all was pressed this frame.
    pub any_key: bool,
}

/// Static platform the player can land on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Platform {
    id: PlatformId,
    bounds: Aabb,
    color: Rgb,
}

impl Platform {
    /// Creates a new platform descriptor.
    #[must_use]
    pub const fn new(id: PlatformId, bounds: Aabb, color: Rgb) -> Self {
        Self { id, bounds, color }
    }

    /// Identifier of the platform.
    #[must_use]
    pub const fn id(&self) -> PlatformId {
        self.id
    }

    /// Rectangle occupied by the platform.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Fill colour of the platform.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }
}

/// Static wall that blocks horizontal movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    id: WallId,
    bounds: Aabb,
    color: Rgb,
}

impl Wall {
    /// Creates a new wall descriptor.
    #[must_use]
    pub const fn new(id: WallId, bounds: Aabb, color: Rgb) -> Self {
        Self { id, bounds, color }
    }

    /// Identifier of the wall.
    #[must_use]
    pub const fn id(&self) -> WallId {
        self.id
    }

    /// Rectangle occupied by the wall.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Fill colour of the wall.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }
}

/// Region the player must reach to finish the level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Goal {
    bounds: Aabb,
    color: Rgb,
}

impl Goal {
    /// Creates a new goal descriptor.
    #[must_use]
    pub const fn new(bounds: Aabb, color: Rgb) -> Self {
        Self { bounds, color }
    }

    /// Rectangle occupied by the goal.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Fill colour of the goal.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Top-left corner of the player's bounding square.
    pub position: Vec2,
    /// Displacement applied per tick.
    pub velocity: Vec2,
    /// Radius of the player's ball.
    pub radius: f32,
    /// Whether the player rests on a platform and may jump.
    pub on_ground: bool,
}

impl PlayerSnapshot {
    /// Bounding square of the player's ball.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::enclosing_circle(self.position, self.radius)
    }
}

/// Player state resolved by the movement system for a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerMotion {
    /// Top-left corner of the player's bounding square after resolution.
    pub position: Vec2,
    /// Velocity after resolution.
    pub velocity: Vec2,
    /// On-ground flag after resolution.
    pub on_ground: bool,
    /// Whether a jump was started this tick.
    pub jumped: bool,
    /// Platform that resolved a landing last, if any.
    pub landed_on: Option<PlatformId>,
    /// Wall that stopped horizontal movement last, if any.
    pub blocked_by: Option<WallId>,
}

/// Immutable representation of a single obstacle's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    /// Identifier of the obstacle.
    pub id: ObstacleId,
    /// Rectangle currently occupied by the obstacle.
    pub bounds: Aabb,
    /// Signed horizontal displacement applied per tick.
    pub velocity_x: f32,
    /// Leftmost x coordinate of the patrol.
    pub left_limit: f32,
    /// Rightmost x coordinate of the patrol.
    pub right_limit: f32,
    /// Fill colour of the obstacle.
    pub color: Rgb,
}

/// Horizontal state of an obstacle resolved by the patrol system.
#[derive(Clone, Debug, PartialEq)]
pub struct PatrolStep {
    /// Left edge of the obstacle after advancing.
    pub position_x: f32,
    /// Velocity after every reversal was applied.
    pub velocity_x: f32,
    /// Reversals applied this tick, in the order they happened.
    pub reversals: Vec<ReversalCause>,
}

/// Immutable representation of a live coin used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoinSnapshot {
    /// Identifier of the coin.
    pub id: CoinId,
    /// Top-left corner of the coin's bounding square.
    pub position: Vec2,
    /// Radius of the coin.
    pub radius: f32,
}

impl CoinSnapshot {
    /// Bounding square of the coin.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::enclosing_circle(self.position, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::{Aabb, CoinId, PlayerSnapshot, Rgb, Tuning};
    use glam::Vec2;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn overlapping_rectangles_intersect() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let platform = Aabb::new(100.0, 550.0, 200.0, 20.0);
        let resting = Aabb::new(150.0, 510.0, 40.0, 40.0);
        assert!(!resting.intersects(&platform));

        let beside = Aabb::new(300.0, 550.0, 10.0, 10.0);
        assert!(!beside.intersects(&platform));
    }

    #[test]
    fn contained_rectangle_intersects() {
        let outer = Aabb::new(0.0, 0.0, 100.0, 100.0);
        let inner = Aabb::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.intersects(&inner));
    }

    #[test]
    fn circle_bounds_span_the_diameter() {
        let player = PlayerSnapshot {
            position: Vec2::new(400.0, 300.0),
            velocity: Vec2::ZERO,
            radius: 20.0,
            on_ground: false,
        };
        let bounds = player.bounds();
        assert_eq!(bounds.origin(), Vec2::new(400.0, 300.0));
        assert_eq!(bounds.right(), 440.0);
        assert_eq!(bounds.bottom(), 340.0);
    }

    #[test]
    fn default_tuning_matches_classic_feel() {
        let tuning = Tuning::default();
        assert!((tuning.restitution - 0.7).abs() < f32::EPSILON);
        assert!(tuning.damping < 1.0);
        assert!(tuning.jump_velocity < 0.0);
        assert_eq!(tuning.spawn, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn tuning_round_trips_through_bincode() {
        assert_round_trip(&Tuning::default());
    }

    #[test]
    fn aabb_round_trips_through_bincode() {
        assert_round_trip(&Aabb::new(4700.0, 250.0, 100.0, 20.0));
    }

    #[test]
    fn colour_round_trips_through_bincode() {
        assert_round_trip(&Rgb::YELLOW);
    }

    #[test]
    fn coin_identifier_exposes_its_index() {
        assert_eq!(CoinId::new(2).get(), 2);
    }
}
