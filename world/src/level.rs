//! Level geometry assembled from [`LevelEntity`] descriptions.

use bounce_core::{
    Aabb, Goal, LevelEntity, ObstacleId, Platform, PlatformId, Rgb, Wall, WallId,
};
use glam::Vec2;
use thiserror::Error;

const CLASSIC_PLATFORMS: [Aabb; 11] = [
    Aabb::new(100.0, 550.0, 200.0, 20.0),
    Aabb::new(350.0, 500.0, 150.0, 20.0),
    Aabb::new(600.0, 400.0, 200.0, 20.0),
    Aabb::new(900.0, 350.0, 150.0, 20.0),
    Aabb::new(1250.0, 300.0, 250.0, 20.0),
    Aabb::new(1700.0, 450.0, 200.0, 20.0),
    Aabb::new(2100.0, 380.0, 200.0, 20.0),
    Aabb::new(2600.0, 550.0, 150.0, 20.0),
    Aabb::new(3100.0, 400.0, 200.0, 20.0),
    Aabb::new(3700.0, 350.0, 150.0, 20.0),
    Aabb::new(4200.0, 300.0, 200.0, 20.0),
];
const CLASSIC_FLOOR: Aabb = Aabb::new(0.0, 580.0, 9000.0, 20.0);
const CLASSIC_GOAL: Aabb = Aabb::new(4700.0, 250.0, 100.0, 20.0);
const CLASSIC_WALLS: [Aabb; 4] = [
    Aabb::new(600.0, 420.0, 20.0, 180.0),
    Aabb::new(1600.0, 450.0, 20.0, 200.0),
    Aabb::new(3100.0, 400.0, 20.0, 200.0),
    Aabb::new(3700.0, 350.0, 20.0, 200.0),
];
const CLASSIC_OBSTACLE_SIZE: f32 = 50.0;
const CLASSIC_OBSTACLE_Y: f32 = 530.0;
/// Starting x coordinate, left limit and right limit of each obstacle.
const CLASSIC_OBSTACLES: [(f32, f32, f32); 5] = [
    (800.0, 700.0, 1100.0),
    (1500.0, 1400.0, 1800.0),
    (2300.0, 2200.0, 2500.0),
    (3200.0, 3100.0, 3400.0),
    (4000.0, 3900.0, 4200.0),
];
const CLASSIC_COINS: [(f32, f32); 3] = [(500.0, 500.0), (1200.0, 400.0), (2000.0, 450.0)];

/// Starting configuration of a patrolling obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSeed {
    id: ObstacleId,
    bounds: Aabb,
    left_limit: f32,
    right_limit: f32,
    color: Rgb,
}

impl ObstacleSeed {
    /// Identifier assigned to the obstacle.
    #[must_use]
    pub const fn id(&self) -> ObstacleId {
        self.id
    }

    /// Rectangle occupied by the obstacle when the level starts.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Leftmost x coordinate of the patrol.
    #[must_use]
    pub const fn left_limit(&self) -> f32 {
        self.left_limit
    }

    /// Rightmost x coordinate of the patrol.
    #[must_use]
    pub const fn right_limit(&self) -> f32 {
        self.right_limit
    }

    /// Fill colour of the obstacle.
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }
}

/// Immutable description of a playable level.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    platforms: Vec<Platform>,
    walls: Vec<Wall>,
    obstacles: Vec<ObstacleSeed>,
    coin_spawns: Vec<Vec2>,
    goal: Goal,
}

impl Level {
    /// Builds the hand-authored level the game ships with.
    #[must_use]
    pub fn classic() -> Self {
        let mut level = Self::with_goal(Goal::new(CLASSIC_GOAL, Rgb::YELLOW));
        for bounds in CLASSIC_PLATFORMS {
            level.push_platform(bounds, Rgb::GREEN);
        }
        level.push_platform(CLASSIC_FLOOR, Rgb::GREEN);
        for bounds in CLASSIC_WALLS {
            level.push_wall(bounds, Rgb::BLUE);
        }
        for (x, left_limit, right_limit) in CLASSIC_OBSTACLES {
            let bounds = Aabb::new(
                x,
                CLASSIC_OBSTACLE_Y,
                CLASSIC_OBSTACLE_SIZE,
                CLASSIC_OBSTACLE_SIZE,
            );
            level.push_obstacle(bounds, left_limit, right_limit, Rgb::RED);
        }
        for (x, y) in CLASSIC_COINS {
            level.coin_spawns.push(Vec2::new(x, y));
        }
        level
    }

    /// Assembles and validates a level from entity descriptions.
    ///
    /// Entities keep their relative order within each kind, which is also the
    /// order collisions are resolved in.
    pub fn from_entities<I>(entities: I) -> Result<Self, LevelError>
    where
        I: IntoIterator<Item = LevelEntity>,
    {
        let mut goal = None;
        let mut platforms = Vec::new();
        let mut walls = Vec::new();
        let mut obstacles = Vec::new();
        let mut coin_spawns = Vec::new();

        for (index, entity) in entities.into_iter().enumerate() {
            match entity {
                LevelEntity::Platform { bounds, color } => {
                    ensure_positive(index, bounds)?;
                    platforms.push((bounds, color));
                }
                LevelEntity::Wall { bounds, color } => {
                    ensure_positive(index, bounds)?;
                    walls.push((bounds, color));
                }
                LevelEntity::Obstacle {
                    bounds,
                    left_limit,
                    right_limit,
                    color,
                } => {
                    ensure_positive(index, bounds)?;
                    let span = right_limit - left_limit;
                    if span.is_nan() || span <= bounds.width() {
                        return Err(LevelError::InvalidPatrol {
                            index,
                            left_limit,
                            right_limit,
                            width: bounds.width(),
                        });
                    }
                    if bounds.left() < left_limit || bounds.right() > right_limit {
                        return Err(LevelError::ObstacleOutsidePatrol {
                            index,
                            left: bounds.left(),
                            right: bounds.right(),
                            left_limit,
                            right_limit,
                        });
                    }
                    obstacles.push((bounds, left_limit, right_limit, color));
                }
                LevelEntity::Coin { x, y } => coin_spawns.push(Vec2::new(x, y)),
                LevelEntity::Goal { bounds, color } => {
                    ensure_positive(index, bounds)?;
                    if goal.replace(Goal::new(bounds, color)).is_some() {
                        return Err(LevelError::DuplicateGoal { index });
                    }
                }
            }
        }

        let mut level = Self::with_goal(goal.ok_or(LevelError::MissingGoal)?);
        for (bounds, color) in platforms {
            level.push_platform(bounds, color);
        }
        for (bounds, color) in walls {
            level.push_wall(bounds, color);
        }
        for (bounds, left_limit, right_limit, color) in obstacles {
            level.push_obstacle(bounds, left_limit, right_limit, color);
        }
        level.coin_spawns = coin_spawns;
        Ok(level)
    }

    /// Platforms in collision order; the floor is included.
    #[must_use]
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Walls in collision order.
    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Starting configuration of every obstacle.
    #[must_use]
    pub fn obstacles(&self) -> &[ObstacleSeed] {
        &self.obstacles
    }

    /// Default coin positions used to repopulate coins on reset.
    #[must_use]
    pub fn coin_spawns(&self) -> &[Vec2] {
        &self.coin_spawns
    }

    /// Region that completes the level.
    #[must_use]
    pub const fn goal(&self) -> Goal {
        self.goal
    }

    fn with_goal(goal: Goal) -> Self {
        Self {
            platforms: Vec::new(),
            walls: Vec::new(),
            obstacles: Vec::new(),
            coin_spawns: Vec::new(),
            goal,
        }
    }

    fn push_platform(&mut self, bounds: Aabb, color: Rgb) {
        let id = PlatformId::new(next_index(self.platforms.len()));
        self.platforms.push(Platform::new(id, bounds, color));
    }

    fn push_wall(&mut self, bounds: Aabb, color: Rgb) {
        let id = WallId::new(next_index(self.walls.len()));
        self.walls.push(Wall::new(id, bounds, color));
    }

    fn push_obstacle(&mut self, bounds: Aabb, left_limit: f32, right_limit: f32, color: Rgb) {
        let id = ObstacleId::new(next_index(self.obstacles.len()));
        self.obstacles.push(ObstacleSeed {
            id,
            bounds,
            left_limit,
            right_limit,
            color,
        });
    }
}

fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn ensure_positive(index: usize, bounds: Aabb) -> Result<(), LevelError> {
    if bounds.width() > 0.0 && bounds.height() > 0.0 {
        Ok(())
    } else {
        Err(LevelError::DegenerateBounds {
            index,
            width: bounds.width(),
            height: bounds.height(),
        })
    }
}

/// Reasons a set of entities cannot form a level.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LevelError {
    /// No goal entity was provided.
    #[error("level has no goal")]
    MissingGoal,
    /// More than one goal entity was provided.
    #[error("entity {index} declares a second goal")]
    DuplicateGoal {
        /// Position of the offending entity in the input.
        index: usize,
    },
    /// A rectangle has a zero, negative or non-finite dimension.
    #[error("entity {index} has a degenerate size {width}x{height}")]
    DegenerateBounds {
        /// Position of the offending entity in the input.
        index: usize,
        /// Width that failed validation.
        width: f32,
        /// Height that failed validation.
        height: f32,
    },
    /// An obstacle's patrol range cannot hold the obstacle.
    #[error(
        "obstacle at entity {index} patrols {left_limit}..{right_limit}, which cannot hold its width {width}"
    )]
    InvalidPatrol {
        /// Position of the offending entity in the input.
        index: usize,
        /// Left limit that failed validation.
        left_limit: f32,
        /// Right limit that failed validation.
        right_limit: f32,
        /// Width of the obstacle.
        width: f32,
    },
    /// An obstacle starts outside the range it patrols.
    #[error(
        "obstacle at entity {index} spans {left}..{right} but patrols {left_limit}..{right_limit}"
    )]
    ObstacleOutsidePatrol {
        /// Position of the offending entity in the input.
        index: usize,
        /// Left edge of the obstacle.
        left: f32,
        /// Right edge of the obstacle.
        right: f32,
        /// Left limit of the patrol.
        left_limit: f32,
        /// Right limit of the patrol.
        right_limit: f32,
    },
}
