#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure patrol system that walks obstacles back and forth between their limits.

use bounce_core::{Command, ObstacleSnapshot, PatrolStep, ReversalCause, Wall};
use glam::Vec2;

/// Pure system that emits one [`Command::PatrolObstacle`] per obstacle and tick.
#[derive(Debug, Default)]
pub struct Patrol;

impl Patrol {
    /// Creates a new patrol system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Advances every obstacle in level order and queues the resulting commands.
    pub fn handle(&self, obstacles: &[ObstacleSnapshot], walls: &[Wall], out: &mut Vec<Command>) {
        out.extend(obstacles.iter().map(|obstacle| Command::PatrolObstacle {
            obstacle: obstacle.id,
            step: advance(obstacle, walls),
        }));
    }
}

/// Moves a single obstacle by its velocity and resolves reversals.
///
/// Reaching either patrol limit flips the velocity. Every wall that overlaps
/// the moved obstacle flips it once more, so a limit and a wall in the same
/// tick cancel each other out.
#[must_use]
pub fn advance(obstacle: &ObstacleSnapshot, walls: &[Wall]) -> PatrolStep {
    let position_x = obstacle.bounds.left() + obstacle.velocity_x;
    let bounds = obstacle
        .bounds
        .with_origin(Vec2::new(position_x, obstacle.bounds.top()));
    let mut velocity_x = obstacle.velocity_x;
    let mut reversals = Vec::new();

    if position_x <= obstacle.left_limit || bounds.right() >= obstacle.right_limit {
        velocity_x = -velocity_x;
        reversals.push(ReversalCause::PatrolLimit);
    }

    for wall in walls {
        if bounds.intersects(&wall.bounds()) {
            velocity_x = -velocity_x;
            reversals.push(ReversalCause::Wall { wall: wall.id() });
        }
    }

    PatrolStep {
        position_x,
        velocity_x,
        reversals,
    }
}
