#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure movement system that resolves the player's motion for a single tick.
//!
//! Resolution happens in three phases, each a pure function that returns the
//! resolved state instead of mutating shared data: [`steer`] turns key state
//! into velocity and applies gravity, [`land_on_platforms`] bounces the ball
//! off anything it fell into, and [`resolve_walls`] pushes it back out of walls
//! it ran into sideways.

use bounce_core::{
    Aabb, Command, Controls, Platform, PlatformId, PlayerMotion, PlayerSnapshot, Tuning, Wall,
    WallId,
};
use glam::Vec2;

/// Constants that shape the player's movement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    move_speed: f32,
    damping: f32,
    jump_velocity: f32,
    gravity: f32,
    restitution: f32,
}

impl Config {
    /// Extracts the movement constants from the world tuning.
    #[must_use]
    pub const fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            move_speed: tuning.move_speed,
            damping: tuning.damping,
            jump_velocity: tuning.jump_velocity,
            gravity: tuning.gravity,
            restitution: tuning.restitution,
        }
    }

    /// Fraction of vertical speed kept when bouncing off a platform.
    #[must_use]
    pub const fn restitution(&self) -> f32 {
        self.restitution
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

/// Pure system that emits one [`Command::MovePlayer`] per tick.
#[derive(Debug, Default)]
pub struct Movement {
    config: Config,
}

impl Movement {
    /// Creates a new movement system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Resolves the player's motion and queues the resulting command.
    pub fn handle(
        &self,
        controls: Controls,
        player: &PlayerSnapshot,
        platforms: &[Platform],
        walls: &[Wall],
        out: &mut Vec<Command>,
    ) {
        let motion = self.resolve(controls, player, platforms, walls);
        out.push(Command::MovePlayer { motion });
    }

    /// Runs every movement phase for a single tick.
    #[must_use]
    pub fn resolve(
        &self,
        controls: Controls,
        player: &PlayerSnapshot,
        platforms: &[Platform],
        walls: &[Wall],
    ) -> PlayerMotion {
        let steering = steer(player.velocity, player.on_ground, controls, &self.config);
        let position = player.position + steering.velocity;
        let landing = land_on_platforms(
            position,
            steering.velocity,
            player.radius,
            platforms,
            self.config.restitution,
        );
        let contact = resolve_walls(landing.position, landing.velocity, player.radius, walls);

        PlayerMotion {
            position: contact.position,
            velocity: contact.velocity,
            on_ground: steering.on_ground || landing.landed_on.is_some(),
            jumped: steering.jumped,
            landed_on: landing.landed_on,
            blocked_by: contact.blocked_by,
        }
    }
}

/// Velocity and grounding after input and gravity were applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Steering {
    /// Velocity the player will be translated by this tick.
    pub velocity: Vec2,
    /// On-ground flag after a possible jump.
    pub on_ground: bool,
    /// Whether a jump was started.
    pub jumped: bool,
}

/// Applies directional input, jumping and gravity to the player's velocity.
///
/// Left wins when both directions are held. Without directional input the
/// horizontal speed decays by the damping factor.
#[must_use]
pub fn steer(velocity: Vec2, on_ground: bool, controls: Controls, config: &Config) -> Steering {
    let mut velocity = velocity;
    velocity.x = if controls.left {
        -config.move_speed
    } else if controls.right {
        config.move_speed
    } else {
        velocity.x * config.damping
    };

    let jumped = controls.jump && on_ground;
    if jumped {
        velocity.y = config.jump_velocity;
    }
    velocity.y += config.gravity;

    Steering {
        velocity,
        on_ground: on_ground && !jumped,
        jumped,
    }
}

/// Player state after platform contacts were resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landing {
    /// Top-left corner of the player's bounding square.
    pub position: Vec2,
    /// Velocity after bouncing.
    pub velocity: Vec2,
    /// Platform that resolved a landing last, if any.
    pub landed_on: Option<PlatformId>,
}

/// Bounces the player off every platform it overlaps while falling.
///
/// Contacts are resolved one platform at a time in slice order, each against
/// the position left by the previous one.
#[must_use]
pub fn land_on_platforms(
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    platforms: &[Platform],
    restitution: f32,
) -> Landing {
    let mut landing = Landing {
        position,
        velocity,
        landed_on: None,
    };
    let diameter = radius * 2.0;

    for platform in platforms {
        let player = Aabb::enclosing_circle(landing.position, radius);
        if !player.intersects(&platform.bounds()) || landing.velocity.y <= 0.0 {
            continue;
        }
        landing.position.y = platform.bounds().top() - diameter;
        landing.velocity.y = -landing.velocity.y * restitution;
        landing.landed_on = Some(platform.id());
    }

    landing
}

/// Player state after wall contacts were resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallContact {
    /// Top-left corner of the player's bounding square.
    pub position: Vec2,
    /// Velocity with horizontal speed cleared on contact.
    pub velocity: Vec2,
    /// Wall that stopped the player last, if any.
    pub blocked_by: Option<WallId>,
}

/// Pushes the player out of any wall it ran into horizontally.
///
/// The approach side is inferred from the sign of the horizontal velocity. A
/// player with no horizontal speed is left where it is.
#[must_use]
pub fn resolve_walls(position: Vec2, velocity: Vec2, radius: f32, walls: &[Wall]) -> WallContact {
    let mut contact = WallContact {
        position,
        velocity,
        blocked_by: None,
    };

    for wall in walls {
        let player = Aabb::enclosing_circle(contact.position, radius);
        let bounds = wall.bounds();
        if !player.intersects(&bounds) {
            continue;
        }

        if contact.velocity.x > 0.0
            && player.right() > bounds.left()
            && player.left() < bounds.left()
        {
            contact.position.x = bounds.left() - player.width();
        } else if contact.velocity.x < 0.0
            && player.left() < bounds.right()
            && player.right() > bounds.right()
        {
            contact.position.x = bounds.right();
        } else {
            continue;
        }

        contact.velocity.x = 0.0;
        contact.blocked_by = Some(wall.id());
    }

    contact
}
