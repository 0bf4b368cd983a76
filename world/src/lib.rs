#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bounce.

mod level;

pub use level::{Level, LevelError, ObstacleSeed};

use bounce_core::{
    Aabb, CoinId, Command, Event, ObstacleId, PatrolStep, PlayerMotion, Rgb, Tuning,
};
use glam::Vec2;

/// Colour of the player's ball.
pub const PLAYER_COLOR: Rgb = Rgb::RED;
/// Colour of every coin.
pub const COIN_COLOR: Rgb = Rgb::YELLOW;

#[derive(Debug)]
struct Player {
    position: Vec2,
    velocity: Vec2,
    on_ground: bool,
}

#[derive(Debug)]
struct Obstacle {
    id: ObstacleId,
    bounds: Aabb,
    velocity_x: f32,
    left_limit: f32,
    right_limit: f32,
    color: Rgb,
}

#[derive(Debug)]
struct Coin {
    id: CoinId,
    position: Vec2,
}

/// Represents the authoritative Bounce world state.
#[derive(Debug)]
pub struct World {
    tuning: Tuning,
    level: Level,
    player: Player,
    obstacles: Vec<Obstacle>,
    coins: Vec<Coin>,
    coin_count: u32,
    level_completed: bool,
    camera: Vec2,
    victory_anchor: Option<Vec2>,
    tick_index: u64,
}

impl World {
    /// Creates a world for the provided level, ready for the first tick.
    #[must_use]
    pub fn new(level: Level, tuning: Tuning) -> Self {
        let obstacles = level
            .obstacles()
            .iter()
            .map(|seed| Obstacle {
                id: seed.id(),
                bounds: seed.bounds(),
                velocity_x: tuning.obstacle_speed,
                left_limit: seed.left_limit(),
                right_limit: seed.right_limit(),
                color: seed.color(),
            })
            .collect();
        let mut world = Self {
            player: Player {
                position: tuning.spawn,
                velocity: Vec2::ZERO,
                on_ground: false,
            },
            camera: tuning.spawn,
            tuning,
            level,
            obstacles,
            coins: Vec::new(),
            coin_count: 0,
            level_completed: false,
            victory_anchor: None,
            tick_index: 0,
        };
        world.reset();
        world
    }

    /// Creates a world hosting the classic level with default tuning.
    #[must_use]
    pub fn classic() -> Self {
        Self::new(Level::classic(), Tuning::default())
    }

    fn reset(&mut self) {
        self.player.position = self.tuning.spawn;
        self.player.velocity = Vec2::ZERO;
        self.player.on_ground = false;
        self.level_completed = false;
        self.coin_count = 0;
        self.camera = self.tuning.spawn;
        self.victory_anchor = None;
        self.coins.clear();
        self.coins.extend(
            self.level
                .coin_spawns()
                .iter()
                .enumerate()
                .map(|(index, position)| Coin {
                    id: CoinId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                    position: *position,
                }),
        );
        log::debug!("world reset with {} coins", self.coins.len());
    }

    fn player_bounds(&self) -> Aabb {
        Aabb::enclosing_circle(self.player.position, self.tuning.player_radius)
    }

    fn move_player(&mut self, motion: PlayerMotion, out_events: &mut Vec<Event>) {
        self.player.position = motion.position;
        self.player.velocity = motion.velocity;
        self.player.on_ground = motion.on_ground;

        if motion.jumped {
            out_events.push(Event::PlayerJumped);
        }
        if let Some(platform) = motion.landed_on {
            out_events.push(Event::PlayerLanded {
                platform,
                rebound_speed: -motion.velocity.y,
            });
        }
        if let Some(wall) = motion.blocked_by {
            out_events.push(Event::PlayerBlocked { wall });
        }
    }

    fn patrol_obstacle(&mut self, id: ObstacleId, step: PatrolStep, out_events: &mut Vec<Event>) {
        let Some(obstacle) = self.obstacles.iter_mut().find(|obstacle| obstacle.id == id) else {
            return;
        };
        obstacle.bounds = obstacle
            .bounds
            .with_origin(Vec2::new(step.position_x, obstacle.bounds.top()));
        obstacle.velocity_x = step.velocity_x;
        out_events.extend(
            step.reversals
                .into_iter()
                .map(|cause| Event::ObstacleReversed { obstacle: id, cause }),
        );
    }

    fn collect_coins(&mut self, coins: Vec<CoinId>, out_events: &mut Vec<Event>) {
        for coin in coins {
            let Some(index) = self.coins.iter().position(|live| live.id == coin) else {
                continue;
            };
            let _ = self.coins.remove(index);
            self.coin_count = self.coin_count.saturating_add(1);
            out_events.push(Event::CoinCollected {
                coin,
                total: self.coin_count,
            });
        }
    }

    fn complete_level(&mut self, out_events: &mut Vec<Event>) {
        if !self.coins.is_empty() {
            log::debug!(
                "ignoring completion request with {} coins left",
                self.coins.len()
            );
            return;
        }
        if !self.player_bounds().intersects(&self.level.goal().bounds()) {
            return;
        }
        self.level_completed = true;
        self.victory_anchor = Some(self.camera + self.tuning.victory_offset);
        out_events.push(Event::LevelCompleted {
            coins: self.coin_count,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::classic()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the level is completed the simulation is frozen: every command other
/// than [`Command::Reset`] is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.level_completed && command != Command::Reset {
        return;
    }

    match command {
        Command::Reset => {
            world.reset();
            out_events.push(Event::GameReset);
        }
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::MovePlayer { motion } => world.move_player(motion, out_events),
        Command::PatrolObstacle { obstacle, step } => {
            world.patrol_obstacle(obstacle, step, out_events);
        }
        Command::CollectCoins { coins } => world.collect_coins(coins, out_events),
        Command::CompleteLevel => world.complete_level(out_events),
        Command::TrackCamera { center } => world.camera = center,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bounce_core::{
        CoinSnapshot, Goal, ObstacleSnapshot, Platform, PlayerSnapshot, Tuning, Wall,
    };
    use glam::Vec2;

    use super::World;

    /// Physical constants the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Captures the player's current kinematic state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            velocity: world.player.velocity,
            radius: world.tuning.player_radius,
            on_ground: world.player.on_ground,
        }
    }

    /// Platforms in collision order, floor included.
    #[must_use]
    pub fn platforms(world: &World) -> &[Platform] {
        world.level.platforms()
    }

    /// Walls in collision order.
    #[must_use]
    pub fn walls(world: &World) -> &[Wall] {
        world.level.walls()
    }

    /// Region that completes the level.
    #[must_use]
    pub fn goal(world: &World) -> Goal {
        world.level.goal()
    }

    /// Captures every obstacle in level order.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<ObstacleSnapshot> {
        world
            .obstacles
            .iter()
            .map(|obstacle| ObstacleSnapshot {
                id: obstacle.id,
                bounds: obstacle.bounds,
                velocity_x: obstacle.velocity_x,
                left_limit: obstacle.left_limit,
                right_limit: obstacle.right_limit,
                color: obstacle.color,
            })
            .collect()
    }

    /// Captures the coins that have not been collected yet, in spawn order.
    #[must_use]
    pub fn coins(world: &World) -> Vec<CoinSnapshot> {
        world
            .coins
            .iter()
            .map(|coin| CoinSnapshot {
                id: coin.id,
                position: coin.position,
                radius: world.tuning.coin_radius,
            })
            .collect()
    }

    /// Default coin positions restored by every reset.
    #[must_use]
    pub fn coin_spawns(world: &World) -> &[Vec2] {
        world.level.coin_spawns()
    }

    /// Number of coins collected since the last reset.
    #[must_use]
    pub fn coin_count(world: &World) -> u32 {
        world.coin_count
    }

    /// Reports whether the level has been completed.
    #[must_use]
    pub fn level_completed(world: &World) -> bool {
        world.level_completed
    }

    /// Center of the visible region in world units.
    #[must_use]
    pub fn camera_center(world: &World) -> Vec2 {
        world.camera
    }

    /// Top-left corner of the victory overlay while the level is completed.
    #[must_use]
    pub fn victory_anchor(world: &World) -> Option<Vec2> {
        world.victory_anchor
    }

    /// Number of ticks simulated since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounce_core::{ReversalCause, WallId};

    fn teleport(world: &mut World, position: Vec2, events: &mut Vec<Event>) {
        apply(
            world,
            Command::MovePlayer {
                motion: PlayerMotion {
                    position,
                    velocity: Vec2::ZERO,
                    on_ground: false,
                    jumped: false,
                    landed_on: None,
                    blocked_by: None,
                },
            },
            events,
        );
    }

    fn all_coins(world: &World) -> Vec<CoinId> {
        query::coins(world).iter().map(|coin| coin.id).collect()
    }

    fn snapshot(world: &World) -> String {
        format!(
            "{:?}|{:?}|{}|{}|{:?}|{:?}|{:?}",
            query::player(world),
            query::coins(world),
            query::coin_count(world),
            query::level_completed(world),
            query::camera_center(world),
            query::victory_anchor(world),
            query::obstacles(world),
        )
    }

    #[test]
    fn new_world_starts_at_spawn_with_every_coin() {
        let world = World::classic();
        let player = query::player(&world);
        assert_eq!(player.position, Vec2::new(400.0, 300.0));
        assert_eq!(player.velocity, Vec2::ZERO);
        assert!(!player.on_ground);
        assert_eq!(query::coins(&world).len(), 3);
        assert_eq!(query::camera_center(&world), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn reset_restores_spawn_state() {
        let mut world = World::classic();
        let mut events = Vec::new();
        teleport(&mut world, Vec2::new(500.0, 500.0), &mut events);
        apply(
            &mut world,
            Command::CollectCoins {
                coins: vec![CoinId::new(0)],
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::TrackCamera {
                center: Vec2::new(700.0, 300.0),
            },
            &mut events,
        );

        apply(&mut world, Command::Reset, &mut events);

        let player = query::player(&world);
        assert_eq!(player.position, Vec2::new(400.0, 300.0));
        assert_eq!(player.velocity, Vec2::ZERO);
        assert!(!player.on_ground);
        assert!(!query::level_completed(&world));
        assert_eq!(query::coin_count(&world), 0);
        assert_eq!(query::camera_center(&world), Vec2::new(400.0, 300.0));
        let positions: Vec<_> = query::coins(&world).iter().map(|c| c.position).collect();
        assert_eq!(positions, query::coin_spawns(&world).to_vec());
        assert_eq!(events.last(), Some(&Event::GameReset));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut world = World::classic();
        let mut events = Vec::new();
        teleport(&mut world, Vec2::new(1200.0, 400.0), &mut events);
        apply(&mut world, Command::Reset, &mut events);
        let once = snapshot(&world);
        apply(&mut world, Command::Reset, &mut events);
        assert_eq!(snapshot(&world), once);
    }

    #[test]
    fn reset_leaves_obstacles_where_they_are() {
        let mut world = World::classic();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PatrolObstacle {
                obstacle: ObstacleId::new(0),
                step: PatrolStep {
                    position_x: 850.0,
                    velocity_x: -2.0,
                    reversals: Vec::new(),
                },
            },
            &mut events,
        );
        apply(&mut world, Command::Reset, &mut events);
        let obstacle = query::obstacles(&world)[0];
        assert_eq!(obstacle.bounds.left(), 850.0);
        assert_eq!(obstacle.velocity_x, -2.0);
    }

    #[test]
    fn coins_are_collected_exactly_once() {
        let mut world = World::classic();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CollectCoins {
                coins: vec![CoinId::new(1), CoinId::new(1)],
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::CollectCoins {
                coins: vec![CoinId::new(1)],
            },
            &mut events,
        );

        assert_eq!(query::coin_count(&world), 1);
        let remaining: Vec<_> = all_coins(&world).iter().map(CoinId::get).collect();
        assert_eq!(remaining, vec![0, 2]);
        assert_eq!(
            events,
            vec![Event::CoinCollected {
                coin: CoinId::new(1),
                total: 1,
            }]
        );
    }

    #[test]
    fn completion_requires_every_coin() {
        let mut world = World::classic();
        let mut events = Vec::new();
        let goal = query::goal(&world).bounds();
        teleport(&mut world, goal.origin(), &mut events);

        apply(&mut world, Command::CompleteLevel, &mut events);
        assert!(!query::level_completed(&world));

        let coins = all_coins(&world);
        apply(&mut world, Command::CollectCoins { coins }, &mut events);
        apply(&mut world, Command::CompleteLevel, &mut events);
        assert!(query::level_completed(&world));
        assert_eq!(
            query::victory_anchor(&world),
            Some(Vec2::new(200.0, 150.0))
        );
        assert_eq!(events.last(), Some(&Event::LevelCompleted { coins: 3 }));
    }

    #[test]
    fn completion_requires_goal_contact() {
        let mut world = World::classic();
        let mut events = Vec::new();
        let coins = all_coins(&world);
        apply(&mut world, Command::CollectCoins { coins }, &mut events);
        apply(&mut world, Command::CompleteLevel, &mut events);
        assert!(!query::level_completed(&world));
    }

    #[test]
    fn completed_world_ignores_everything_but_reset() {
        let mut world = World::classic();
        let mut events = Vec::new();
        let coins = all_coins(&world);
        apply(&mut world, Command::CollectCoins { coins }, &mut events);
        let goal = query::goal(&world).bounds();
        teleport(&mut world, goal.origin(), &mut events);
        apply(&mut world, Command::CompleteLevel, &mut events);
        assert!(query::level_completed(&world));

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        teleport(&mut world, Vec2::ZERO, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::player(&world).position, goal.origin());

        apply(&mut world, Command::Reset, &mut events);
        assert!(!query::level_completed(&world));
        assert_eq!(query::victory_anchor(&world), None);
    }

    #[test]
    fn patrol_reversals_are_broadcast_in_order() {
        let mut world = World::classic();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PatrolObstacle {
                obstacle: ObstacleId::new(3),
                step: PatrolStep {
                    position_x: 3098.0,
                    velocity_x: -2.0,
                    reversals: vec![
                        ReversalCause::PatrolLimit,
                        ReversalCause::Wall {
                            wall: WallId::new(2),
                        },
                    ],
                },
            },
            &mut events,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            Event::ObstacleReversed {
                obstacle: ObstacleId::new(3),
                cause: ReversalCause::Wall {
                    wall: WallId::new(2)
                },
            }
        );
    }

    #[test]
    fn ticks_advance_the_clock() {
        let mut world = World::classic();
        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(query::tick_index(&world), 2);
        assert_eq!(events.last(), Some(&Event::TimeAdvanced { tick: 2 }));
    }
}
