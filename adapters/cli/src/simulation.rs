//! Orchestrates the world and systems for every frame the backend renders.

use std::time::Duration;

use bounce_core::{Command, Controls, Event, Tuning};
use bounce_rendering::{CircleVisual, Color, FrameInput, Hud, RectVisual, Scene};
use bounce_system_analytics::{Analytics, SessionReport};
use bounce_system_movement::{self as movement, Movement};
use bounce_system_patrol::Patrol;
use bounce_system_progression::{self as progression, Progression};
use bounce_world::{self as world, query, Level, World, COIN_COLOR, PLAYER_COLOR};

use crate::clock::TickClock;

/// Owns the world and drives the pure systems in a fixed phase order.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    movement: Movement,
    patrol: Patrol,
    progression: Progression,
    analytics: Analytics,
    clock: TickClock,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation hosting the provided level.
    pub(crate) fn new(level: Level, tuning: Tuning) -> Self {
        let world = World::new(level, tuning);
        Self {
            movement: Movement::new(movement::Config::from_tuning(&tuning)),
            patrol: Patrol::new(),
            progression: Progression::new(progression::Config::from_tuning(&tuning)),
            analytics: Analytics::new(),
            clock: TickClock::default(),
            commands: Vec::new(),
            events: Vec::new(),
            world,
        }
    }

    /// Statistics gathered since the simulation started.
    pub(crate) fn report(&self) -> &SessionReport {
        self.analytics.report()
    }

    /// Handles one rendered frame: restart requests first, then fixed ticks.
    pub(crate) fn advance(&mut self, frame: Duration, input: FrameInput) {
        let controls = input.controls();
        self.handle_restart(controls);

        let ticks = self.clock.advance(frame);
        for _ in 0..ticks {
            if query::level_completed(&self.world) {
                break;
            }
            self.step(controls);
        }
    }

    fn handle_restart(&mut self, controls: Controls) {
        let completed = query::level_completed(&self.world);
        if controls.restart || (completed && controls.any_key) {
            log::info!("restart requested");
            self.commands.push(Command::Reset);
            self.flush();
        }
    }

    /// Runs a single simulation tick with the provided key state.
    pub(crate) fn step(&mut self, controls: Controls) {
        self.commands.push(Command::Tick);
        self.flush();

        let player = query::player(&self.world);
        self.movement.handle(
            controls,
            &player,
            query::platforms(&self.world),
            query::walls(&self.world),
            &mut self.commands,
        );
        self.flush();

        let obstacles = query::obstacles(&self.world);
        self.patrol
            .handle(&obstacles, query::walls(&self.world), &mut self.commands);
        self.flush();

        let obstacles = query::obstacles(&self.world);
        self.progression.check_hazards(
            &query::player(&self.world),
            &obstacles,
            &mut self.commands,
        );
        self.flush();

        self.progression.collect_coins(
            &query::player(&self.world),
            &query::coins(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.progression.check_goal(
            &query::player(&self.world),
            &query::coins(&self.world),
            &query::goal(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.progression
            .track_camera(&query::player(&self.world), &mut self.commands);
        self.flush();
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        for event in &self.events {
            log_event(event);
        }
        self.analytics.handle(&self.events);
        self.events.clear();
    }

    /// Builds the scene shown before the first frame.
    pub(crate) fn initial_scene(&self) -> Scene {
        let goal = query::goal(&self.world);
        let mut scene = Scene {
            camera_center: query::camera_center(&self.world),
            player: CircleVisual::new(
                query::player(&self.world).position,
                query::tuning(&self.world).player_radius,
                Color::from(PLAYER_COLOR),
            ),
            platforms: Vec::new(),
            walls: Vec::new(),
            obstacles: Vec::new(),
            coins: Vec::new(),
            goal: RectVisual::new(goal.bounds(), Color::from(goal.color())),
            hud: Hud::coin_counter(0),
            victory: None,
        };
        self.populate_scene(&mut scene);
        scene
    }

    /// Rewrites the scene from the current world state.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let player = query::player(&self.world);
        scene.camera_center = query::camera_center(&self.world);
        scene.player = CircleVisual::new(player.position, player.radius, Color::from(PLAYER_COLOR));

        scene.platforms.clear();
        scene.platforms.extend(
            query::platforms(&self.world)
                .iter()
                .map(|platform| RectVisual::new(platform.bounds(), Color::from(platform.color()))),
        );

        scene.walls.clear();
        scene.walls.extend(
            query::walls(&self.world)
                .iter()
                .map(|wall| RectVisual::new(wall.bounds(), Color::from(wall.color()))),
        );

        scene.obstacles.clear();
        scene.obstacles.extend(
            query::obstacles(&self.world)
                .iter()
                .map(|obstacle| RectVisual::new(obstacle.bounds, Color::from(obstacle.color))),
        );

        scene.coins.clear();
        scene.coins.extend(
            query::coins(&self.world)
                .iter()
                .map(|coin| CircleVisual::new(coin.position, coin.radius, Color::from(COIN_COLOR))),
        );

        let goal = query::goal(&self.world);
        scene.goal = RectVisual::new(goal.bounds(), Color::from(goal.color()));
        scene.hud = Hud::coin_counter(query::coin_count(&self.world));
        scene.victory = query::victory_anchor(&self.world);
    }
}

fn log_event(event: &Event) {
    match event {
        Event::CoinCollected { coin, total } => {
            log::info!("collected coin {} ({total} total)", coin.get());
        }
        Event::LevelCompleted { coins } => log::info!("level completed with {coins} coins"),
        Event::GameReset => log::info!("game reset"),
        Event::PlayerLanded {
            platform,
            rebound_speed,
        } => log::debug!(
            "landed on platform {} rebounding at {rebound_speed:.2}",
            platform.get()
        ),
        Event::PlayerJumped | Event::PlayerBlocked { .. } | Event::ObstacleReversed { .. } => {
            log::debug!("{event:?}");
        }
        Event::TimeAdvanced { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TICK;
    use bounce_core::PlayerMotion;
    use glam::Vec2;
    use std::{
        collections::hash_map::DefaultHasher,
        hash::{Hash, Hasher},
    };

    fn classic() -> Simulation {
        Simulation::new(Level::classic(), Tuning::default())
    }

    fn teleport(simulation: &mut Simulation, position: Vec2) {
        simulation.commands.push(Command::MovePlayer {
            motion: PlayerMotion {
                position,
                velocity: Vec2::ZERO,
                on_ground: false,
                jumped: false,
                landed_on: None,
                blocked_by: None,
            },
        });
        simulation.flush();
    }

    fn complete_level(simulation: &mut Simulation) {
        for spawn in query::coin_spawns(&simulation.world).to_vec() {
            teleport(simulation, spawn);
            simulation.step(Controls::default());
        }
        let goal = query::goal(&simulation.world).bounds();
        teleport(simulation, goal.origin() - Vec2::new(0.0, 1.0));
        simulation.step(Controls::default());
        assert!(query::level_completed(&simulation.world));
    }

    fn fingerprint(simulation: &Simulation) -> u64 {
        let player = query::player(&simulation.world);
        let mut hasher = DefaultHasher::new();
        player.position.x.to_bits().hash(&mut hasher);
        player.position.y.to_bits().hash(&mut hasher);
        player.velocity.x.to_bits().hash(&mut hasher);
        player.velocity.y.to_bits().hash(&mut hasher);
        for obstacle in query::obstacles(&simulation.world) {
            obstacle.bounds.left().to_bits().hash(&mut hasher);
            obstacle.velocity_x.to_bits().hash(&mut hasher);
        }
        query::coin_count(&simulation.world).hash(&mut hasher);
        simulation.report().hash(&mut hasher);
        hasher.finish()
    }

    fn scripted_run() -> u64 {
        let mut simulation = classic();
        let right = FrameInput {
            move_right: true,
            ..FrameInput::default()
        };
        let right_jump = FrameInput {
            jump: true,
            ..right
        };
        for frame in 0..600 {
            let input = match frame % 90 {
                0..=29 => FrameInput::default(),
                30..=59 => right,
                _ => right_jump,
            };
            simulation.advance(TICK, input);
        }
        fingerprint(&simulation)
    }

    #[test]
    fn scripted_runs_are_deterministic() {
        assert_eq!(scripted_run(), scripted_run());
    }

    #[test]
    fn frames_advance_the_world_by_whole_ticks() {
        let mut simulation = classic();
        simulation.advance(TICK * 3, FrameInput::default());
        assert_eq!(query::tick_index(&simulation.world), 3);
        assert_eq!(simulation.report().ticks, 3);
    }

    #[test]
    fn restart_key_resets_mid_run() {
        let mut simulation = classic();
        for _ in 0..30 {
            simulation.advance(TICK, FrameInput::default());
        }
        assert_ne!(
            query::player(&simulation.world).position,
            Vec2::new(400.0, 300.0)
        );

        let restart = FrameInput {
            restart: true,
            any_key: true,
            ..FrameInput::default()
        };
        simulation.advance(Duration::ZERO, restart);

        assert_eq!(
            query::player(&simulation.world).position,
            Vec2::new(400.0, 300.0)
        );
        assert_eq!(simulation.report().resets, 1);
    }

    #[test]
    fn completed_level_freezes_until_any_key() {
        let mut simulation = classic();
        complete_level(&mut simulation);
        let frozen_at = query::tick_index(&simulation.world);
        let position = query::player(&simulation.world).position;

        let holding = FrameInput {
            move_left: true,
            ..FrameInput::default()
        };
        simulation.advance(TICK * 4, holding);
        assert_eq!(query::tick_index(&simulation.world), frozen_at);
        assert_eq!(query::player(&simulation.world).position, position);

        let pressed = FrameInput {
            any_key: true,
            ..FrameInput::default()
        };
        simulation.advance(TICK, pressed);
        assert!(!query::level_completed(&simulation.world));
        assert_eq!(query::coins(&simulation.world).len(), 3);
        assert_eq!(simulation.report().completions, 1);
    }

    #[test]
    fn any_key_does_not_reset_while_playing() {
        let mut simulation = classic();
        simulation.advance(TICK, FrameInput::default());
        let pressed = FrameInput {
            any_key: true,
            ..FrameInput::default()
        };
        simulation.advance(Duration::ZERO, pressed);
        assert_eq!(simulation.report().resets, 0);
    }

    #[test]
    fn scene_mirrors_the_world() {
        let mut simulation = classic();
        complete_level(&mut simulation);

        let scene = simulation.initial_scene();
        assert_eq!(scene.platforms.len(), 12);
        assert_eq!(scene.walls.len(), 4);
        assert_eq!(scene.obstacles.len(), 5);
        assert!(scene.coins.is_empty());
        assert_eq!(scene.hud.text, "Coins: 3");
        assert_eq!(scene.victory, query::victory_anchor(&simulation.world));
        assert!(scene.victory.is_some());
        assert_eq!(scene.player.color, Color::from(PLAYER_COLOR));
    }
}
