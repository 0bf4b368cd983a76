#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure progression system covering hazards, pickups, the goal and the camera.
//!
//! Each phase reads fresh snapshots so that a reset triggered by a hazard is
//! visible to the pickup and goal checks that follow it in the same tick.

use bounce_core::{Command, CoinSnapshot, Goal, ObstacleSnapshot, PlayerSnapshot, Tuning};
use glam::Vec2;

/// Camera placement relative to the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    camera_lead: f32,
    camera_height: f32,
}

impl Config {
    /// Creates a configuration with an explicit camera lead and height.
    #[must_use]
    pub const fn new(camera_lead: f32, camera_height: f32) -> Self {
        Self {
            camera_lead,
            camera_height,
        }
    }

    /// Extracts the camera placement from the world tuning.
    #[must_use]
    pub const fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.camera_lead, tuning.camera_height)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

/// Pure system that turns player contacts into progression commands.
#[derive(Debug, Default)]
pub struct Progression {
    config: Config,
}

impl Progression {
    /// Creates a new progression system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Requests a reset when the player touches any obstacle.
    pub fn check_hazards(
        &self,
        player: &PlayerSnapshot,
        obstacles: &[ObstacleSnapshot],
        out: &mut Vec<Command>,
    ) {
        let bounds = player.bounds();
        if obstacles
            .iter()
            .any(|obstacle| bounds.intersects(&obstacle.bounds))
        {
            out.push(Command::Reset);
        }
    }

    /// Collects every live coin the player overlaps.
    pub fn collect_coins(
        &self,
        player: &PlayerSnapshot,
        coins: &[CoinSnapshot],
        out: &mut Vec<Command>,
    ) {
        let bounds = player.bounds();
        let touched: Vec<_> = coins
            .iter()
            .filter(|coin| bounds.intersects(&coin.bounds()))
            .map(|coin| coin.id)
            .collect();
        if !touched.is_empty() {
            out.push(Command::CollectCoins { coins: touched });
        }
    }

    /// Requests completion when the player stands in the goal with no coins left.
    pub fn check_goal(
        &self,
        player: &PlayerSnapshot,
        coins: &[CoinSnapshot],
        goal: &Goal,
        out: &mut Vec<Command>,
    ) {
        if coins.is_empty() && player.bounds().intersects(&goal.bounds()) {
            out.push(Command::CompleteLevel);
        }
    }

    /// Moves the camera ahead of the player at a fixed height.
    pub fn track_camera(&self, player: &PlayerSnapshot, out: &mut Vec<Command>) {
        out.push(Command::TrackCamera {
            center: self.camera_center(player),
        });
    }

    /// Camera center that keeps the player in view.
    #[must_use]
    pub fn camera_center(&self, player: &PlayerSnapshot) -> Vec2 {
        Vec2::new(
            player.position.x + self.config.camera_lead,
            self.config.camera_height,
        )
    }
}
