//! TOML level descriptions.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use bounce_core::{LevelEntity, Tuning};
use bounce_world::{Level, LevelError};
use serde::Deserialize;
use thiserror::Error;

const SUPPORTED_LEVEL_VERSION: u32 = 1;

/// Level geometry together with the physical constants it is played with.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LoadedLevel {
    /// Validated level geometry.
    pub(crate) level: Level,
    /// Tuning declared by the file, or the defaults.
    pub(crate) tuning: Tuning,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelFile {
    version: u32,
    #[serde(default)]
    tuning: Tuning,
    entities: Vec<LevelEntity>,
}

/// Reasons a level file cannot be turned into a level.
#[derive(Debug, Error)]
pub(crate) enum LevelFileError {
    /// The contents are not valid TOML or do not match the level schema.
    #[error("failed to parse level toml contents")]
    Parse(#[from] toml::de::Error),
    /// The file declares a schema version this build does not understand.
    #[error("unsupported level file version {found}; expected {SUPPORTED_LEVEL_VERSION}")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
    },
    /// The entities do not describe a playable level.
    #[error("level file describes an invalid level")]
    Invalid(#[from] LevelError),
    /// A tuning constant is outside the range the physics can work with.
    #[error("tuning value {field} = {value} is out of range")]
    InvalidTuning {
        /// Name of the offending constant.
        field: &'static str,
        /// Value found in the file.
        value: f32,
    },
}

/// Parses a level description from TOML text.
pub(crate) fn parse(contents: &str) -> Result<LoadedLevel, LevelFileError> {
    let file: LevelFile = toml::from_str(contents)?;
    if file.version != SUPPORTED_LEVEL_VERSION {
        return Err(LevelFileError::UnsupportedVersion {
            found: file.version,
        });
    }
    validate_tuning(&file.tuning)?;
    let level = Level::from_entities(file.entities)?;
    Ok(LoadedLevel {
        level,
        tuning: file.tuning,
    })
}

fn validate_tuning(tuning: &Tuning) -> Result<(), LevelFileError> {
    let checks = [
        ("gravity", tuning.gravity, tuning.gravity.is_finite()),
        ("jump_velocity", tuning.jump_velocity, tuning.jump_velocity.is_finite()),
        ("move_speed", tuning.move_speed, tuning.move_speed.is_finite()),
        ("damping", tuning.damping, (0.0..1.0).contains(&tuning.damping)),
        ("restitution", tuning.restitution, (0.0..=1.0).contains(&tuning.restitution)),
        ("player_radius", tuning.player_radius, positive(tuning.player_radius)),
        ("coin_radius", tuning.coin_radius, positive(tuning.coin_radius)),
        ("obstacle_speed", tuning.obstacle_speed, tuning.obstacle_speed.is_finite()),
        ("spawn.x", tuning.spawn.x, tuning.spawn.x.is_finite()),
        ("spawn.y", tuning.spawn.y, tuning.spawn.y.is_finite()),
        ("camera_lead", tuning.camera_lead, tuning.camera_lead.is_finite()),
        ("camera_height", tuning.camera_height, tuning.camera_height.is_finite()),
        ("view_size.x", tuning.view_size.x, positive(tuning.view_size.x)),
        ("view_size.y", tuning.view_size.y, positive(tuning.view_size.y)),
        ("victory_offset.x", tuning.victory_offset.x, tuning.victory_offset.x.is_finite()),
        ("victory_offset.y", tuning.victory_offset.y, tuning.victory_offset.y.is_finite()),
    ];

    match checks.into_iter().find(|(_, _, valid)| !valid) {
        Some((field, value, _)) => Err(LevelFileError::InvalidTuning { field, value }),
        None => Ok(()),
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Reads and parses the level file at the provided path.
pub(crate) fn load(path: &Path) -> Result<LoadedLevel> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file at {}", path.display()))?;
    let loaded =
        parse(&contents).with_context(|| format!("failed to load level from {}", path.display()))?;
    log::info!(
        "loaded level from {} ({} platforms, {} walls, {} obstacles, {} coins)",
        path.display(),
        loaded.level.platforms().len(),
        loaded.level.walls().len(),
        loaded.level.obstacles().len(),
        loaded.level.coin_spawns().len(),
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const CLASSIC: &str = include_str!("../../../levels/classic.toml");

    #[test]
    fn shipped_classic_level_matches_the_built_in_one() {
        let loaded = parse(CLASSIC).expect("classic level parses");
        assert_eq!(loaded.level, Level::classic());
        assert_eq!(loaded.tuning, Tuning::default());
    }

    #[test]
    fn tuning_table_overrides_individual_constants() {
        let contents = r#"
            version = 1

            [tuning]
            gravity = 0.25
            spawn = [100.0, 200.0]

            [[entities]]
            kind = "goal"
            bounds = { x = 10.0, y = 10.0, width = 10.0, height = 10.0 }
        "#;

        let loaded = parse(contents).expect("level parses");
        assert_eq!(loaded.tuning.gravity, 0.25);
        assert_eq!(loaded.tuning.spawn, Vec2::new(100.0, 200.0));
        assert_eq!(loaded.tuning.move_speed, Tuning::default().move_speed);
    }

    fn level_with_tuning(tuning: &str) -> String {
        format!(
            r#"
            version = 1

            [tuning]
            {tuning}

            [[entities]]
            kind = "goal"
            bounds = {{ x = 10.0, y = 10.0, width = 10.0, height = 10.0 }}
            "#
        )
    }

    #[test]
    fn damping_at_or_above_one_is_rejected() {
        for damping in ["1.0", "1.5", "-0.1"] {
            let error = parse(&level_with_tuning(&format!("damping = {damping}")))
                .expect_err("damping out of range");
            assert!(matches!(
                error,
                LevelFileError::InvalidTuning {
                    field: "damping",
                    ..
                }
            ));
        }
    }

    #[test]
    fn restitution_must_be_a_fraction() {
        let error =
            parse(&level_with_tuning("restitution = 1.2")).expect_err("restitution above one");
        assert!(matches!(
            error,
            LevelFileError::InvalidTuning {
                field: "restitution",
                ..
            }
        ));
        assert!(parse(&level_with_tuning("restitution = 1.0")).is_ok());
        assert!(parse(&level_with_tuning("restitution = 0.0")).is_ok());
    }

    #[test]
    fn radii_must_be_positive() {
        let error = parse(&level_with_tuning("player_radius = 0.0")).expect_err("zero radius");
        assert!(matches!(
            error,
            LevelFileError::InvalidTuning {
                field: "player_radius",
                ..
            }
        ));

        let error = parse(&level_with_tuning("coin_radius = -4.0")).expect_err("negative radius");
        assert!(matches!(
            error,
            LevelFileError::InvalidTuning {
                field: "coin_radius",
                ..
            }
        ));
    }

    #[test]
    fn infinite_constants_are_rejected() {
        let error = parse(&level_with_tuning("gravity = inf")).expect_err("infinite gravity");
        assert!(matches!(
            error,
            LevelFileError::InvalidTuning {
                field: "gravity",
                ..
            }
        ));

        let error =
            parse(&level_with_tuning("spawn = [0.0, nan]")).expect_err("spawn must be finite");
        assert!(matches!(
            error,
            LevelFileError::InvalidTuning {
                field: "spawn.y",
                ..
            }
        ));
    }

    #[test]
    fn obstacles_outside_their_patrol_are_rejected() {
        let contents = r#"
            version = 1

            [[entities]]
            kind = "goal"
            bounds = { x = 10.0, y = 10.0, width = 10.0, height = 10.0 }

            [[entities]]
            kind = "obstacle"
            bounds = { x = 0.0, y = 530.0, width = 50.0, height = 50.0 }
            left_limit = 700.0
            right_limit = 1100.0
        "#;

        assert!(matches!(
            parse(contents),
            Err(LevelFileError::Invalid(
                LevelError::ObstacleOutsidePatrol { index: 1, .. }
            ))
        ));
    }

    #[test]
    fn misspelt_entity_fields_are_parse_errors() {
        let contents = r#"
            version = 1

            [[entities]]
            kind = "goal"
            bounds = { x = 10.0, y = 10.0, width = 10.0, height = 10.0 }
            colour = [255, 0, 255]
        "#;

        assert!(matches!(parse(contents), Err(LevelFileError::Parse(_))));
    }

    #[test]
    fn omitted_colours_fall_back_to_the_kind_default() {
        let contents = r#"
            version = 1

            [[entities]]
            kind = "goal"
            bounds = { x = 10.0, y = 10.0, width = 10.0, height = 10.0 }

            [[entities]]
            kind = "wall"
            bounds = { x = 50.0, y = 0.0, width = 20.0, height = 100.0 }
        "#;

        let loaded = parse(contents).expect("level parses");
        assert_eq!(loaded.level.walls()[0].color(), bounce_core::Rgb::BLUE);
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let contents = r#"
            version = 3
            entities = []
        "#;

        let error = parse(contents).expect_err("version 3");
        assert!(matches!(
            error,
            LevelFileError::UnsupportedVersion { found: 3 }
        ));
    }

    #[test]
    fn levels_without_a_goal_are_rejected() {
        let contents = r#"
            version = 1

            [[entities]]
            kind = "coin"
            x = 5.0
            y = 5.0
        "#;

        let error = parse(contents).expect_err("missing goal");
        assert!(matches!(
            error,
            LevelFileError::Invalid(LevelError::MissingGoal)
        ));
    }

    #[test]
    fn unknown_entity_kinds_are_parse_errors() {
        let contents = r#"
            version = 1

            [[entities]]
            kind = "spring"
        "#;

        assert!(matches!(parse(contents), Err(LevelFileError::Parse(_))));
    }

    #[test]
    fn missing_files_carry_their_path() {
        let error = load(Path::new("levels/does-not-exist.toml")).expect_err("missing file");
        assert!(error.to_string().contains("does-not-exist.toml"));
    }
}
