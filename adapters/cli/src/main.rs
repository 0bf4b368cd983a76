#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Bounce platformer.

mod clock;
mod level_file;
mod simulation;

use std::{cell::RefCell, path::PathBuf, rc::Rc};

use anyhow::{Context, Result};
use bounce_core::{Rgb, Tuning, WINDOW_TITLE};
use bounce_rendering::{Color, Presentation, RenderingBackend, Viewport};
use bounce_rendering_macroquad::{AssetBundle, MacroquadBackend};
use bounce_world::Level;
use clap::Parser;

use crate::{level_file::LoadedLevel, simulation::Simulation};

/// Command-line arguments accepted by the game.
#[derive(Debug, Parser)]
#[command(name = "bounce", about = "Side-scrolling ball platformer")]
struct CliArgs {
    /// Asset manifest listing the HUD font and the victory image.
    #[arg(long, value_name = "PATH", default_value_os_t = AssetBundle::default_manifest_path())]
    assets: PathBuf,
    /// TOML level to play instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long = "no-vsync", overrides_with = "vsync")]
    no_vsync: bool,
    /// Log frame timing once per second.
    #[arg(long)]
    show_fps: bool,
}

impl CliArgs {
    fn vsync_enabled(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

/// Entry point for the Bounce command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = CliArgs::parse();
    let LoadedLevel { level, tuning } = match &args.level {
        Some(path) => level_file::load(path)?,
        None => {
            log::info!("playing the built-in level");
            LoadedLevel {
                level: Level::classic(),
                tuning: Tuning::default(),
            }
        }
    };

    let assets = AssetBundle::from_manifest_path(&args.assets)
        .with_context(|| format!("failed to load assets from {}", args.assets.display()))?;
    let viewport = Viewport::new(tuning.view_size)?;

    let simulation = Rc::new(RefCell::new(Simulation::new(level, tuning)));
    let scene = simulation.borrow().initial_scene();
    let presentation = Presentation::new(WINDOW_TITLE, Color::from(Rgb::CYAN), viewport, scene);
    let backend = MacroquadBackend::new(assets)
        .with_vsync(args.vsync_enabled())
        .with_show_fps(args.show_fps);

    log::info!("starting {WINDOW_TITLE}");
    let driver = Rc::clone(&simulation);
    backend.run(presentation, move |frame, input, scene| {
        let mut simulation = driver.borrow_mut();
        simulation.advance(frame, input);
        simulation.populate_scene(scene);
    })?;

    log::info!("session finished: {}", simulation.borrow().report());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn defaults_use_the_shipped_manifest_with_vsync() {
        let args = CliArgs::try_parse_from(["bounce"]).expect("defaults parse");
        assert_eq!(args.assets, PathBuf::from("assets/manifest.toml"));
        assert!(args.level.is_none());
        assert!(args.vsync_enabled());
        assert!(!args.show_fps);
    }

    #[test]
    fn the_last_vsync_flag_wins() {
        let args = CliArgs::try_parse_from(["bounce", "--vsync", "--no-vsync"])
            .expect("flags parse");
        assert!(!args.vsync_enabled());

        let args = CliArgs::try_parse_from(["bounce", "--no-vsync", "--vsync"])
            .expect("flags parse");
        assert!(args.vsync_enabled());
    }

    #[test]
    fn level_paths_are_accepted() {
        let args = CliArgs::try_parse_from(["bounce", "--level", "levels/classic.toml"])
            .expect("level parses");
        assert_eq!(args.level, Some(PathBuf::from("levels/classic.toml")));
    }
}
