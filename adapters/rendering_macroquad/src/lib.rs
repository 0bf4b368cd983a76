#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Bounce.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the crate depends on macroquad without its default `audio`
//! feature.
//!
//! Every asset is read and decoded by [`AssetBundle`] before the window opens.
//! Only the steps that need a live graphics context, uploading the victory
//! texture and rasterising the font, happen inside the window, and their
//! failures are reported back through [`RenderingBackend::run`].

mod assets;

pub use self::assets::{AssetBundle, AssetKey, RgbaImage};

use anyhow::{anyhow, Result};
use bounce_rendering::{
    CircleVisual, Color, FrameInput, Presentation, RectVisual, RenderingBackend, Scene,
    ViewTransform,
};
use glam::Vec2;
use macroquad::{
    color::{BLACK, WHITE},
    input::{get_last_key_pressed, is_key_down, is_key_pressed, KeyCode},
    math::Vec2 as MacroquadVec2,
    text::{draw_text_ex, load_ttf_font_from_bytes, Font, TextParams},
    texture::{draw_texture_ex, DrawTextureParams, Texture2D},
};
use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

/// Snapshot of the keyboard observed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardState {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// Gameplay keys forwarded to the simulation.
    input: FrameInput,
}

impl KeyboardState {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            input: FrameInput {
                move_left: is_key_down(KeyCode::Left),
                move_right: is_key_down(KeyCode::Right),
                jump: is_key_down(KeyCode::Up),
                restart: is_key_pressed(KeyCode::R),
                any_key: get_last_key_pressed().is_some(),
            },
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    assets: AssetBundle,
}

impl MacroquadBackend {
    /// Returns a backend that draws with the provided assets and requests the
    /// platform's default swap interval.
    #[must_use]
    pub fn new(assets: AssetBundle) -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            assets,
        }
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    update_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_update: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once one second has elapsed.
    fn record_frame(
        &mut self,
        frame: Duration,
        update: Duration,
        render: Duration,
    ) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += update;
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let metrics = FpsMetrics {
            per_second: frames as f32 / seconds,
            avg_update: self.update_accum / frames,
            avg_render: self.render_accum / frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

/// Resources that need a live graphics context.
struct GpuResources {
    font: Font,
    victory: Texture2D,
    victory_size: Vec2,
}

impl GpuResources {
    fn upload(assets: &AssetBundle) -> Result<Self> {
        let font = load_ttf_font_from_bytes(assets.font())
            .map_err(|error| anyhow!("failed to rasterise hud font: {error:?}"))?;
        let image = assets.victory();
        let victory = Texture2D::from_rgba8(image.width(), image.height(), image.pixels());
        Ok(Self {
            font,
            victory,
            victory_size: Vec2::new(f32::from(image.width()), f32::from(image.height())),
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            assets,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            viewport,
            scene,
        } = presentation;

        let view_size = viewport.size();
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: view_size.x.round() as i32,
            window_height: view_size.y.round() as i32,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (init_sender, init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let resources = match GpuResources::upload(&assets) {
                Ok(resources) => resources,
                Err(error) => {
                    let _ = init_sender.send(Err(error));
                    return;
                }
            };
            let _ = init_sender.send(Ok(()));

            let mut scene = scene;
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardState::poll();
                if keyboard.quit_requested {
                    log::info!("quit requested");
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let update_start = Instant::now();
                update_scene(frame_dt, keyboard.input, &mut scene);
                let update_duration = update_start.elapsed();

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let transform = viewport.letterbox(screen);

                let render_start = Instant::now();
                draw_scene(&scene, &transform, clear_color, &resources);
                draw_letterbox_bars(&transform, screen);
                let render_duration = render_start.elapsed();

                if let Some(metrics) =
                    fps_counter.record_frame(frame_dt, update_duration, render_duration)
                {
                    if show_fps {
                        log::info!(
                            "FPS: {:.2} | update: {:>6.2}ms render: {:>6.2}ms",
                            metrics.per_second,
                            metrics.avg_update.as_secs_f64() * 1_000.0,
                            metrics.avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn draw_scene(scene: &Scene, transform: &ViewTransform, clear_color: Color, resources: &GpuResources) {
    macroquad::window::clear_background(BLACK);
    let origin = transform.offset();
    let extent = transform.extent();
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        extent.x,
        extent.y,
        to_macroquad_color(clear_color),
    );

    let camera = scene.camera_center;
    draw_circle(&scene.player, transform, camera);
    for rect in scene
        .platforms
        .iter()
        .chain(&scene.walls)
        .chain(&scene.obstacles)
    {
        draw_rect(rect, transform, camera);
    }
    for coin in &scene.coins {
        draw_circle(coin, transform, camera);
    }
    draw_rect(&scene.goal, transform, camera);

    let hud = &scene.hud;
    let baseline = transform.view_to_screen(hud.offset + Vec2::new(0.0, f32::from(hud.font_size)));
    let _ = draw_text_ex(
        &hud.text,
        baseline.x,
        baseline.y,
        TextParams {
            font: resources.font,
            font_size: scaled_font_size(hud.font_size, transform.scale()),
            color: to_macroquad_color(hud.color),
            ..TextParams::default()
        },
    );

    if let Some(anchor) = scene.victory {
        let position = transform.world_to_screen(camera, anchor);
        let size = resources.victory_size * transform.scale();
        draw_texture_ex(
            resources.victory,
            position.x,
            position.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(MacroquadVec2::new(size.x, size.y)),
                ..DrawTextureParams::default()
            },
        );
    }
}

fn draw_rect(rect: &RectVisual, transform: &ViewTransform, camera: Vec2) {
    let top_left = transform.world_to_screen(camera, rect.bounds.origin());
    let size = rect.bounds.size() * transform.scale();
    macroquad::shapes::draw_rectangle(
        top_left.x,
        top_left.y,
        size.x,
        size.y,
        to_macroquad_color(rect.color),
    );
}

fn draw_circle(circle: &CircleVisual, transform: &ViewTransform, camera: Vec2) {
    let center = transform.world_to_screen(camera, circle.center());
    macroquad::shapes::draw_circle(
        center.x,
        center.y,
        circle.radius * transform.scale(),
        to_macroquad_color(circle.color),
    );
}

fn draw_letterbox_bars(transform: &ViewTransform, screen: Vec2) {
    for (origin, size) in letterbox_bars(transform, screen) {
        macroquad::shapes::draw_rectangle(origin.x, origin.y, size.x, size.y, BLACK);
    }
}

/// Screen rectangles outside the view, as origin and size pairs.
fn letterbox_bars(transform: &ViewTransform, screen: Vec2) -> Vec<(Vec2, Vec2)> {
    let origin = transform.offset();
    let extent = transform.extent();
    let far = origin + extent;
    let mut bars = Vec::with_capacity(2);
    if origin.x > 0.0 {
        bars.push((Vec2::ZERO, Vec2::new(origin.x, screen.y)));
        bars.push((Vec2::new(far.x, 0.0), Vec2::new(screen.x - far.x, screen.y)));
    } else if origin.y > 0.0 {
        bars.push((Vec2::ZERO, Vec2::new(screen.x, origin.y)));
        bars.push((Vec2::new(0.0, far.y), Vec2::new(screen.x, screen.y - far.y)));
    }
    bars
}

fn scaled_font_size(font_size: u16, scale: f32) -> u16 {
    (f32::from(font_size) * scale).round().clamp(1.0, f32::from(u16::MAX)) as u16
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
