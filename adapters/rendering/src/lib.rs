#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Bounce adapters.

use anyhow::Result as AnyResult;
use bounce_core::{Aabb, Controls, Rgb};
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

impl From<Rgb> for Color {
    fn from(color: Rgb) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether the move-left key is held.
    pub move_left: bool,
    /// Whether the move-right key is held.
    pub move_right: bool,
    /// Whether the jump key is held.
    pub jump: bool,
    /// Whether the restart key was pressed on this frame.
    pub restart: bool,
    /// Whether any key was pressed on this frame.
    pub any_key: bool,
}

impl FrameInput {
    /// Key state in the form consumed by the simulation.
    #[must_use]
    pub const fn controls(&self) -> Controls {
        Controls {
            left: self.move_left,
            right: self.move_right,
            jump: self.jump,
            restart: self.restart,
            any_key: self.any_key,
        }
    }
}

/// Filled axis-aligned rectangle positioned in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectVisual {
    /// Rectangle to fill.
    pub bounds: Aabb,
    /// Fill color.
    pub color: Color,
}

impl RectVisual {
    /// Creates a new rectangle visual.
    #[must_use]
    pub const fn new(bounds: Aabb, color: Color) -> Self {
        Self { bounds, color }
    }
}

/// Filled circle described by the top-left corner of its bounding square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleVisual {
    /// Top-left corner of the bounding square in world units.
    pub top_left: Vec2,
    /// Radius in world units.
    pub radius: f32,
    /// Fill color.
    pub color: Color,
}

impl CircleVisual {
    /// Creates a new circle visual.
    #[must_use]
    pub const fn new(top_left: Vec2, radius: f32, color: Color) -> Self {
        Self {
            top_left,
            radius,
            color,
        }
    }

    /// Center of the circle in world units.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.top_left + Vec2::splat(self.radius)
    }
}

/// Text overlay pinned to the visible region rather than the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Text to display.
    pub text: String,
    /// Offset of the text's top-left corner from the view's top-left corner.
    pub offset: Vec2,
    /// Glyph height in view units.
    pub font_size: u16,
    /// Text color.
    pub color: Color,
}

impl Hud {
    /// Padding between the view border and the counter.
    pub const PADDING: f32 = 10.0;
    /// Glyph height of the counter.
    pub const FONT_SIZE: u16 = 24;

    /// Creates the coin counter overlay.
    #[must_use]
    pub fn coin_counter(coins: u32) -> Self {
        Self {
            text: format!("Coins: {coins}"),
            offset: Vec2::splat(Self::PADDING),
            font_size: Self::FONT_SIZE,
            color: Color::from(Rgb::WHITE),
        }
    }
}

/// Everything drawn on a single frame, in world units.
///
/// Backends draw the fields in declaration order: player, platforms, walls,
/// obstacles, coins, goal, HUD and finally the victory image.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Center of the visible region.
    pub camera_center: Vec2,
    /// The player's ball.
    pub player: CircleVisual,
    /// Platforms including the floor.
    pub platforms: Vec<RectVisual>,
    /// Walls.
    pub walls: Vec<RectVisual>,
    /// Obstacles at their current positions.
    pub obstacles: Vec<RectVisual>,
    /// Coins that have not been collected.
    pub coins: Vec<CircleVisual>,
    /// The goal region.
    pub goal: RectVisual,
    /// Coin counter overlay.
    pub hud: Hud,
    /// Top-left corner of the victory image while the level is completed.
    pub victory: Option<Vec2>,
}

/// Size of the visible region in world units, validated to be drawable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    size: Vec2,
}

impl Viewport {
    /// Creates a viewport, rejecting empty or non-finite sizes.
    pub fn new(size: Vec2) -> Result<Self, RenderingError> {
        if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
            Ok(Self { size })
        } else {
            Err(RenderingError::DegenerateViewport {
                width: size.x,
                height: size.y,
            })
        }
    }

    /// Size of the visible region in world units.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Fits the viewport into a screen of the provided size, keeping its aspect
    /// ratio and centering it between letterbox bars.
    #[must_use]
    pub fn letterbox(&self, screen_size: Vec2) -> ViewTransform {
        let scale = (screen_size.x / self.size.x)
            .min(screen_size.y / self.size.y)
            .max(0.0);
        let offset = (screen_size - self.size * scale) * 0.5;
        ViewTransform {
            scale,
            offset,
            view_size: self.size,
        }
    }
}

/// Mapping from world units to screen pixels for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset: Vec2,
    view_size: Vec2,
}

impl ViewTransform {
    /// Pixels per world unit.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Screen position of the view's top-left corner.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Screen size covered by the view, bars excluded.
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        self.view_size * self.scale
    }

    /// Converts a world position to screen pixels.
    #[must_use]
    pub fn world_to_screen(&self, camera_center: Vec2, world: Vec2) -> Vec2 {
        let view_origin = camera_center - self.view_size * 0.5;
        self.view_to_screen(world - view_origin)
    }

    /// Converts a position relative to the view's top-left corner to screen pixels.
    #[must_use]
    pub fn view_to_screen(&self, view: Vec2) -> Vec2 {
        self.offset + view * self.scale
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Region of the world visible at once.
    pub viewport: Viewport,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, viewport: Viewport, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            viewport,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Bounce scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta and
    /// the input captured by the adapter, and rewrites the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// The visible region must have a positive, finite size.
    #[error("viewport must have a positive size (received {width}x{height})")]
    DegenerateViewport {
        /// Width that failed validation.
        width: f32,
        /// Height that failed validation.
        height: f32,
    },
}
