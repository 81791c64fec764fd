//! Brickfall - a brick breaker arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, phase machine)
//! - `input`: Held keys, pointer position and one-shot launch/restart signals
//! - `driver`: Cooperative frame loop and the snapshot/HUD output contracts
//! - `renderer`: Draw list generation from a read-only snapshot
//! - `settings`: Presentation preferences

pub mod driver;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::{FrameDriver, FrameHandle, FrameHost, Hud, Presenter, Snapshot};
pub use input::{InputState, Key};
pub use settings::Settings;

/// Playfield configuration constants
///
/// Fixed at compile time; nothing here is externally configurable.
pub mod consts {
    /// Playfield dimensions (pixels)
    pub const PLAYFIELD_WIDTH: f32 = 480.0;
    pub const PLAYFIELD_HEIGHT: f32 = 640.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 12.0;
    pub const PADDLE_Y: f32 = PLAYFIELD_HEIGHT - 40.0;
    /// Pixels per frame while a movement key is held
    pub const PADDLE_SPEED: f32 = 7.0;
    /// Maximum deflection from vertical when the ball leaves the paddle (60°)
    pub const PADDLE_MAX_DEFLECTION: f32 = std::f32::consts::FRAC_PI_3;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Per-axis launch speed on level 1 (pixels per frame)
    pub const BALL_AXIS_SPEED: f32 = 4.0;
    /// Per-axis launch speed added for every level after the first
    pub const BALL_AXIS_SPEED_PER_LEVEL: f32 = 0.5;

    /// Brick grid layout
    pub const BRICK_ROWS: usize = 6;
    pub const BRICK_COLS: usize = 10;
    pub const BRICK_WIDTH: f32 = 42.0;
    pub const BRICK_HEIGHT: f32 = 18.0;
    pub const BRICK_PADDING: f32 = 4.0;
    pub const BRICK_OFFSET_TOP: f32 = 60.0;
    pub const BRICK_OFFSET_LEFT: f32 = (PLAYFIELD_WIDTH
        - (BRICK_COLS as f32 * (BRICK_WIDTH + BRICK_PADDING) - BRICK_PADDING))
        / 2.0;
    /// Points per row step; the top row is worth `BRICK_ROWS * BRICK_POINT_STEP`
    pub const BRICK_POINT_STEP: u32 = 10;

    /// Session defaults
    pub const STARTING_LIVES: u32 = 3;
    pub const STARTING_LEVEL: u32 = 1;

    /// Pause after losing a ball before it respawns (ms)
    pub const DEAD_PAUSE_MS: f64 = 600.0;
    /// Pause after clearing a level before the next one is set up (ms)
    pub const WIN_PAUSE_MS: f64 = 100.0;

    /// Nominal frame interval used by headless hosts (ms)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
}
