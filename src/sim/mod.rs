//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per display frame, velocities in pixels per frame
//! - Seeded RNG only
//! - Stable iteration order (bricks in grid order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod phase;
pub mod state;
pub mod tick;

pub use collision::{Axis, Rect, circle_intersects_rect, reflect_axis, resolve_axis};
pub use phase::{GamePhase, SessionToken, StatusMessage, Timer, TimerKind};
pub use state::{
    Ball, Brick, BrickColor, GameEvent, GameState, Paddle, ROW_COLORS, base_speed,
    build_brick_grid,
};
pub use tick::{StepOutcome, TickInput, step, tick};
