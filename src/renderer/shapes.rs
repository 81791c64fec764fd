//! Draw list generation for 2D primitives
//!
//! Turns a frame snapshot into backend-neutral drawing commands. A canvas,
//! GPU or terminal back end only has to know how to fill a handful of shapes.

use glam::Vec2;
use serde::Serialize;

use super::palette::{self, Rgba};
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::driver::Snapshot;
use crate::settings::Settings;
use crate::sim::{Ball, Brick, GamePhase, Paddle, Rect};

/// Background grid spacing (pixels)
const GRID_SPACING: f32 = 40.0;
const PADDLE_CORNER: f32 = 6.0;
const BRICK_CORNER: f32 = 3.0;

/// How a shape is filled
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Fill {
    Solid(Rgba),
    /// Two-stop gradient along `from -> to`
    Linear { from: Vec2, to: Vec2, start: Rgba, end: Rgba },
    /// Two-stop gradient between two circles
    Radial {
        inner: Vec2,
        inner_radius: f32,
        outer: Vec2,
        outer_radius: f32,
        start: Rgba,
        end: Rgba,
    },
}

/// A single drawing command
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DrawCmd {
    Clear(Rgba),
    Line { from: Vec2, to: Vec2, color: Rgba, width: f32 },
    RoundedRect { rect: Rect, radius: f32, fill: Fill },
    Circle { center: Vec2, radius: f32, fill: Fill },
    /// Translucent overlay over the whole playfield
    Tint(Rgba),
}

/// Ordered commands for one frame, back to front
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawList {
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Build the draw list for a frame
pub fn build_frame(snapshot: &Snapshot<'_>, settings: &Settings) -> DrawList {
    let mut commands = vec![DrawCmd::Clear(palette::BACKGROUND)];

    if settings.background_grid {
        background_grid(&mut commands);
    }
    for brick in snapshot.bricks.iter().filter(|b| b.alive) {
        commands.push(brick_cmd(brick, settings.gradients));
    }
    commands.push(paddle_cmd(snapshot.paddle, settings.gradients));
    commands.push(ball_cmd(snapshot.ball, settings.gradients));

    if snapshot.phase == GamePhase::Dead && settings.effective_loss_flash() {
        commands.push(DrawCmd::Tint(palette::LOSS_FLASH));
    }

    DrawList { commands }
}

/// Faint decorative grid lines
fn background_grid(commands: &mut Vec<DrawCmd>) {
    let mut x = 0.0;
    while x < PLAYFIELD_WIDTH {
        commands.push(DrawCmd::Line {
            from: Vec2::new(x, 0.0),
            to: Vec2::new(x, PLAYFIELD_HEIGHT),
            color: palette::GRID_LINE,
            width: 1.0,
        });
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y < PLAYFIELD_HEIGHT {
        commands.push(DrawCmd::Line {
            from: Vec2::new(0.0, y),
            to: Vec2::new(PLAYFIELD_WIDTH, y),
            color: palette::GRID_LINE,
            width: 1.0,
        });
        y += GRID_SPACING;
    }
}

/// Vertical gradient over a rectangle, top color first
fn vertical(rect: &Rect, top: u32, bottom: u32) -> Fill {
    Fill::Linear {
        from: Vec2::new(rect.x, rect.y),
        to: Vec2::new(rect.x, rect.y + rect.h),
        start: palette::from_hex(top, 1.0),
        end: palette::from_hex(bottom, 1.0),
    }
}

fn brick_cmd(brick: &Brick, gradients: bool) -> DrawCmd {
    let base = brick.color.rgb();
    let fill = if gradients {
        vertical(&brick.rect, palette::lighten(base, palette::BRICK_HIGHLIGHT), base)
    } else {
        Fill::Solid(palette::from_hex(base, 1.0))
    };
    DrawCmd::RoundedRect {
        rect: brick.rect,
        radius: BRICK_CORNER,
        fill,
    }
}

fn paddle_cmd(paddle: &Paddle, gradients: bool) -> DrawCmd {
    let rect = paddle.rect();
    let fill = if gradients {
        vertical(&rect, palette::PADDLE_TOP, palette::PADDLE_BOTTOM)
    } else {
        Fill::Solid(palette::from_hex(palette::PADDLE_TOP, 1.0))
    };
    DrawCmd::RoundedRect {
        rect,
        radius: PADDLE_CORNER,
        fill,
    }
}

fn ball_cmd(ball: &Ball, gradients: bool) -> DrawCmd {
    // Highlight sits up and to the left of center
    let fill = if gradients {
        Fill::Radial {
            inner: ball.pos - Vec2::splat(2.0),
            inner_radius: 1.0,
            outer: ball.pos,
            outer_radius: ball.radius,
            start: palette::from_hex(palette::BALL_CORE, 1.0),
            end: palette::from_hex(palette::BALL_RIM, 1.0),
        }
    } else {
        Fill::Solid(palette::from_hex(palette::BALL_RIM, 1.0))
    };
    DrawCmd::Circle {
        center: ball.pos,
        radius: ball.radius,
        fill,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BRICK_COLS, BRICK_ROWS};
    use crate::sim::GameState;

    fn count(list: &DrawList, pred: impl Fn(&DrawCmd) -> bool) -> usize {
        list.commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_fresh_level_draws_every_brick() {
        let state = GameState::new(5);
        let list = build_frame(&Snapshot::of(&state), &Settings::default());

        assert!(matches!(list.commands[0], DrawCmd::Clear(_)));
        // Bricks plus the paddle
        let rects = count(&list, |c| matches!(c, DrawCmd::RoundedRect { .. }));
        assert_eq!(rects, BRICK_ROWS * BRICK_COLS + 1);
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Circle { .. })), 1);
        // 12 vertical + 16 horizontal grid lines
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Line { .. })), 28);
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Tint(_))), 0);
    }

    #[test]
    fn test_dead_bricks_are_skipped() {
        let mut state = GameState::new(5);
        state.bricks[0].alive = false;
        state.bricks[7].alive = false;
        let list = build_frame(&Snapshot::of(&state), &Settings::default());
        let rects = count(&list, |c| matches!(c, DrawCmd::RoundedRect { .. }));
        assert_eq!(rects, BRICK_ROWS * BRICK_COLS - 2 + 1);
    }

    #[test]
    fn test_loss_flash_only_while_dead() {
        let mut state = GameState::new(5);
        state.phase = GamePhase::Dead;
        let settings = Settings::default();
        let list = build_frame(&Snapshot::of(&state), &settings);
        assert_eq!(list.commands.last(), Some(&DrawCmd::Tint(palette::LOSS_FLASH)));

        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let list = build_frame(&Snapshot::of(&state), &calm);
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Tint(_))), 0);
    }

    #[test]
    fn test_flat_fills_without_gradients() {
        let state = GameState::new(5);
        let settings = Settings {
            gradients: false,
            background_grid: false,
            ..Settings::default()
        };
        let list = build_frame(&Snapshot::of(&state), &settings);
        assert_eq!(count(&list, |c| matches!(c, DrawCmd::Line { .. })), 0);
        assert!(list.commands.iter().all(|c| match c {
            DrawCmd::RoundedRect { fill, .. } | DrawCmd::Circle { fill, .. } => {
                matches!(fill, Fill::Solid(_))
            }
            _ => true,
        }));
    }
}
