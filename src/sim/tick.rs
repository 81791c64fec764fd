//! Per-frame simulation
//!
//! One call advances the session by exactly one display frame. Velocities are
//! in pixels per frame and integration is a single explicit Euler step, so a
//! very fast ball can tunnel through a brick.

use super::collision::{circle_intersects_rect, reflect_axis, resolve_axis};
use super::phase::{GamePhase, Timer};
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Input commands for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Pointer x in playfield coordinates (None = no pointer control)
    pub pointer_x: Option<f32>,
    /// Move-left key held
    pub left: bool,
    /// Move-right key held
    pub right: bool,
    /// Launch signal (key press or click)
    pub launch: bool,
    /// Restart signal (restart control)
    pub restart: bool,
    /// Demo mode - the paddle tracks the ball and idle sessions auto-launch
    pub autopilot: bool,
}

/// Everything one frame produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    /// Delayed transitions the host must schedule
    pub timers: Vec<Timer>,
}

/// Run one full frame: input signals, simulation, phase bookkeeping
pub fn step(state: &mut GameState, input: &TickInput) -> StepOutcome {
    let input = autopilot(state, input);

    if input.restart {
        state.restart();
    }
    if input.launch {
        state.launch();
    }

    let events = tick(state, &input);
    let timers = state.apply_events(&events);
    StepOutcome { events, timers }
}

/// Synthesize input for demo mode
fn autopilot(state: &GameState, input: &TickInput) -> TickInput {
    let mut input = input.clone();
    if !input.autopilot {
        return input;
    }

    if state.phase == GamePhase::Idle {
        input.launch = true;
    }

    // Aim a little off center so the ball doesn't settle into a vertical loop
    let time_factor = state.frame as f32 * 0.013;
    let offset = (time_factor.sin() * 0.6 + (time_factor * 0.37).sin() * 0.3) * state.paddle.width / 2.0;
    input.pointer_x = Some(state.ball.pos.x + offset);
    input.left = false;
    input.right = false;
    input
}

/// Advance the simulation engine by one frame
///
/// Only the playing phase simulates. While idle the attached ball tracks the
/// paddle; every other phase leaves the entities untouched.
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    match state.phase {
        GamePhase::Idle => {
            if state.ball.attached {
                state.ball.follow(&state.paddle);
            }
            return events;
        }
        GamePhase::Playing => {}
        GamePhase::Dead | GamePhase::Win | GamePhase::GameOver => return events,
    }

    state.frame += 1;

    // Paddle control
    state.paddle.steer(input.pointer_x, input.left, input.right);

    // Attached ball rides the paddle
    if state.ball.attached {
        state.ball.follow(&state.paddle);
        return events;
    }

    let ball = &mut state.ball;
    ball.pos += ball.vel;

    // Side walls
    if ball.pos.x - ball.radius < 0.0 {
        ball.pos.x = ball.radius;
        ball.vel.x = ball.vel.x.abs();
    }
    if ball.pos.x + ball.radius > PLAYFIELD_WIDTH {
        ball.pos.x = PLAYFIELD_WIDTH - ball.radius;
        ball.vel.x = -ball.vel.x.abs();
    }

    // Ceiling
    if ball.pos.y - ball.radius < 0.0 {
        ball.pos.y = ball.radius;
        ball.vel.y = ball.vel.y.abs();
    }

    // Fell out the bottom
    if ball.pos.y - ball.radius > PLAYFIELD_HEIGHT {
        events.push(GameEvent::BallLost);
        return events;
    }

    // Paddle, only while descending so an embedded ball can't re-trigger
    let paddle = &state.paddle;
    if ball.vel.y > 0.0 && circle_intersects_rect(ball.pos, ball.radius, &paddle.rect()) {
        let hit = ((ball.pos.x - paddle.center_x()) / (paddle.width / 2.0)).clamp(-1.0, 1.0);
        let angle = hit * PADDLE_MAX_DEFLECTION;
        let speed = ball.speed();
        ball.vel.x = speed * angle.sin();
        ball.vel.y = -speed * angle.cos().abs();
        ball.pos.y = paddle.pos.y - ball.radius;
    }

    // Bricks; every overlapping brick is hit, there is no early exit
    for (index, brick) in state.bricks.iter_mut().enumerate() {
        if !brick.alive || !circle_intersects_rect(ball.pos, ball.radius, &brick.rect) {
            continue;
        }
        brick.alive = false;
        let axis = resolve_axis(ball.pos, ball.radius, &brick.rect);
        ball.vel = reflect_axis(ball.vel, axis);
        events.push(GameEvent::BrickDestroyed {
            index,
            points: brick.points,
        });
    }

    if state.is_cleared() {
        events.push(GameEvent::LevelCleared);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::Rect;
    use crate::sim::state::Brick;
    use glam::Vec2;

    /// A launched session with the grid replaced by the given rectangles
    fn playing_with_bricks(rects: &[Rect]) -> GameState {
        let mut state = GameState::new(12345);
        state.bricks = rects
            .iter()
            .enumerate()
            .map(|(i, rect)| Brick {
                rect: *rect,
                alive: true,
                color: crate::sim::state::BrickColor::Red,
                points: 10 * (i as u32 + 1),
                row: 0,
                col: i,
            })
            .collect();
        assert!(state.launch());
        state
    }

    /// A brick tucked into a corner the tests never reach
    const FAR_AWAY: Rect = Rect::new(0.0, 0.0, 1.0, 1.0);

    #[test]
    fn test_tick_idle_to_playing() {
        let mut state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::Idle);

        // Tick without launch - should stay idle with the ball on the paddle
        let outcome = step(&mut state, &TickInput::default());
        assert!(outcome.events.is_empty());
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.ball.attached);

        let launch = TickInput {
            launch: true,
            ..Default::default()
        };
        let start = state.ball.pos;
        step(&mut state, &launch);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.ball.attached);
        assert_eq!(state.ball.pos, start + state.ball.vel);
    }

    #[test]
    fn test_idle_ignores_paddle_input() {
        let mut state = GameState::new(12345);
        let paddle = state.paddle.clone();
        let input = TickInput {
            pointer_x: Some(10.0),
            left: true,
            ..Default::default()
        };
        step(&mut state, &input);
        assert_eq!(state.paddle, paddle);
    }

    #[test]
    fn test_brick_hit_scenario() {
        let mut state = playing_with_bricks(&[Rect::new(95.0, 104.0, 42.0, 18.0), FAR_AWAY]);
        state.ball.pos = Vec2::new(100.0, 100.0);
        state.ball.vel = Vec2::new(3.0, 4.0);

        let outcome = step(&mut state, &TickInput::default());

        assert!(!state.bricks[0].alive);
        assert!(state.bricks[1].alive);
        assert_eq!(state.score, 10);
        assert_eq!(
            outcome.events,
            vec![GameEvent::BrickDestroyed { index: 0, points: 10 }]
        );
        // Shallower overlap is vertical: only vy flips
        assert_eq!(state.ball.vel, Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_multiple_bricks_hit_in_one_frame() {
        // Two bricks side by side, ball lands on the seam
        let mut state = playing_with_bricks(&[
            Rect::new(100.0, 200.0, 40.0, 18.0),
            Rect::new(144.0, 200.0, 40.0, 18.0),
            FAR_AWAY,
        ]);
        state.ball.pos = Vec2::new(142.0, 189.0);
        state.ball.vel = Vec2::new(0.0, 4.0);

        let outcome = step(&mut state, &TickInput::default());
        assert!(!state.bricks[0].alive);
        assert!(!state.bricks[1].alive);
        assert_eq!(state.score, 30);
        assert_eq!(outcome.events.len(), 2);
        // Both bounces applied: vy flipped twice
        assert_eq!(state.ball.vel, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn test_wall_reflection() {
        let mut state = playing_with_bricks(&[FAR_AWAY]);
        state.ball.pos = Vec2::new(10.0, 300.0);
        state.ball.vel = Vec2::new(-5.0, 3.0);
        step(&mut state, &TickInput::default());
        assert_eq!(state.ball.pos.x, BALL_RADIUS);
        assert_eq!(state.ball.vel, Vec2::new(5.0, 3.0));

        state.ball.pos = Vec2::new(PLAYFIELD_WIDTH - 10.0, 300.0);
        state.ball.vel = Vec2::new(5.0, 3.0);
        step(&mut state, &TickInput::default());
        assert_eq!(state.ball.pos.x, PLAYFIELD_WIDTH - BALL_RADIUS);
        assert_eq!(state.ball.vel, Vec2::new(-5.0, 3.0));

        state.ball.pos = Vec2::new(240.0, 10.0);
        state.ball.vel = Vec2::new(2.0, -5.0);
        step(&mut state, &TickInput::default());
        assert_eq!(state.ball.pos.y, BALL_RADIUS);
        assert_eq!(state.ball.vel, Vec2::new(2.0, 5.0));
    }

    #[test]
    fn test_paddle_center_hit_goes_straight_up() {
        let mut state = playing_with_bricks(&[FAR_AWAY]);
        let center = state.paddle.center_x();
        state.ball.pos = Vec2::new(center, PADDLE_Y - 10.0);
        state.ball.vel = Vec2::new(0.0, 4.0);

        step(&mut state, &TickInput::default());
        assert!(state.ball.vel.x.abs() < 1e-5);
        assert!((state.ball.vel.y + 4.0).abs() < 1e-5);
        assert_eq!(state.ball.pos.y, PADDLE_Y - BALL_RADIUS);
    }

    #[test]
    fn test_paddle_edge_hit_deflects_sixty_degrees() {
        let mut state = playing_with_bricks(&[FAR_AWAY]);
        let right_edge = state.paddle.pos.x + state.paddle.width;
        state.ball.pos = Vec2::new(right_edge, PADDLE_Y - 10.0);
        state.ball.vel = Vec2::new(0.0, 5.0);

        step(&mut state, &TickInput::default());
        let v = state.ball.vel;
        assert!((v.length() - 5.0).abs() < 1e-4);
        let angle = v.x.atan2(-v.y);
        assert!((angle - PADDLE_MAX_DEFLECTION).abs() < 1e-4);
    }

    #[test]
    fn test_paddle_ignored_while_ascending() {
        let mut state = playing_with_bricks(&[FAR_AWAY]);
        let center = state.paddle.center_x();
        state.ball.pos = Vec2::new(center, PADDLE_Y + 4.0);
        state.ball.vel = Vec2::new(1.0, -2.0);

        step(&mut state, &TickInput::default());
        assert_eq!(state.ball.vel, Vec2::new(1.0, -2.0));
    }

    #[test]
    fn test_ball_lost_on_last_life() {
        let mut state = playing_with_bricks(&[FAR_AWAY]);
        state.lives = 1;
        state.ball.pos = Vec2::new(240.0, PLAYFIELD_HEIGHT + BALL_RADIUS);
        state.ball.vel = Vec2::new(0.0, 1.0);

        let outcome = step(&mut state, &TickInput::default());
        assert_eq!(outcome.events, vec![GameEvent::BallLost]);
        assert!(outcome.timers.is_empty());
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);

        // No further play without a restart
        let launch = TickInput {
            launch: true,
            ..Default::default()
        };
        step(&mut state, &launch);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_ball_lost_short_circuits_collisions() {
        // A brick placed where the ball ends up below the floor is not hit
        let below = Rect::new(200.0, PLAYFIELD_HEIGHT, 80.0, 40.0);
        let mut state = playing_with_bricks(&[below, FAR_AWAY]);
        state.ball.pos = Vec2::new(240.0, PLAYFIELD_HEIGHT + 6.0);
        state.ball.vel = Vec2::new(0.0, 4.0);

        let outcome = step(&mut state, &TickInput::default());
        assert_eq!(outcome.events, vec![GameEvent::BallLost]);
        assert!(state.bricks[0].alive);
        assert_eq!(state.phase, GamePhase::Dead);
        assert_eq!(outcome.timers.len(), 1);
    }

    #[test]
    fn test_clearing_last_brick_wins() {
        let mut state = playing_with_bricks(&[Rect::new(95.0, 104.0, 42.0, 18.0)]);
        state.ball.pos = Vec2::new(100.0, 100.0);
        state.ball.vel = Vec2::new(3.0, 4.0);

        let outcome = step(&mut state, &TickInput::default());
        assert_eq!(
            outcome.events,
            vec![
                GameEvent::BrickDestroyed { index: 0, points: 10 },
                GameEvent::LevelCleared
            ]
        );
        assert_eq!(state.phase, GamePhase::Win);
        assert_eq!(state.level, 2);

        // Win blocks play until the timer fires
        let before = state.ball.clone();
        let outcome = step(&mut state, &TickInput::default());
        assert!(outcome.events.is_empty());
        assert_eq!(state.ball, before);
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_frozen_outside_play() {
        let mut state = playing_with_bricks(&[FAR_AWAY]);
        state.phase = GamePhase::Dead;
        let (paddle, ball) = (state.paddle.clone(), state.ball.clone());
        let input = TickInput {
            pointer_x: Some(50.0),
            right: true,
            ..Default::default()
        };
        step(&mut state, &input);
        assert_eq!(state.paddle, paddle);
        assert_eq!(state.ball, ball);
    }

    #[test]
    fn test_autopilot_launches_and_tracks() {
        let mut state = GameState::new(99);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        step(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);

        for _ in 0..600 {
            step(&mut state, &input);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        // Ten seconds of demo play should have scored something
        assert!(state.score > 0);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                launch: true,
                ..Default::default()
            },
            TickInput {
                pointer_x: Some(120.0),
                ..Default::default()
            },
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..50 {
            for input in &inputs {
                step(&mut state1, input);
                step(&mut state2, input);
            }
        }

        assert_eq!(state1.frame, state2.frame);
        assert_eq!(state1.ball, state2.ball);
        assert_eq!(state1.paddle, state2.paddle);
        assert_eq!(state1.score, state2.score);
    }
}
