//! Game state and core simulation types
//!
//! A single `GameState` owns every entity and counter of a play-through. The
//! simulation engine and the phase machine are its only writers.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::phase::{GamePhase, SessionToken, StatusMessage};
use crate::consts::*;

/// Starting ball speed (magnitude) for a level
///
/// The ball launches at 45°, so each axis carries
/// `BALL_AXIS_SPEED + (level - 1) * BALL_AXIS_SPEED_PER_LEVEL`.
pub fn base_speed(level: u32) -> f32 {
    axis_speed(level) * std::f32::consts::SQRT_2
}

#[inline]
fn axis_speed(level: u32) -> f32 {
    BALL_AXIS_SPEED + level.saturating_sub(1) as f32 * BALL_AXIS_SPEED_PER_LEVEL
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Pixels per frame while a movement key is held
    pub speed: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYFIELD_WIDTH / 2.0 - PADDLE_WIDTH / 2.0, PADDLE_Y),
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
        }
    }
}

impl Paddle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    /// Largest x the paddle may take
    #[inline]
    pub fn max_x(&self) -> f32 {
        (PLAYFIELD_WIDTH - self.width).max(0.0)
    }

    /// Apply one frame of player input
    ///
    /// The pointer centers the paddle first, held keys are added afterwards and
    /// so win when both are present. The result is always clamped.
    pub fn steer(&mut self, pointer_x: Option<f32>, left: bool, right: bool) {
        if let Some(x) = pointer_x.filter(|x| x.is_finite()) {
            self.pos.x = x - self.width / 2.0;
        }
        if left {
            self.pos.x -= self.speed;
        }
        if right {
            self.pos.x += self.speed;
        }
        self.pos.x = self.pos.x.clamp(0.0, self.max_x());
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Center
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub radius: f32,
    /// Riding the paddle, waiting for launch
    pub attached: bool,
}

impl Ball {
    /// Create a ball resting on the paddle with a fresh launch velocity
    pub fn attached_to(paddle: &Paddle, level: u32, rng: &mut Pcg32) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            attached: true,
        };
        ball.reattach(paddle, level, rng);
        ball
    }

    /// Put the ball back on the paddle and re-arm its launch velocity
    ///
    /// Horizontal direction is a coin flip, vertical is always upward.
    pub fn reattach(&mut self, paddle: &Paddle, level: u32, rng: &mut Pcg32) {
        let s = axis_speed(level);
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.vel = Vec2::new(s * sign, -s);
        self.attached = true;
        self.follow(paddle);
    }

    /// Snap an attached ball to just above the paddle center
    pub fn follow(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.pos.y - self.radius - 1.0);
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Brick color, one per grid row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickColor {
    Red,
    Orange,
    Yellow,
    Cyan,
    Green,
    Purple,
}

/// Row colors from top to bottom
pub const ROW_COLORS: [BrickColor; BRICK_ROWS] = [
    BrickColor::Red,
    BrickColor::Orange,
    BrickColor::Yellow,
    BrickColor::Cyan,
    BrickColor::Green,
    BrickColor::Purple,
];

impl BrickColor {
    /// 0xRRGGBB
    pub const fn rgb(self) -> u32 {
        match self {
            BrickColor::Red => 0xe94560,
            BrickColor::Orange => 0xf0a500,
            BrickColor::Yellow => 0xf7e733,
            BrickColor::Cyan => 0x4cc9f0,
            BrickColor::Green => 0x7bed9f,
            BrickColor::Purple => 0xa29bfe,
        }
    }
}

/// A brick in the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    pub alive: bool,
    pub color: BrickColor,
    pub points: u32,
    pub row: usize,
    pub col: usize,
}

/// Something the simulation engine wants the phase machine to know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A brick was struck and removed
    BrickDestroyed { index: usize, points: u32 },
    /// The ball fell past the bottom edge
    BallLost,
    /// Every brick of the level is gone
    LevelCleared,
}

/// Build the full grid for a level, every brick alive
///
/// Outer rows are worth more: `points = (rows - row) * BRICK_POINT_STEP`.
pub fn build_brick_grid() -> Vec<Brick> {
    let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLS);
    for (row, color) in ROW_COLORS.iter().copied().enumerate() {
        for col in 0..BRICK_COLS {
            bricks.push(Brick {
                rect: Rect::new(
                    BRICK_OFFSET_LEFT + col as f32 * (BRICK_WIDTH + BRICK_PADDING),
                    BRICK_OFFSET_TOP + row as f32 * (BRICK_HEIGHT + BRICK_PADDING),
                    BRICK_WIDTH,
                    BRICK_HEIGHT,
                ),
                alive: true,
                color,
                points: (BRICK_ROWS - row) as u32 * BRICK_POINT_STEP,
                row,
                col,
            });
        }
    }
    bricks
}

/// Complete session state for one play-through
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the session RNG was built from
    pub seed: u64,
    rng: Pcg32,
    /// Current phase
    pub phase: GamePhase,
    /// Status line shown by the UI
    pub message: StatusMessage,
    pub score: u64,
    pub lives: u32,
    /// 1-based level number
    pub level: u32,
    pub paddle: Paddle,
    pub ball: Ball,
    pub bricks: Vec<Brick>,
    /// Simulation frames advanced this session
    pub frame: u64,
    token: SessionToken,
}

impl GameState {
    /// Create a fresh session: score 0, full lives, level 1, idle
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let paddle = Paddle::default();
        let ball = Ball::attached_to(&paddle, STARTING_LEVEL, &mut rng);

        let mut state = Self {
            seed,
            rng,
            phase: GamePhase::Idle,
            message: StatusMessage::PressToStart,
            score: 0,
            lives: STARTING_LIVES,
            level: STARTING_LEVEL,
            paddle,
            ball,
            bricks: Vec::new(),
            frame: 0,
            token: SessionToken::default(),
        };
        state.setup_level();
        log::info!("Session started (seed {})", seed);
        state
    }

    /// Reset score, lives and level to their initial values and set up level 1
    pub fn reset_session(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.level = STARTING_LEVEL;
        self.frame = 0;
        self.setup_level();
    }

    /// Rebuild paddle, ball and bricks for the current level and go idle
    ///
    /// Invalidates every timer scheduled before the call.
    pub fn setup_level(&mut self) {
        self.paddle = Paddle::default();
        self.ball = Ball::attached_to(&self.paddle, self.level, &mut self.rng);
        self.bricks = build_brick_grid();
        self.phase = GamePhase::Idle;
        self.message = StatusMessage::PressToStart;
        self.token = self.token.next();
        log::info!(
            "Level {} ready ({} bricks, ball speed {:.2})",
            self.level,
            self.bricks.len(),
            self.ball.speed()
        );
    }

    /// Put a fresh ball on the paddle after a loss
    pub fn respawn_ball(&mut self) {
        let (paddle, level) = (&self.paddle, self.level);
        self.ball.reattach(paddle, level, &mut self.rng);
    }

    /// Token stamped on timers scheduled now
    #[inline]
    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn bricks_alive(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    pub fn bricks_destroyed(&self) -> usize {
        self.bricks.len() - self.bricks_alive()
    }

    /// True once every brick of the level is gone
    pub fn is_cleared(&self) -> bool {
        self.bricks_destroyed() == self.bricks.len()
    }

    /// Direct access to the session RNG (autopilot jitter, tests)
    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_speed_scales_linearly() {
        let s1 = base_speed(1);
        let s2 = base_speed(2);
        let s3 = base_speed(3);
        assert!((s1 - 4.0 * std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!(((s2 - s1) - (s3 - s2)).abs() < 1e-5);
        assert!(s2 > s1);
    }

    #[test]
    fn test_fresh_session() {
        let state = GameState::new(7);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.bricks.len(), BRICK_ROWS * BRICK_COLS);
        assert!(state.bricks.iter().all(|b| b.alive));
        assert!(state.ball.attached);
    }

    #[test]
    fn test_ball_reset_launch_velocity() {
        for seed in 0..32 {
            let state = GameState::new(seed);
            let ball = &state.ball;
            assert!(ball.vel.y < 0.0, "ball must launch upward");
            assert!((ball.vel.x.abs() - ball.vel.y.abs()).abs() < 1e-6);
            assert!((ball.speed() - base_speed(1)).abs() < 1e-4);
            assert!((ball.pos.x - state.paddle.center_x()).abs() < 1e-6);
            assert!(ball.pos.y < state.paddle.pos.y);
        }
    }

    #[test]
    fn test_launch_direction_varies_with_seed() {
        let signs: Vec<bool> = (0..64)
            .map(|seed| GameState::new(seed).ball.vel.x > 0.0)
            .collect();
        assert!(signs.iter().any(|&s| s));
        assert!(signs.iter().any(|&s| !s));
    }

    #[test]
    fn test_brick_grid_layout() {
        let bricks = build_brick_grid();

        // Points fall from top row to bottom row
        for pair in bricks.windows(2) {
            if pair[0].row < pair[1].row {
                assert!(pair[0].points > pair[1].points);
            }
        }
        assert_eq!(bricks[0].points, 60);
        assert_eq!(bricks.last().map(|b| b.points), Some(10));

        // Horizontally centered
        let left = bricks[0].rect.x;
        let right = bricks[BRICK_COLS - 1].rect.x + BRICK_WIDTH;
        assert!((left - (PLAYFIELD_WIDTH - right)).abs() < 1e-4);
    }

    #[test]
    fn test_paddle_steer_keys_override_pointer() {
        let mut paddle = Paddle::default();
        paddle.steer(Some(200.0), false, true);
        assert!((paddle.center_x() - (200.0 + PADDLE_SPEED)).abs() < 1e-6);

        paddle.steer(Some(-500.0), false, false);
        assert_eq!(paddle.pos.x, 0.0);

        paddle.steer(None, false, true);
        paddle.steer(Some(10_000.0), false, false);
        assert_eq!(paddle.pos.x, PLAYFIELD_WIDTH - PADDLE_WIDTH);
    }

    #[test]
    fn test_paddle_ignores_non_finite_pointer() {
        let mut paddle = Paddle::default();
        let before = paddle.pos;
        paddle.steer(Some(f32::NAN), false, false);
        assert_eq!(paddle.pos, before);
    }

    #[test]
    fn test_setup_level_advances_token() {
        let mut state = GameState::new(1);
        let before = state.token();
        state.setup_level();
        assert_ne!(before, state.token());
    }
}
