//! Game phase machine
//!
//! Phases and the transitions between them:
//!
//! - `Idle --launch--> Playing`
//! - `Playing --ball lost, lives remain--> Dead --respawn timer--> Idle`
//! - `Playing --ball lost, no lives--> GameOver`
//! - `Playing --all bricks cleared--> Win --next level timer--> Idle`
//! - `GameOver --restart--> Idle` (full session reset)
//!
//! Timed transitions are handed to the host as [`Timer`]s stamped with the
//! session token current at scheduling time. Level setup and session reset
//! advance the token, so a timer that outlives its session is discarded.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};
use crate::consts::{DEAD_PAUSE_MS, WIN_PAUSE_MS};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball attached to paddle, waiting for launch input
    Idle,
    /// Active gameplay
    Playing,
    /// Short pause after losing a ball
    Dead,
    /// Short pause after clearing a level
    Win,
    /// Out of lives; only a restart leaves this phase
    GameOver,
}

impl GamePhase {
    /// Whether the frame loop should keep requesting refreshes
    #[inline]
    pub fn is_terminal(self) -> bool {
        self == GamePhase::GameOver
    }
}

/// Status line shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusMessage {
    None,
    PressToStart,
    PressToResume,
    LevelUp { level: u32 },
    GameOver,
}

impl StatusMessage {
    pub fn text(&self) -> String {
        match self {
            StatusMessage::None => String::new(),
            StatusMessage::PressToStart => "Press Space or click to start".to_string(),
            StatusMessage::PressToResume => "Press Space or click to resume".to_string(),
            StatusMessage::LevelUp { level } => format!("Level {}!", level),
            StatusMessage::GameOver => "Game Over!".to_string(),
        }
    }
}

/// Identifies the session/level a timer was scheduled for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(u64);

impl SessionToken {
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Dead -> Idle with a fresh ball on the paddle
    Respawn,
    /// Win -> Idle on a freshly built level
    NextLevel,
}

impl TimerKind {
    pub fn delay_ms(self) -> f64 {
        match self {
            TimerKind::Respawn => DEAD_PAUSE_MS,
            TimerKind::NextLevel => WIN_PAUSE_MS,
        }
    }

    /// Phase the session must still be in for the timer to apply
    fn expected_phase(self) -> GamePhase {
        match self {
            TimerKind::Respawn => GamePhase::Dead,
            TimerKind::NextLevel => GamePhase::Win,
        }
    }
}

/// A one-shot delayed transition for the host to schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub kind: TimerKind,
    pub token: SessionToken,
}

impl Timer {
    #[inline]
    pub fn delay_ms(&self) -> f64 {
        self.kind.delay_ms()
    }
}

impl GameState {
    /// Launch signal: release the ball. Only honored while idle.
    pub fn launch(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.ball.attached = false;
        self.message = StatusMessage::None;
        log::debug!("Ball launched (vel {:?})", self.ball.vel);
        true
    }

    /// Restart signal: full session reset. Only honored after game over.
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        log::info!("Restarting (final score {}, level {})", self.score, self.level);
        self.reset_session();
        true
    }

    /// Whether the UI should offer a restart control
    #[inline]
    pub fn restart_visible(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Fold simulation events into counters and phase
    ///
    /// Returns the timers the host must schedule.
    pub fn apply_events(&mut self, events: &[GameEvent]) -> Vec<Timer> {
        let mut timers = Vec::new();

        for event in events {
            match *event {
                GameEvent::BrickDestroyed { index, points } => {
                    self.score += u64::from(points);
                    log::debug!("Brick {} destroyed (+{}, score {})", index, points, self.score);
                }
                GameEvent::BallLost => {
                    if self.phase != GamePhase::Playing {
                        continue;
                    }
                    self.lives = self.lives.saturating_sub(1);
                    if self.lives == 0 {
                        self.phase = GamePhase::GameOver;
                        self.message = StatusMessage::GameOver;
                        log::info!("Game over (score {}, level {})", self.score, self.level);
                    } else {
                        self.phase = GamePhase::Dead;
                        timers.push(self.schedule(TimerKind::Respawn));
                        log::debug!("Ball lost, {} lives left", self.lives);
                    }
                }
                GameEvent::LevelCleared => {
                    if self.phase != GamePhase::Playing {
                        continue;
                    }
                    self.level += 1;
                    self.phase = GamePhase::Win;
                    self.message = StatusMessage::LevelUp { level: self.level };
                    timers.push(self.schedule(TimerKind::NextLevel));
                    log::info!("Level cleared, advancing to level {}", self.level);
                }
            }
        }

        timers
    }

    fn schedule(&self, kind: TimerKind) -> Timer {
        let timer = Timer {
            kind,
            token: self.token(),
        };
        log::debug!("Scheduled {:?} in {} ms", kind, kind.delay_ms());
        timer
    }

    /// Deliver a timer callback; stale or out-of-phase timers are ignored
    pub fn fire_timer(&mut self, timer: Timer) -> bool {
        if timer.token != self.token() || self.phase != timer.kind.expected_phase() {
            log::warn!(
                "Discarding stale {:?} timer (phase {:?})",
                timer.kind,
                self.phase
            );
            return false;
        }

        match timer.kind {
            TimerKind::Respawn => {
                self.respawn_ball();
                self.phase = GamePhase::Idle;
                self.message = StatusMessage::PressToResume;
            }
            TimerKind::NextLevel => self.setup_level(),
        }
        true
    }
}
