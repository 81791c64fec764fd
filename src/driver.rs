//! Cooperative frame loop
//!
//! The host owns the display refresh callback and the clock; the driver owns
//! the session. Each refresh the host calls [`FrameDriver::on_frame`], which
//! fires due timers, advances the simulation one step, hands a snapshot to the
//! presenter and asks the host for the next refresh unless the game is over.
//!
//! Everything runs on one thread and every frame runs to completion, so the
//! session never needs locking.

use serde::Serialize;

use crate::input::InputState;
use crate::sim::{self, Ball, Brick, GamePhase, GameState, Paddle, Timer, TimerKind};

/// Opaque id of a requested refresh callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// The host side of the refresh loop
pub trait FrameHost {
    /// Ask for one refresh callback
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a callback that hasn't run yet
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Receives the result of every frame
pub trait Presenter {
    fn present(&mut self, snapshot: &Snapshot<'_>, hud: &Hud);
}

/// Read-only view of the entities for rendering
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub paddle: &'a Paddle,
    pub ball: &'a Ball,
    pub bricks: &'a [Brick],
    pub phase: GamePhase,
}

impl<'a> Snapshot<'a> {
    pub fn of(state: &'a GameState) -> Self {
        Self {
            paddle: &state.paddle,
            ball: &state.ball,
            bricks: &state.bricks,
            phase: state.phase,
        }
    }
}

/// Values for the score/lives/level display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub message: String,
    /// Only true after game over
    pub restart_visible: bool,
    pub fps: u32,
}

impl Hud {
    pub fn of(state: &GameState, fps: u32) -> Self {
        Self {
            score: state.score,
            lives: state.lives,
            level: state.level,
            message: state.message.text(),
            restart_visible: state.restart_visible(),
            fps,
        }
    }
}

/// Frame timing for the FPS readout
#[derive(Debug, Clone)]
struct FrameStats {
    frames: u64,
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frames: 0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FrameStats {
    fn record(&mut self, now_ms: f64) {
        self.frames += 1;
        self.frame_times[self.frame_index] = now_ms;
        self.frame_index = (self.frame_index + 1) % self.frame_times.len();

        // Oldest sample sits where the next write goes
        let oldest = self.frame_times[self.frame_index];
        if self.frames >= self.frame_times.len() as u64 {
            let elapsed = now_ms - oldest;
            if elapsed > 0.0 {
                self.fps = ((self.frame_times.len() - 1) as f64 * 1000.0 / elapsed).round() as u32;
            }
        }
    }
}

/// A timer waiting for its due time
#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    due_ms: f64,
    timer: Timer,
}

/// Owns one session and drives it from host refresh callbacks
pub struct FrameDriver<H: FrameHost> {
    state: GameState,
    input: InputState,
    host: H,
    pending_frame: Option<FrameHandle>,
    timers: Vec<PendingTimer>,
    stats: FrameStats,
}

impl<H: FrameHost> FrameDriver<H> {
    pub fn new(seed: u64, host: H) -> Self {
        Self {
            state: GameState::new(seed),
            input: InputState::new(),
            host,
            pending_frame: None,
            timers: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    /// (Re)start the loop, withdrawing any refresh already requested
    pub fn start(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.host.cancel_frame(handle);
        }
        self.pending_frame = Some(self.host.request_frame());
    }

    /// Whether a refresh callback is outstanding
    pub fn is_running(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Restart control: rebuild the session and the loop (only after game over)
    pub fn restart(&mut self) -> bool {
        if !self.state.restart() {
            return false;
        }
        self.start();
        true
    }

    /// Deliver every timer due at `now_ms`, oldest first
    ///
    /// Hosts with real timers may call this between frames; `on_frame` calls it
    /// too. A fired level advance restarts the loop.
    pub fn advance_timers(&mut self, now_ms: f64) {
        self.timers.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        let due = self.timers.partition_point(|t| t.due_ms <= now_ms);
        let fired: Vec<PendingTimer> = self.timers.drain(..due).collect();

        for pending in fired {
            if self.state.fire_timer(pending.timer) && pending.timer.kind == TimerKind::NextLevel {
                self.start();
            }
        }
    }

    /// One display refresh; returns true if another refresh was requested
    pub fn on_frame(&mut self, now_ms: f64, presenter: &mut impl Presenter) -> bool {
        // This refresh is the one we were waiting for
        self.pending_frame = None;

        self.advance_timers(now_ms);

        let input = self.input.take_tick_input();
        let outcome = sim::step(&mut self.state, &input);
        for timer in outcome.timers {
            self.timers.push(PendingTimer {
                due_ms: now_ms + timer.delay_ms(),
                timer,
            });
        }

        self.stats.record(now_ms);
        presenter.present(&Snapshot::of(&self.state), &self.hud());

        if self.state.phase.is_terminal() {
            log::info!("Frame loop stopped after {} frames", self.stats.frames);
            return false;
        }
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.host.request_frame());
        }
        true
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable session access for hosts that script play (tests, tools)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn hud(&self) -> Hud {
        Hud::of(&self.state, self.stats.fps)
    }

    pub fn frames(&self) -> u64 {
        self.stats.frames
    }

    /// Timers scheduled but not yet fired
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

/// A host that only records requests; the caller decides when frames run
///
/// Used by the headless runner and tests.
#[derive(Debug, Default)]
pub struct ManualHost {
    next_id: u64,
    /// Requests that have not been canceled
    pub outstanding: Vec<FrameHandle>,
    pub requested: u64,
    pub canceled: u64,
}

impl FrameHost for ManualHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next_id);
        self.outstanding.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.canceled += 1;
        self.outstanding.retain(|h| *h != handle);
    }
}

impl ManualHost {
    /// Take the next outstanding request, as the display would when it refreshes
    pub fn next_frame(&mut self) -> Option<FrameHandle> {
        if self.outstanding.is_empty() {
            None
        } else {
            Some(self.outstanding.remove(0))
        }
    }
}
