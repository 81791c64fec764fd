//! Keyboard and pointer input handling
//!
//! Hosts feed raw events in as they arrive; the frame driver drains one
//! `TickInput` per frame. Held keys accumulate press/release, the pointer is
//! last-write-wins, launch is one-shot. Restart is not routed through here:
//! the frame loop is stopped after game over, so hosts call
//! `FrameDriver::restart` directly.

use std::collections::HashSet;

use crate::sim::TickInput;

/// Keys the game cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Launch,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            " " | "Enter" => Some(Key::Launch),
            _ => None,
        }
    }
}

/// Accumulated input between two frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    pointer_x: Option<f32>,
    launch: bool,
    /// Demo mode toggle
    pub autopilot: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key press; returns true if the key is one of ours
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        if key == Key::Launch {
            self.launch = true;
        }
        self.held.insert(key);
        true
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        match Key::from_dom(key) {
            Some(key) => {
                self.held.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Pointer moved to `x` (playfield coordinates); non-finite values are dropped
    pub fn pointer_moved(&mut self, x: f32) {
        if x.is_finite() {
            self.pointer_x = Some(x);
        }
    }

    /// Pointer left the playfield
    pub fn pointer_cleared(&mut self) {
        self.pointer_x = None;
    }

    /// Click on the playfield
    pub fn click(&mut self) {
        self.launch = true;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn pointer_x(&self) -> Option<f32> {
        self.pointer_x
    }

    /// Build this frame's input and clear the one-shot signals
    pub fn take_tick_input(&mut self) -> TickInput {
        let input = TickInput {
            pointer_x: self.pointer_x,
            left: self.is_held(Key::Left),
            right: self.is_held(Key::Right),
            launch: self.launch,
            restart: false,
            autopilot: self.autopilot,
        };
        self.launch = false;
        input
    }
}
