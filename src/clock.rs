//! Fixed-step game clock.
//!
//! The tick is the only source of game time. Frame timestamps from the
//! browser are converted into whole ticks by [`FixedStep`]; nothing else
//! reads the wall clock to decide how far notes have moved.

use crate::notes::Note;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockTick {
    Running,
    /// Emitted once, on the tick that brought `time_left` to zero.
    Expired,
    /// Already at zero before this tick.
    Idle,
}

/// Countdown of remaining play time in seconds.
#[derive(Clone, Debug)]
pub struct GameClock {
    time_left: f64,
    duration: f64,
}

impl GameClock {
    pub fn new(duration_secs: f64) -> Self {
        Self { time_left: duration_secs, duration: duration_secs }
    }

    pub fn time_left(&self) -> f64 {
        self.time_left
    }

    /// Remaining fraction in `0.0..=1.0` (progress bar).
    pub fn remaining_ratio(&self) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (self.time_left / self.duration).clamp(0.0, 1.0)
    }

    pub fn tick(&mut self, dt: f64) -> ClockTick {
        if self.time_left <= 0.0 {
            return ClockTick::Idle;
        }
        if self.time_left <= dt {
            self.time_left = 0.0;
            return ClockTick::Expired;
        }
        self.time_left -= dt;
        ClockTick::Running
    }
}

/// Move every note `speed` units toward the floor and drop the ones that reached it.
pub fn advance_notes(notes: &mut Vec<Note>, speed: f64, floor: f64) {
    for note in notes.iter_mut() {
        note.position = (note.position - speed).max(floor);
    }
    notes.retain(|n| n.position > floor);
}

/// Accumulates frame time and releases it as whole fixed-length ticks.
#[derive(Clone, Debug)]
pub struct FixedStep {
    step_ms: f64,
    max_steps: u32,
    last_ms: Option<f64>,
    carry_ms: f64,
}

impl FixedStep {
    pub fn new(step_ms: f64, max_steps: u32) -> Self {
        Self { step_ms, max_steps, last_ms: None, carry_ms: 0.0 }
    }

    /// Forget the previous timestamp (e.g. when a new session starts).
    pub fn reset(&mut self) {
        self.last_ms = None;
        self.carry_ms = 0.0;
    }

    /// Number of ticks owed for a frame at `now_ms`. The first frame after a
    /// reset only primes the timer. Backlog beyond `max_steps` is dropped.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0;
        };
        self.carry_ms += (now_ms - last).max(0.0);
        let owed = (self.carry_ms / self.step_ms).floor();
        if owed >= self.max_steps as f64 {
            self.carry_ms = 0.0;
            return self.max_steps;
        }
        self.carry_ms -= owed * self.step_ms;
        owed as u32
    }
}
