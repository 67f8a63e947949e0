//! Fixed-timestep simulation clock.
//!
//! The host calls [`GameTime::update`] once per animation frame with a
//! wall-clock timestamp; the accumulator turns the variable frame delta into a
//! whole number of ticks so production stays deterministic and testable.

pub struct GameTime {
    ms_per_tick: f64,
    /// Frame deltas above this are not stepped tick by tick.
    max_frame_ms: f64,
    accumulator: f64,
    /// Wall-clock time held back by the frame clamp, not yet simulated.
    skipped_ms: f64,
    pub total_ticks: u64,
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32, max_frame_ms: f64) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            max_frame_ms,
            accumulator: 0.0,
            skipped_ms: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp and get the number of ticks to simulate.
    /// The first call only establishes the baseline and returns 0.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let elapsed = match self.last_timestamp {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);
        let delta = elapsed.min(self.max_frame_ms);
        self.skipped_ms += elapsed - delta;

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }

    /// Simulated seconds covered by `ticks`.
    pub fn seconds(&self, ticks: u32) -> f64 {
        ticks as f64 * self.ms_per_tick / 1000.0
    }

    /// Seconds the frame clamp held back since the last call. The caller
    /// credits them in one closed-form step.
    pub fn take_skipped_secs(&mut self) -> f64 {
        std::mem::take(&mut self.skipped_ms) / 1000.0
    }

    /// Forget the previous frame, e.g. after a load or reinitialize, so the
    /// time spent rebuilding is not simulated twice.
    pub fn rebase(&mut self) {
        self.last_timestamp = None;
        self.accumulator = 0.0;
        self.skipped_ms = 0.0;
    }
}

/// Current wall-clock time in epoch milliseconds.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Current wall-clock time in epoch milliseconds.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
