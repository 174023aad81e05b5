//! Wall clock → engine clock, using an accumulator.
//!
//! `draw_web()` calls at ~60fps with variable, fractional deltas. GameTime
//! turns them into whole milliseconds for [`crate::engine::GameEngine::advance`],
//! carrying the fractional remainder so nothing is lost between frames.

pub struct GameTime {
    /// Largest delta accepted per frame (ms).
    max_delta_ms: f64,
    /// Fractional milliseconds not yet handed to the engine.
    accumulator: f64,
    /// Total milliseconds handed to the engine since creation.
    pub total_ms: u64,
    /// Timestamp of the last update (ms), None if first frame.
    last_timestamp: Option<f64>,
}

impl GameTime {
    /// `max_delta_ms` caps a single frame, so a backgrounded tab does not
    /// come back to a burst of production.
    pub fn new(max_delta_ms: u64) -> Self {
        Self {
            max_delta_ms: max_delta_ms as f64,
            accumulator: 0.0,
            total_ms: 0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp (from `performance.now()` or similar) and
    /// get the whole milliseconds to advance the engine by.
    pub fn update(&mut self, now_ms: f64) -> u64 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, self.max_delta_ms),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        let elapsed = whole as u64;
        self.total_ms += elapsed;
        elapsed
    }
}
