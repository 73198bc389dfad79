use std::time::{Duration, Instant};

/// Wall clock for a playground session. Timestamps handed to the playground are offsets from
/// the session start so tests can drive it with synthetic times.
pub struct Time {
    start: Instant,
}

impl Time {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    pub fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
