// Tick time source.

use std::time::Instant;

pub trait Clock {
    /// Seconds since the clock started, fractional and non-decreasing.
    fn now_secs(&self) -> f64;
}

/// Wall-clock seconds measured from creation.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backwards() {
        let clock = MonotonicClock::start();
        let a = clock.now_secs();
        let b = clock.now_secs();
        assert!(a >= 0.0 && b >= a);
    }
}
