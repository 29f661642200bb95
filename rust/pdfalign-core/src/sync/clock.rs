//! Time sources for the sync controller.
//!
//! The controller itself only sees `now_ms` values; clocks live at the edge
//! (the JS binding) so tests can drive time by hand.

use instant::Instant;

pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> f64;
}

/// `performance.now()` on wasm, `std::time::Instant` elsewhere
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    pub now_ms: f64,
}

impl ManualClock {
    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}
