use crate::SplitMix64;

/// Fixed-step clock state handed to every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    pub seed: u64,
}

impl TickContext {
    pub fn new(dt_seconds: f32, seed: u64) -> Self {
        Self {
            tick: 0,
            dt_seconds,
            seed,
        }
    }

    /// Context for the following tick with a possibly different step length.
    pub fn next(self, dt_seconds: f32) -> Self {
        Self {
            tick: self.tick.wrapping_add(1),
            dt_seconds,
            seed: self.seed,
        }
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.tick as f32 * self.dt_seconds
    }

    pub fn rng_for_stream(&self, stream: u64) -> SplitMix64 {
        SplitMix64::for_stream(self.seed ^ self.tick.rotate_left(32), stream)
    }
}
