//! Fixed-step update scheduling.

/// Accumulates real frame time and hands out whole fixed-size steps.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStep {
    step_ms: f64,
    max_steps: u32,
    accumulator: f64,
}

impl FixedStep {
    pub fn new(step_ms: f64, max_steps: u32) -> Self {
        Self {
            step_ms,
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Add `frame_ms` of real time and return how many steps to run.
    ///
    /// At most `max_steps` are returned; time beyond that is dropped so a
    /// long stall does not trigger a burst of catch-up updates.
    pub fn advance(&mut self, frame_ms: f64) -> u32 {
        if self.step_ms <= 0.0 {
            return 0;
        }
        self.accumulator += frame_ms.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step_ms && steps < self.max_steps {
            self.accumulator -= self.step_ms;
            steps += 1;
        }
        if steps == self.max_steps {
            self.accumulator = self.accumulator.min(self.step_ms);
        }
        steps
    }

    /// Leftover time as a fraction of one step.
    pub fn alpha(&self) -> f64 {
        if self.step_ms <= 0.0 {
            return 0.0;
        }
        (self.accumulator / self.step_ms).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
