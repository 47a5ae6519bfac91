//! Linear parameter ramps.

/*
Parameter Smoothing
===================

When a control value jumps (a knob is turned, a preset is loaded) the signal
it drives jumps with it. For gain and pitch that step is audible as a click
or "zipper" noise. A ramp spreads the change over a short window:

    value
      ▲          ┌──────── target
      │         ╱
      │        ╱   ramp_samples
      │───────╱
      └──────────────────────→ samples

Each call to `next()` moves `current` one step closer, so after
`ramp_samples` calls it lands exactly on `target`.
*/

#[derive(Debug, Clone, Copy)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl SmoothedValue {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
            ramp_samples: 0,
        }
    }

    /// Set the ramp length from a duration. Does not disturb the current value.
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f32) {
        self.ramp_samples = (sample_rate * ramp_seconds).max(0.0).floor() as u32;
        self.set_current_and_target(self.target);
    }

    /// Jump straight to `value`, cancelling any ramp in flight.
    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    pub fn set_target(&mut self, value: f32) {
        if value == self.target {
            return;
        }

        if self.ramp_samples == 0 {
            self.set_current_and_target(value);
            return;
        }

        self.target = value;
        self.remaining = self.ramp_samples;
        self.step = (self.target - self.current) / self.ramp_samples as f32;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.remaining == 0 {
            return self.target;
        }

        self.remaining -= 1;
        if self.remaining == 0 {
            self.current = self.target;
        } else {
            self.current += self.step;
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }
}
