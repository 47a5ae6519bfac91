//! Mixer/Post stage: mute, equal-power pan and master gain.

use std::f32::consts::FRAC_PI_4;

use crate::{dsp::mix::apply_gain_ramp, io::AudioBuffer};

/*
Equal-Power Pan
===============

    θ = (pan + 1) · π/4          pan ∈ [-1, 1]  →  θ ∈ [0, π/2]

    left  = cos(θ)
    right = sin(θ)

  pan = -1   θ = 0     left 1.0    right 0.0
  pan =  0   θ = π/4   left 0.707  right 0.707   (-3 dB each, constant power)
  pan = +1   θ = π/2   left 0.0    right 1.0

left² + right² = 1 everywhere, so a sound keeps its loudness while it moves.

Mono output ignores pan and applies master gain only.

Master gain ramps linearly from the previous block's value to the new one
across each block, so moving the volume control doesn't zipper.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGains {
    pub left: f32,
    pub right: f32,
}

/// Constant-power gains for `pan` in [-1, 1] (clamped).
#[inline]
pub fn equal_power_gains(pan: f32) -> PanGains {
    let pan = if pan.is_finite() { pan.clamp(-1.0, 1.0) } else { 0.0 };
    let theta = (pan + 1.0) * FRAC_PI_4;
    PanGains {
        left: theta.cos(),
        right: theta.sin(),
    }
}

pub struct Mixer {
    pan: f32,
    master_gain: f32,
    previous_gain: f32,
    muted: bool,
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            pan: 0.0,
            master_gain: 1.0,
            previous_gain: 1.0,
            muted: false,
        }
    }

    pub fn set_pan(&mut self, pan: f32) {
        self.pan = if pan.is_finite() { pan.clamp(-1.0, 1.0) } else { 0.0 };
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain = if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 };
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Jump the gain ramp to the current target (e.g. after prepare).
    pub fn reset(&mut self) {
        self.previous_gain = self.master_gain;
    }

    /// Apply mute, pan and master gain to the first `len` samples of `buffer`.
    pub fn process(&mut self, buffer: &mut AudioBuffer, len: usize) {
        let len = len.min(buffer.len());

        if self.muted {
            buffer.clear_range(0, len);
            self.previous_gain = 0.0;
            return;
        }

        let start = self.previous_gain;
        let end = self.master_gain;
        self.previous_gain = end;

        match buffer.num_channels() {
            0 => {}
            1 => apply_gain_ramp(&mut buffer.channel_mut(0)[..len], start, end),
            _ => {
                let gains = equal_power_gains(self.pan);
                apply_gain_ramp(
                    &mut buffer.channel_mut(0)[..len],
                    start * gains.left,
                    end * gains.left,
                );
                apply_gain_ramp(
                    &mut buffer.channel_mut(1)[..len],
                    start * gains.right,
                    end * gains.right,
                );
            }
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
