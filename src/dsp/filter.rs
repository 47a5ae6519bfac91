use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{io::AudioBuffer, ProcessSpec, MAX_CHANNELS};

/*
State-Variable Filter (TPT / zero-delay feedback)
=================================================

Two integrators in a loop produce lowpass, bandpass and highpass outputs from
the same state at once; `filter_type` just picks which one is heard.

| type      | passes          | rejects      |
| --------- | --------------- | ------------ |
| low-pass  | below cutoff    | above cutoff |
| high-pass | above cutoff    | below cutoff |
| band-pass | around cutoff   | both sides   |

Coefficients per block:

    g = tan(π · cutoff / sample_rate)    (prewarped integrator gain)
    k = 1 / resonance                    (damping)

resonance = 1/√2 gives a flat Butterworth response. Lower values damp the
peak, higher values ring. The damping must stay positive, so resonance is
clamped to [MIN_RESONANCE, MAX_RESONANCE] and the cutoff is kept strictly
inside (0, Nyquist); tan() explodes at Nyquist.

Integrator memory (ic1eq, ic2eq) lives per channel and is only cleared by
`prepare`/`reset`. Note events never touch it, so consecutive notes through
the same voice don't click and cutoff sweeps stay smooth across blocks.
*/

pub const MIN_RESONANCE: f32 = 0.1;
pub const MAX_RESONANCE: f32 = 1.5;
pub const DEFAULT_RESONANCE: f32 = std::f32::consts::FRAC_1_SQRT_2;
pub const MIN_CUTOFF_HZ: f32 = 10.0;
const MAX_CUTOFF_RATIO: f32 = 0.49;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
}

impl FilterType {
    /// Decode a choice index (0 LP, 1 HP, 2 BP). Out of range stays low-pass.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => FilterType::HighPass,
            2 => FilterType::BandPass,
            _ => FilterType::LowPass,
        }
    }

    pub fn index(self) -> i32 {
        self as i32
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

pub struct SVFilter {
    state: [ChannelState; MAX_CHANNELS],
    sample_rate: f32,
    cutoff_hz: f32,
    resonance: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            state: [ChannelState::default(); MAX_CHANNELS],
            sample_rate: ProcessSpec::default().sample_rate,
            cutoff_hz: 1000.0,
            resonance: DEFAULT_RESONANCE,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        let mut filter = Self::new(FilterType::LowPass);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        debug_assert!(spec.channels <= MAX_CHANNELS);
        self.sample_rate = spec.sample_rate;
        self.reset();
    }

    #[inline]
    fn coefficients(&self) -> (f32, f32) {
        let max_cutoff = self.sample_rate * MAX_CUTOFF_RATIO;
        let cutoff = self.cutoff_hz.clamp(MIN_CUTOFF_HZ.min(max_cutoff), max_cutoff);
        let g = (PI * cutoff / self.sample_rate).tan();
        let k = 1.0 / self.resonance;
        (g, k)
    }

    #[inline]
    fn tick(state: &mut ChannelState, sample: f32, g: f32, k: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - state.ic2eq;
        let v1 = h * (state.ic1eq + g * v3);
        let v2 = state.ic2eq + g * v1;

        state.ic1eq = 2.0 * v1 - state.ic1eq;
        state.ic2eq = 2.0 * v2 - state.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    /// Filter one channel in place using that channel's integrator state.
    pub fn process_channel(&mut self, channel: usize, buffer: &mut [f32]) {
        debug_assert!(channel < MAX_CHANNELS);
        let (g, k) = self.coefficients();
        let filter_type = self.filter_type;

        let Some(state) = self.state.get_mut(channel) else {
            return;
        };

        for sample in buffer.iter_mut() {
            let outputs = Self::tick(state, *sample, g, k);

            *sample = match filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::HighPass => outputs.highpass,
                FilterType::BandPass => outputs.bandpass,
            }
        }
    }

    /// Filter every channel of `buffer` over `len` samples.
    pub fn process(&mut self, buffer: &mut AudioBuffer, len: usize) {
        for channel in 0..buffer.num_channels().min(MAX_CHANNELS) {
            let samples = buffer.channel_mut(channel);
            let len = len.min(samples.len());
            self.process_channel(channel, &mut samples[..len]);
        }
    }

    pub fn reset(&mut self) {
        self.state = [ChannelState::default(); MAX_CHANNELS];
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Stored as given (non-finite becomes the minimum); clamped to
    /// (0, Nyquist) against the prepared sample rate when processing.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = if cutoff.is_finite() {
            cutoff.max(MIN_CUTOFF_HZ)
        } else {
            MIN_CUTOFF_HZ
        };
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    /// Effective cutoff after clamping below Nyquist.
    pub fn effective_cutoff(&self) -> f32 {
        let (g, _) = self.coefficients();
        g.atan() * self.sample_rate / PI
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = if resonance.is_finite() {
            resonance.clamp(MIN_RESONANCE, MAX_RESONANCE)
        } else {
            DEFAULT_RESONANCE
        };
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }
}
