use std::f32::consts::{FRAC_2_PI, PI, TAU};

use rand::{rngs::SmallRng, Rng, RngCore, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::smooth::SmoothedValue, ProcessSpec};

/*
Phase-Accumulator Oscillator
============================

Every periodic waveform here is a pure function of phase. The oscillator
keeps one number, `phase`, that walks around a circle:

    phase:  0 ──────────→ 2π  (wrap)  0 ──────────→ 2π  ...
    shape(phase - π):   -π ─────────→ π

Each sample the phase advances by

    increment = 2π · frequency / sample_rate

and wraps back into [0, 2π). Because the wrap happens every sample the phase
never grows without bound, no matter how long a note is held.

The shape functions take x = phase - π, so they are all written over the
symmetric interval [-π, π]:

    Sine       sin(x)
    Square     -1 for x < 0, +1 otherwise
    Saw        x / π                       (linear ramp -1 → +1)
    Triangle   asin(sin(x)) · 2/π
    Additive2  sin(x) + 0.3·sin(2x)                 (normalized)
    Additive3  sin(x) + 0.3·sin(2x) + 0.15·sin(3x)  (normalized)
    Noise      uniform random in [-1, 1), drawn fresh for every sample

No band-limiting. Square and Saw have infinitely many harmonics, so at high
fundamentals the ones above Nyquist fold back as aliasing.


Frequency Updates
-----------------

Two ways to change pitch:

  smoothed    The frequency ramps to the new value over FREQUENCY_RAMP_SECONDS.
              Use this for knob and UI changes so the pitch glides instead of
              stepping.

  immediate   The new frequency drives the very next phase increment. FM needs
              this: the modulator has to bend the carrier's phase step on the
              exact sample it was produced.


Frequency Modulation
--------------------

`process_with_fm` recomputes the instantaneous frequency every sample:

    f[i] = base_frequency + modulator[i] · depth

`depth` is in Hz per unit of modulator, so a full-scale modulator with
depth = 200 swings the carrier ±200 Hz around its base pitch. The result is
clamped to [0, Nyquist] so the phase always moves forward.
*/

const FREQUENCY_RAMP_SECONDS: f32 = 0.05;
const DEFAULT_FREQUENCY: f32 = 440.0;
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_0F_EFFE;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveformKind {
    #[default]
    Sine,
    Square,
    Saw,
    Triangle,
    Noise,
    Additive2,
    Additive3,
}

impl WaveformKind {
    pub const ALL: [WaveformKind; 7] = [
        WaveformKind::Sine,
        WaveformKind::Square,
        WaveformKind::Saw,
        WaveformKind::Triangle,
        WaveformKind::Noise,
        WaveformKind::Additive2,
        WaveformKind::Additive3,
    ];

    /// Decode a choice index. Anything out of range falls back to sine.
    pub fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(WaveformKind::Sine)
    }

    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn is_periodic(self) -> bool {
        !matches!(self, WaveformKind::Noise)
    }

    /// Evaluate the waveform at `x` in [-π, π]. Only `Noise` touches `rng`.
    #[inline]
    pub fn evaluate<R: RngCore + ?Sized>(self, x: f32, rng: &mut R) -> f32 {
        match self {
            WaveformKind::Sine => x.sin(),
            WaveformKind::Square => {
                if x < 0.0 {
                    -1.0
                } else {
                    1.0
                }
            }
            WaveformKind::Saw => x / PI,
            WaveformKind::Triangle => x.sin().asin() * FRAC_2_PI,
            WaveformKind::Noise => rng.random::<f32>() * 2.0 - 1.0,
            WaveformKind::Additive2 => (x.sin() + 0.3 * (2.0 * x).sin()) / 1.3,
            WaveformKind::Additive3 => {
                (x.sin() + 0.3 * (2.0 * x).sin() + 0.15 * (3.0 * x).sin()) / 1.45
            }
        }
    }
}

pub struct Oscillator<R: RngCore = SmallRng> {
    waveform: WaveformKind,
    phase: f32,
    frequency: SmoothedValue,
    gain: f32,
    sample_rate: f32,
    rng: R,
}

impl Oscillator<SmallRng> {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_NOISE_SEED)
    }

    /// Seed the noise source. Equal seeds render identical noise.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for Oscillator<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> Oscillator<R> {
    pub fn with_rng(rng: R) -> Self {
        let spec = ProcessSpec::default();
        let mut frequency = SmoothedValue::new(DEFAULT_FREQUENCY);
        frequency.reset(spec.sample_rate, FREQUENCY_RAMP_SECONDS);

        Self {
            waveform: WaveformKind::Sine,
            phase: 0.0,
            frequency,
            gain: 1.0,
            sample_rate: spec.sample_rate,
            rng,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.frequency.reset(spec.sample_rate, FREQUENCY_RAMP_SECONDS);
        self.phase = 0.0;
    }

    /// Restart the cycle at phase 0 and drop any frequency ramp in flight.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.frequency.set_current_and_target(self.frequency.target());
    }

    pub fn set_waveform(&mut self, waveform: WaveformKind) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> WaveformKind {
        self.waveform
    }

    pub fn set_frequency(&mut self, hz: f32, smoothed: bool) {
        let hz = if hz.is_finite() { hz.max(0.0) } else { 0.0 };
        if smoothed {
            self.frequency.set_target(hz);
        } else {
            self.frequency.set_current_and_target(hz);
        }
    }

    /// Target frequency (what a ramp in progress is heading towards).
    pub fn frequency(&self) -> f32 {
        self.frequency.target()
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    #[inline]
    fn tick(&mut self, frequency: f32) -> f32 {
        let value = self.waveform.evaluate(self.phase - PI, &mut self.rng) * self.gain;

        let frequency = frequency.clamp(0.0, self.sample_rate * 0.5);
        self.phase += TAU * frequency / self.sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }

        debug_assert!((0.0..TAU).contains(&self.phase));
        value
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let frequency = self.frequency.next();
        self.tick(frequency)
    }

    /// One sample with the frequency bent by `modulator · depth` Hz.
    #[inline]
    pub fn next_sample_fm(&mut self, modulator: f32, depth: f32) -> f32 {
        let frequency = self.frequency.next() + modulator * depth;
        self.tick(frequency)
    }

    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn process_with_fm(&mut self, buffer: &mut [f32], modulator: &[f32], depth: f32) {
        debug_assert!(modulator.len() >= buffer.len());

        for (sample, &m) in buffer.iter_mut().zip(modulator) {
            *sample = self.next_sample_fm(m, depth);
        }
    }
}
