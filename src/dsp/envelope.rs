#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MIN_TIME;

/*
ADSR Envelope
=============

A linear attack/decay/sustain/release generator. Its output multiplies a
voice's signal, so it decides when a note is heard and when it is over.

Vocabulary
----------

  level       Current output, 0.0 to 1.0.

  stage       Idle, Attack, Decay, Sustain or Release.

  gate        note_on raises it, note_off lowers it.

  rate        How far `level` moves per sample in a stage:
                  attack   1.0 / (attack_time · sample_rate)
                  decay    (1.0 - sustain) / (decay_time · sample_rate)
                  release  level_at_note_off / (release_time · sample_rate)


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
         A    D      S          R


Continuity Rules
----------------

The level never jumps. Two transitions make that non-obvious:

  retrigger   note_on while a note is still sounding starts Attack from the
              CURRENT level, climbing at the normal attack rate. A voice
              stolen mid-release therefore fades back up instead of snapping
              to zero and clicking.

  release     note_off from any stage (Attack, Decay or Sustain) ramps from
              the CURRENT level to 0 over release_time. It never first jumps
              to the sustain level.

    attack interrupted at L:

    1.0 ┐
        │
    L   │    ╱╲
        │   ╱   ╲
    0.0 └──╱──────╲──→
           A  │ R  (reaches 0 after release_time, never above L)
              note_off


Degenerate Times
----------------

A stage time at or below MIN_TIME would divide by (almost) zero. Such stages
are skipped instead: a zero attack jumps to 1.0, a zero decay lands on the
sustain level, and a zero release goes straight to Idle.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Ramping up to 1.0 from wherever the level was
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

/// Stage times in seconds and the sustain level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

pub struct Envelope {
    params: AdsrParams,
    sample_rate: f32,

    stage: EnvelopeState,
    level: f32,

    // Release bookkeeping (snapshotted at note_off so the ramp ends exactly at 0)
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            params: AdsrParams::default(),
            sample_rate,
            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self::new(sample_rate);
        env.set_parameters(AdsrParams {
            attack,
            decay,
            sustain,
            release,
        });
        env
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Replace the stage times. Negative or NaN inputs are clamped.
    pub fn set_parameters(&mut self, params: AdsrParams) {
        let time = |t: f32| if t.is_finite() { t.max(0.0) } else { 0.0 };
        let sustain = if params.sustain.is_finite() {
            params.sustain.clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.params = AdsrParams {
            attack: time(params.attack),
            decay: time(params.decay),
            sustain,
            release: time(params.release),
        };
    }

    pub fn parameters(&self) -> AdsrParams {
        self.params
    }

    /// Gate high: climb towards 1.0 from the current level.
    pub fn note_on(&mut self) {
        self.release_elapsed_samples = 0;

        if self.params.attack <= MIN_TIME {
            self.level = 1.0;
            self.enter_decay();
        } else {
            self.stage = EnvelopeState::Attack;
        }
    }

    /// Gate low: ramp from the current level to zero.
    pub fn note_off(&mut self) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        if self.params.release <= MIN_TIME || self.level <= 0.0 {
            self.reset();
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples =
            (self.params.release * self.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    fn enter_decay(&mut self) {
        if self.params.decay <= MIN_TIME {
            self.level = self.params.sustain;
            self.stage = EnvelopeState::Sustain;
        } else {
            self.stage = EnvelopeState::Decay;
        }
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                if self.params.attack <= MIN_TIME {
                    self.level = 1.0;
                } else {
                    self.level += 1.0 / (self.params.attack * self.sample_rate);
                }

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.enter_decay();
                }
            }

            EnvelopeState::Decay => {
                // Times can change mid-stage, so re-check before dividing
                let target = self.params.sustain;
                if self.params.decay <= MIN_TIME {
                    self.level = target;
                } else {
                    self.level -= (1.0 - target) / (self.params.decay * self.sample_rate);
                }

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeState::Release => {
                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.reset();
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Write a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Multiply every sample by the envelope value for its position.
    pub fn apply_to_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_sample();
        }
    }

    /// False only once the envelope is back at Idle.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
