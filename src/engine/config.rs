use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::DEFAULT_NOISE_SEED, synth::StealPolicy, ProcessSpec, MAX_BLOCK_SIZE,
    MAX_CHANNELS,
};

/// Everything fixed for the lifetime of a `SynthEngine`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Longest block the engine renders in one pass. Longer blocks are split.
    pub max_block_size: usize,
    /// 1 (mono) or 2 (stereo).
    pub channels: usize,
    /// Size of the voice pool.
    pub voices: usize,
    pub steal_policy: StealPolicy,
    /// Base seed for the per-voice noise generators.
    pub noise_seed: u64,
    /// Samples kept in the scope ring.
    pub scope_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_block_size: 512,
            channels: 2,
            voices: 8,
            steal_policy: StealPolicy::default(),
            noise_seed: DEFAULT_NOISE_SEED,
            scope_len: 2048,
        }
    }
}

impl EngineConfig {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }

    pub fn with_steal_policy(mut self, steal_policy: StealPolicy) -> Self {
        self.steal_policy = steal_policy;
        self
    }

    pub fn with_noise_seed(mut self, noise_seed: u64) -> Self {
        self.noise_seed = noise_seed;
        self
    }

    pub fn with_scope_len(mut self, scope_len: usize) -> Self {
        self.scope_len = scope_len;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize(self.max_block_size));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(ConfigError::UnsupportedChannels(self.channels));
        }
        if self.voices == 0 {
            return Err(ConfigError::NoVoices);
        }
        if self.scope_len == 0 {
            return Err(ConfigError::EmptyScope);
        }
        Ok(())
    }

    pub fn process_spec(&self) -> ProcessSpec {
        ProcessSpec::new(self.sample_rate, self.max_block_size, self.channels)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    InvalidSampleRate(f32),
    InvalidBlockSize(usize),
    UnsupportedChannels(usize),
    NoVoices,
    EmptyScope,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSampleRate(sr) => {
                write!(f, "Sample rate must be finite and positive, got {sr}")
            }
            ConfigError::InvalidBlockSize(size) => {
                write!(f, "Block size must be in 1..={MAX_BLOCK_SIZE}, got {size}")
            }
            ConfigError::UnsupportedChannels(channels) => {
                write!(f, "Expected 1 to {MAX_CHANNELS} channels, got {channels}")
            }
            ConfigError::NoVoices => write!(f, "Voice pool must hold at least one voice"),
            ConfigError::EmptyScope => write!(f, "Scope ring must hold at least one sample"),
        }
    }
}

impl std::error::Error for ConfigError {}
