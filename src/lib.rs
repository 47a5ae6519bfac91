pub mod dsp;
pub mod engine; // Per-block orchestration: snapshot -> voices -> post
pub mod io;
pub mod params; // Thread-safe control cells and per-block snapshots
pub mod synth; // Voice management and polyphony
pub mod telemetry;

pub use engine::{ConfigError, EngineConfig, SynthEngine};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_CHANNELS: usize = 2;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Sample rate, block size and channel count a processor is prepared for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f32,
    pub max_block_size: usize,
    pub channels: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f32, max_block_size: usize, channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channels,
        }
    }

    #[inline]
    pub fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::new(48_000.0, 512, 2)
    }
}
