//! Low-level DSP primitives used by the voice and engine layers.
//!
//! These components are allocation-free and realtime-safe once prepared,
//! making them safe to embed directly inside voice structs. They stay focused
//! on the signal-processing math; voices layer on note lifecycle and mixing.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter with lowpass/highpass/bandpass responses.
pub mod filter;
/// Crossfade, summing and gain helpers.
pub mod mix;
/// Phase-accumulator oscillator with per-sample FM.
pub mod oscillator;
/// Mixer/Post stage: mute, equal-power pan, master gain.
pub mod pan;
/// Linear parameter ramps.
pub mod smooth;

pub use envelope::{AdsrParams, Envelope, EnvelopeState};
pub use filter::{FilterType, SVFilter};
pub use oscillator::{Oscillator, WaveformKind};
pub use pan::Mixer;
