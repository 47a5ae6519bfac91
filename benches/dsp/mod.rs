//! Benchmarks for low-level DSP primitives.

mod envelope;
mod filter;
mod mix;
mod oscillator;

pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use mix::bench_mix;
pub use oscillator::bench_oscillator;
