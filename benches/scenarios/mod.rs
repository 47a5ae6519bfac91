//! Real-world scenario benchmarks.
//!
//! Whole voices, a saturated voice pool, and the engine's full block path.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
