//! Benchmarks for the engine's full per-block path.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use effem::{
    io::AudioBuffer,
    params::{ParamId, SynthParams},
    synth::NoteEvent,
    EngineConfig, SynthEngine,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        // Snapshot, four-note chord, pan and gain, scope tap
        let params = Arc::new(SynthParams::new());
        params.set(ParamId::Fm1Amount, 100.0);
        params.set(ParamId::FilterCutoff, 3_000.0);
        params.set(ParamId::Pan, 0.25);

        let config = EngineConfig::new(SAMPLE_RATE).with_max_block_size(size);
        let Ok(mut engine) = SynthEngine::new(config, Arc::clone(&params)) else {
            continue;
        };
        let mut buffer = AudioBuffer::new(config.channels, size);
        let chord = [
            NoteEvent::note_on(0, 57, 0.8),
            NoteEvent::note_on(0, 60, 0.8),
            NoteEvent::note_on(0, 64, 0.8),
            NoteEvent::note_on(0, 67, 0.8),
        ];
        engine.process_block(&mut buffer, &chord);

        group.bench_with_input(BenchmarkId::new("chord_4", size), &size, |b, _| {
            let mut cutoff = 500.0;
            b.iter(|| {
                cutoff = if cutoff > 5_000.0 { 500.0 } else { cutoff * 1.05 };
                params.set(ParamId::FilterCutoff, cutoff);
                engine.process_block(black_box(&mut buffer), &[]);
            })
        });
    }

    group.finish();
}
