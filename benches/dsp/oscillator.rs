//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use effem::{
    dsp::{Oscillator, WaveformKind},
    ProcessSpec,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn oscillator(waveform: WaveformKind, size: usize) -> Oscillator {
    let mut osc = Oscillator::new();
    osc.prepare(&ProcessSpec::new(SAMPLE_RATE, size, 1));
    osc.set_waveform(waveform);
    osc.set_frequency(440.0, false);
    osc
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // One run per waveform: sin() for sine and additive, branches for the rest
        for waveform in WaveformKind::ALL {
            let mut osc = oscillator(waveform, size);
            group.bench_with_input(
                BenchmarkId::new(format!("{waveform:?}").to_lowercase(), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        osc.process(black_box(&mut buffer));
                    })
                },
            );
        }

        // Per-sample frequency modulation from a second buffer
        let modulator: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut osc = oscillator(WaveformKind::Sine, size);
        group.bench_with_input(BenchmarkId::new("sine_fm", size), &size, |b, _| {
            b.iter(|| {
                osc.process_with_fm(black_box(&mut buffer), black_box(&modulator), black_box(300.0));
            })
        });

        // Frequency glide active for the whole block
        let mut osc = oscillator(WaveformKind::Saw, size);
        group.bench_with_input(BenchmarkId::new("saw_gliding", size), &size, |b, _| {
            let mut target = 220.0;
            b.iter(|| {
                target = if target > 400.0 { 220.0 } else { target * 1.1 };
                osc.set_frequency(target, true);
                osc.process(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
