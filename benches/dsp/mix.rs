//! Benchmarks for blend, gain and the post stage.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use effem::{
    dsp::{mix, Mixer},
    io::AudioBuffer,
};

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        // Generate test signals
        let signal_a: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let signal_b: Vec<f32> = (0..size).map(|i| (i as f32 * 0.15).cos()).collect();
        let mut output = vec![0.0f32; size];

        // Oscillator blend into a separate buffer
        group.bench_with_input(BenchmarkId::new("blend", size), &size, |b, _| {
            b.iter(|| {
                mix::mix(
                    black_box(&signal_a),
                    black_box(&signal_b),
                    black_box(0.5),
                    black_box(&mut output),
                );
            })
        });

        // Denormal flush over a mostly-quiet buffer
        let quiet: Vec<f32> = signal_a.iter().map(|s| s * 1e-7).collect();
        let mut buffer = quiet.clone();
        group.bench_with_input(BenchmarkId::new("flush_tiny", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&quiet);
                mix::flush_tiny(black_box(&mut buffer));
            })
        });

        // Stereo pan with a moving master gain
        let mut mixer = Mixer::new();
        mixer.set_pan(0.3);
        let mut stereo = AudioBuffer::new(2, size);
        group.bench_with_input(BenchmarkId::new("pan_gain_stereo", size), &size, |b, _| {
            let mut gain = 0.5;
            b.iter(|| {
                gain = if gain > 0.9 { 0.5 } else { gain + 0.01 };
                mixer.set_master_gain(gain);
                stereo.channel_mut(0).copy_from_slice(&signal_a);
                stereo.channel_mut(1).copy_from_slice(&signal_a);
                mixer.process(black_box(&mut stereo), size);
            })
        });
    }

    group.finish();
}
