//! Benchmarks for state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use effem::{
    dsp::{FilterType, SVFilter},
    io::AudioBuffer,
    ProcessSpec,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for filter_type in [FilterType::LowPass, FilterType::HighPass, FilterType::BandPass] {
            let mut filter = SVFilter::new(filter_type);
            filter.prepare(&ProcessSpec::new(SAMPLE_RATE, size, 1));
            filter.set_cutoff(1000.0);
            filter.set_resonance(0.9);

            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("{filter_type:?}").to_lowercase(), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        filter.process_channel(0, black_box(&mut buffer));
                    })
                },
            );
        }

        // Stereo: two independent channel states
        let mut filter = SVFilter::lowpass(1000.0);
        filter.prepare(&ProcessSpec::new(SAMPLE_RATE, size, 2));
        let mut stereo = AudioBuffer::new(2, size);
        group.bench_with_input(BenchmarkId::new("lowpass_stereo", size), &size, |b, _| {
            b.iter(|| {
                stereo.channel_mut(0).copy_from_slice(&input);
                stereo.channel_mut(1).copy_from_slice(&input);
                filter.process(black_box(&mut stereo), size);
            })
        });
    }

    group.finish();
}
