//! Benchmarks for complete voices and a saturated voice pool.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use effem::{
    io::AudioBuffer,
    params::ParameterSnapshot,
    synth::{NoteEvent, StealPolicy, Voice, VoiceAllocator},
    ProcessSpec,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn voice(snapshot: &ParameterSnapshot, size: usize) -> Voice {
    let mut voice = Voice::new(1);
    voice.prepare(&ProcessSpec::new(SAMPLE_RATE, size, 2));
    voice.apply_snapshot(snapshot);
    voice.start_note(45, 0.9, 0);
    voice
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    let mut plain = ParameterSnapshot::default();
    plain.envelope.sustain = 0.8;
    plain.filter_cutoff = 2_500.0;

    let mut fm = plain;
    fm.osc1.fm_amount = 250.0;

    let mut cross_fm = fm;
    cross_fm.osc2.fm_amount = 120.0;

    for &size in BLOCK_SIZES {
        let mut buffer = AudioBuffer::new(2, size);

        // Two oscillators → envelope → filter, stereo
        for (name, snapshot) in [("subtractive", &plain), ("fm", &fm), ("cross_fm", &cross_fm)] {
            let mut voice = voice(snapshot, size);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.clear();
                    voice.render_next_block(black_box(&mut buffer), 0, size);
                })
            });
        }

        // Eight sounding voices plus a note-on mid-block that forces a steal
        let mut pool = VoiceAllocator::new(8, StealPolicy::Released, 3);
        pool.prepare(&ProcessSpec::new(SAMPLE_RATE, size, 2));
        pool.apply_snapshot(&plain);
        for note in 48..56 {
            pool.note_on(note, 0.8);
        }
        let events = [
            NoteEvent::note_off(size / 4, 48),
            NoteEvent::note_on(size / 2, 60, 0.8),
            NoteEvent::note_off(size * 3 / 4, 60),
            NoteEvent::note_on(size * 3 / 4, 48, 0.8),
        ];
        group.bench_with_input(BenchmarkId::new("pool_8_stealing", size), &size, |b, _| {
            b.iter(|| {
                buffer.clear();
                pool.render_next_block(black_box(&mut buffer), black_box(&events), 0, size);
            })
        });
    }

    group.finish();
}
