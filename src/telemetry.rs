//! Scope tap: the audio thread writes its most recent output samples into a
//! fixed ring and a UI thread copies them out whenever it wants to draw.

use std::sync::{
    atomic::{AtomicU32, AtomicUsize, Ordering},
    Arc,
};

/*
Scope Ring
==========

    samples: [ s0 | s1 | s2 | ... | sN-1 ]      one AtomicU32 (f32 bits) each
                          ↑
                     write_index  (total samples ever written, wraps at usize)

  writer:  samples[write_index % N] = x;  write_index += 1     (Relaxed)
  reader:  copy N cells starting at write_index % N            (Relaxed)

Single writer, any number of readers. A reader racing the writer can see
the oldest few samples already overwritten by newer ones. Readers accept
that.
*/

struct ScopeRing {
    samples: Box<[AtomicU32]>,
    write_index: AtomicUsize,
}

/// Audio-thread half. Not `Clone`: there is exactly one writer.
pub struct ScopeWriter {
    ring: Arc<ScopeRing>,
}

/// UI-thread half. Clone freely.
#[derive(Clone)]
pub struct ScopeReader {
    ring: Arc<ScopeRing>,
}

/// Create a scope ring holding the last `len` samples (at least one).
pub fn scope(len: usize) -> (ScopeWriter, ScopeReader) {
    let samples = (0..len.max(1)).map(|_| AtomicU32::new(0)).collect();
    let ring = Arc::new(ScopeRing {
        samples,
        write_index: AtomicUsize::new(0),
    });

    (
        ScopeWriter {
            ring: Arc::clone(&ring),
        },
        ScopeReader { ring },
    )
}

impl ScopeWriter {
    #[inline]
    pub fn push(&mut self, sample: f32) {
        let ring = &self.ring;
        let index = ring.write_index.load(Ordering::Relaxed);
        ring.samples[index % ring.samples.len()].store(sample.to_bits(), Ordering::Relaxed);
        ring.write_index
            .store(index.wrapping_add(1), Ordering::Relaxed);
    }

    pub fn push_slice(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.push(sample);
        }
    }

    pub fn len(&self) -> usize {
        self.ring.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl ScopeReader {
    pub fn len(&self) -> usize {
        self.ring.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Total samples written so far (wrapping).
    pub fn samples_written(&self) -> usize {
        self.ring.write_index.load(Ordering::Relaxed)
    }

    /// Copy the ring into `out`, oldest sample first. Copies
    /// `min(out.len(), len())` of the most recent samples and returns that
    /// count.
    pub fn read_into(&self, out: &mut [f32]) -> usize {
        let ring = &self.ring;
        let len = ring.samples.len();
        let count = out.len().min(len);
        let next = ring.write_index.load(Ordering::Relaxed) % len;
        let first = (next + len - count) % len;

        for (i, slot) in out[..count].iter_mut().enumerate() {
            let index = (first + i) % len;
            *slot = f32::from_bits(ring.samples[index].load(Ordering::Relaxed));
        }
        count
    }

    /// Allocating convenience for UI code.
    pub fn snapshot(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.len()];
        self.read_into(&mut out);
        out
    }

    /// Largest absolute value currently in the ring.
    pub fn peak(&self) -> f32 {
        self.ring
            .samples
            .iter()
            .map(|cell| f32::from_bits(cell.load(Ordering::Relaxed)).abs())
            .fold(0.0, f32::max)
    }
}
