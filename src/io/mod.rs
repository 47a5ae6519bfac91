// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

use crate::dsp::mix::sum_in_place;

/// Planar multi-channel sample buffer.
///
/// Storage is allocated once in `new`; `set_len` only moves the logical
/// length within that capacity, so it is safe to call on the audio thread.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    len: usize,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            channels: vec![vec![0.0; capacity]; num_channels],
            len: capacity,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Change the logical length. Clamped to capacity (debug builds assert).
    pub fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.capacity(), "buffer length {len} exceeds capacity");
        self.len = len.min(self.capacity());
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index][..self.len]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index][..self.len]
    }

    pub fn clear(&mut self) {
        let len = self.len;
        for channel in &mut self.channels {
            channel[..len].fill(0.0);
        }
    }

    pub fn clear_range(&mut self, start: usize, len: usize) {
        let end = (start + len).min(self.len);
        let start = start.min(end);
        for channel in &mut self.channels {
            channel[start..end].fill(0.0);
        }
    }

    /// Accumulate `source` into one channel starting at `start`.
    pub fn add_from(&mut self, channel: usize, start: usize, source: &[f32]) {
        let dest = &mut self.channels[channel][..self.len];
        let end = (start + source.len()).min(dest.len());
        if start >= end {
            return;
        }

        sum_in_place(&mut dest[start..end], &source[..end - start]);
    }

    /// Copy into an interleaved device buffer. Extra device channels receive
    /// the last buffer channel (mono is duplicated to every output).
    pub fn write_interleaved(&self, out: &mut [f32], device_channels: usize) {
        if device_channels == 0 || self.channels.is_empty() {
            return;
        }

        let last = self.channels.len() - 1;
        for (frame_index, frame) in out.chunks_mut(device_channels).take(self.len).enumerate() {
            for (ch, sample) in frame.iter_mut().enumerate() {
                *sample = self.channels[ch.min(last)][frame_index];
            }
        }
    }
}
