//! Crossfade, summing and gain primitives used by the voice and post stage.

/*
Oscillator Blend
================

A voice's two oscillators are combined with a linear crossfade:

    output = (A × (1 - blend)) + (B × blend)

  blend = 0.0  →  oscillator 1 only; oscillator 2 contributes exactly 0
  blend = 0.5  →  both at half amplitude
  blend = 1.0  →  oscillator 2 only

The weights sum to 1.0, so two full-scale oscillators never exceed ±1.0.
Perceived loudness dips a little around 0.5 (uncorrelated signals add in
power, not amplitude).


Summing Voices
--------------

Voices ACCUMULATE into the shared output (`sum_in_place`). They never
overwrite it, because every active voice writes the same destination span.
The sum of N voices can exceed ±1.0; master gain is applied afterwards.


Tiny Values
-----------

An oscillator at gain 0 still produces values like 1e-9 from float rounding.
`flush_tiny` snaps anything below FLUSH_THRESHOLD to exactly 0 so a muted
oscillator really is silent and no denormals reach the filter.
*/

pub const FLUSH_THRESHOLD: f32 = 1e-6;

/// Mix two signals using linear crossfade.
///
/// * `a` - First signal buffer
/// * `b` - Second signal buffer
/// * `balance` - Mix ratio (0.0 = all A, 0.5 = equal, 1.0 = all B)
/// * `out` - Output buffer
#[inline]
pub fn mix(a: &[f32], b: &[f32], balance: f32, out: &mut [f32]) {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len(), out.len());

    let balance = balance.clamp(0.0, 1.0);
    let weight_a = 1.0 - balance;
    let weight_b = balance;

    for ((&sa, &sb), o) in a.iter().zip(b.iter()).zip(out.iter_mut()) {
        *o = (sa * weight_a) + (sb * weight_b);
    }
}

/// Add signal B into signal A in-place (summing).
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Multiply a signal by a constant gain factor (in-place).
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}

/// Multiply by a gain that moves linearly from `start` to `end` across the buffer.
#[inline]
pub fn apply_gain_ramp(signal: &mut [f32], start: f32, end: f32) {
    if signal.is_empty() {
        return;
    }
    if start == end {
        apply_gain(signal, start);
        return;
    }

    let step = (end - start) / signal.len() as f32;
    let mut gain = start;
    for sample in signal.iter_mut() {
        gain += step;
        *sample *= gain;
    }
}

/// Snap values below FLUSH_THRESHOLD to exactly zero.
#[inline]
pub fn flush_tiny(signal: &mut [f32]) {
    for sample in signal.iter_mut() {
        if sample.abs() < FLUSH_THRESHOLD {
            *sample = 0.0;
        }
    }
}
