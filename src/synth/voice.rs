use crate::{
    dsp::{
        mix::{apply_gain, flush_tiny, mix},
        AdsrParams, Envelope, FilterType, Oscillator, SVFilter, WaveformKind,
    },
    io::{converter::midi_note_to_freq, AudioBuffer},
    params::{OscillatorSettings, ParameterSnapshot},
    synth::sound::Sound,
    ProcessSpec,
};

/*
Voice
=====

One note's worth of sound: two oscillators, one envelope, one filter.

Signal Path (per block)
-----------------------

    ┌──────┐  s1
    │ osc1 │ ─────┐           blend
    └──────┘ ↑ FM │    ┌───────────────────┐
             │    ├──→ │ s1·(1-b) + s2·b   │ → × velocity → × envelope → filter → += output
    ┌──────┐ │ s2 │    └───────────────────┘
    │ osc2 │ ─────┘
    └──────┘

FM routing
----------

  fm1_amount   depth (Hz) by which osc2 bends osc1's frequency
  fm2_amount   depth (Hz) by which osc1 bends osc2's frequency

With only fm1 set, osc2 renders first and its block is fed sample by sample
into osc1's phase increment (`process_with_fm`). With fm2 set as well the two
oscillators modulate each other; that loop runs one sample at a time and osc2
hears osc1's previous sample.

A switched-off oscillator is silent in the mix and also stops modulating
the other one. Its phase keeps running.

Lifecycle
---------

    Free ──start_note──→ Active ──stop_note(tail off)──→ Releasing
     ↑                                                       │
     └─────────── envelope reaches Idle after a render ──────┘

    stop_note(no tail off) from any state goes straight to Free.

The output buffer is shared by every voice, so rendering always ADDS into it.
*/

/// Pitch choice index -> semitone offset.
const PITCH_TABLE: [f32; 5] = [-12.0, -7.0, 0.0, 7.0, 12.0];

/// Semitone offset for a pitch choice index. Out-of-range indices are 0.
pub fn pitch_index_to_semitones(index: i32) -> f32 {
    usize::try_from(index)
        .ok()
        .and_then(|i| PITCH_TABLE.get(i).copied())
        .unwrap_or(0.0)
}

/// Frequency ratio for a semitone offset plus a detune in cents.
#[inline]
pub fn pitch_ratio(semitones: f32, cents: f32) -> f32 {
    2.0_f32.powf(semitones / 12.0) * 2.0_f32.powf(cents / 1200.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Key held, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

pub struct Voice {
    osc1: Oscillator,
    osc2: Oscillator,
    envelope: Envelope,
    filter: SVFilter,
    spec: ProcessSpec,

    // Scratch, sized once in prepare()
    osc1_buffer: Vec<f32>,
    osc2_buffer: Vec<f32>,
    mono_buffer: Vec<f32>,
    mix_buffer: AudioBuffer,

    note: Option<u8>,
    state: VoiceState,
    age: u64,
    base_frequency: f32,
    velocity: f32,

    osc1_ratio: f32,
    osc2_ratio: f32,
    blend: f32,
    osc1_on: bool,
    osc2_on: bool,
    fm1_amount: f32,
    fm2_amount: f32,
    last_osc1_sample: f32,
}

impl Voice {
    /// `noise_seed` seeds osc1's noise source; osc2 uses the next seed.
    pub fn new(noise_seed: u64) -> Self {
        let spec = ProcessSpec::default();

        Self {
            osc1: Oscillator::with_seed(noise_seed),
            osc2: Oscillator::with_seed(noise_seed.wrapping_add(1)),
            envelope: Envelope::new(spec.sample_rate),
            filter: SVFilter::new(FilterType::LowPass),
            spec,
            osc1_buffer: vec![0.0; spec.max_block_size],
            osc2_buffer: vec![0.0; spec.max_block_size],
            mono_buffer: vec![0.0; spec.max_block_size],
            mix_buffer: AudioBuffer::new(spec.channels, spec.max_block_size),
            note: None,
            state: VoiceState::Free,
            age: 0,
            base_frequency: 0.0,
            velocity: 0.0,
            osc1_ratio: 1.0,
            osc2_ratio: 1.0,
            blend: 0.5,
            osc1_on: true,
            osc2_on: true,
            fm1_amount: 0.0,
            fm2_amount: 0.0,
            last_osc1_sample: 0.0,
        }
    }

    /// Allocate scratch for `spec` and reset all DSP state. Not realtime-safe.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.spec = *spec;

        self.osc1.prepare(spec);
        self.osc2.prepare(spec);
        self.envelope.set_sample_rate(spec.sample_rate);
        self.envelope.reset();
        self.filter.prepare(spec);

        self.osc1_buffer = vec![0.0; spec.max_block_size];
        self.osc2_buffer = vec![0.0; spec.max_block_size];
        self.mono_buffer = vec![0.0; spec.max_block_size];
        self.mix_buffer = AudioBuffer::new(spec.channels, spec.max_block_size);

        self.clear_current_note();
    }

    pub fn can_play_sound(&self, sound: Sound) -> bool {
        sound == Sound::Synth
    }

    /// Begin a note. A voice that is already sounding retriggers from its
    /// current envelope level.
    pub fn start_note(&mut self, note: u8, velocity: f32, age: u64) {
        self.base_frequency = midi_note_to_freq(note);
        self.velocity = if velocity.is_finite() {
            velocity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.note = Some(note);
        self.state = VoiceState::Active;
        self.age = age;

        self.osc1.reset();
        self.osc2.reset();
        self.osc1
            .set_frequency(self.base_frequency * self.osc1_ratio, false);
        self.osc2
            .set_frequency(self.base_frequency * self.osc2_ratio, false);
        self.last_osc1_sample = 0.0;

        self.envelope.note_on();
    }

    /// Release the note. With `allow_tail_off` the envelope's release runs
    /// and the voice stays active until it finishes; without it the voice is
    /// silenced and freed on the spot.
    pub fn stop_note(&mut self, allow_tail_off: bool) {
        if self.state == VoiceState::Free {
            return;
        }

        if allow_tail_off {
            self.envelope.note_off();
            self.state = VoiceState::Releasing;
            if !self.envelope.is_active() {
                self.clear_current_note();
            }
        } else {
            self.envelope.reset();
            self.clear_current_note();
        }
    }

    fn clear_current_note(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
    }

    /// Gain, pitch choice and detune for both oscillators.
    pub fn update_from_parameters(&mut self, osc1: &OscillatorSettings, osc2: &OscillatorSettings) {
        self.osc1.set_gain(osc1.gain);
        self.osc2.set_gain(osc2.gain);

        self.osc1_ratio = pitch_ratio(pitch_index_to_semitones(osc1.pitch_index), osc1.detune_cents);
        self.osc2_ratio = pitch_ratio(pitch_index_to_semitones(osc2.pitch_index), osc2.detune_cents);

        if self.note.is_some() {
            self.osc1
                .set_frequency(self.base_frequency * self.osc1_ratio, true);
            self.osc2
                .set_frequency(self.base_frequency * self.osc2_ratio, true);
        }
    }

    pub fn update_filter(&mut self, cutoff: f32, resonance: f32, filter_type: FilterType) {
        self.filter.set_cutoff(cutoff);
        self.filter.set_resonance(resonance);
        self.filter.set_type(filter_type);
    }

    pub fn update_envelope_params(&mut self, params: AdsrParams) {
        self.envelope.set_parameters(params);
    }

    pub fn update_oscillator_waveforms(&mut self, osc1: WaveformKind, osc2: WaveformKind) {
        self.osc1.set_waveform(osc1);
        self.osc2.set_waveform(osc2);
    }

    pub fn update_blend(&mut self, blend: f32) {
        self.blend = if blend.is_finite() {
            blend.clamp(0.0, 1.0)
        } else {
            0.5
        };
    }

    pub fn update_on_off_flags(&mut self, osc1_on: bool, osc2_on: bool) {
        self.osc1_on = osc1_on;
        self.osc2_on = osc2_on;
    }

    pub fn update_fm(&mut self, fm1_amount: f32, fm2_amount: f32) {
        let depth = |amount: f32| if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        self.fm1_amount = depth(fm1_amount);
        self.fm2_amount = depth(fm2_amount);
    }

    /// Push every block-rate control from a snapshot.
    pub fn apply_snapshot(&mut self, snapshot: &ParameterSnapshot) {
        self.update_oscillator_waveforms(snapshot.osc1.waveform, snapshot.osc2.waveform);
        self.update_from_parameters(&snapshot.osc1, &snapshot.osc2);
        self.update_on_off_flags(snapshot.osc1.enabled, snapshot.osc2.enabled);
        self.update_fm(snapshot.osc1.fm_amount, snapshot.osc2.fm_amount);
        self.update_blend(snapshot.blend);
        self.update_envelope_params(snapshot.envelope);
        self.update_filter(
            snapshot.filter_cutoff,
            snapshot.filter_resonance,
            snapshot.filter_type,
        );
    }

    /// Add this voice's output for `num_samples` samples into `output`,
    /// starting at `start_sample`. Does nothing while the voice is free.
    pub fn render_next_block(
        &mut self,
        output: &mut AudioBuffer,
        start_sample: usize,
        num_samples: usize,
    ) {
        if !self.is_active() {
            return;
        }

        debug_assert_eq!(
            output.num_channels(),
            self.mix_buffer.num_channels(),
            "voice prepared for a different channel count"
        );
        debug_assert!(start_sample + num_samples <= output.len());

        let end = (start_sample + num_samples).min(output.len());
        let mut position = start_sample;
        while position < end && self.is_active() {
            let chunk = (end - position).min(self.spec.max_block_size);
            self.render_chunk(output, position, chunk);
            position += chunk;
        }
    }

    fn render_chunk(&mut self, output: &mut AudioBuffer, start: usize, len: usize) {
        self.render_oscillators(len);

        let s1 = &mut self.osc1_buffer[..len];
        let s2 = &mut self.osc2_buffer[..len];
        flush_tiny(s1);
        flush_tiny(s2);

        let mono = &mut self.mono_buffer[..len];
        mix(s1, s2, self.blend, mono);
        apply_gain(mono, self.velocity);
        self.envelope.apply_to_buffer(mono);

        let channels = self.mix_buffer.num_channels().min(output.num_channels());
        for ch in 0..channels {
            self.mix_buffer.channel_mut(ch)[..len].copy_from_slice(mono);
        }
        self.filter.process(&mut self.mix_buffer, len);

        for ch in 0..channels {
            output.add_from(ch, start, &self.mix_buffer.channel(ch)[..len]);
        }

        if !self.envelope.is_active() {
            self.clear_current_note();
        }
    }

    fn render_oscillators(&mut self, len: usize) {
        let s1 = &mut self.osc1_buffer[..len];
        let s2 = &mut self.osc2_buffer[..len];

        if self.fm2_amount == 0.0 {
            self.osc2.process(s2);
            if !self.osc2_on {
                s2.fill(0.0);
            }

            if self.fm1_amount == 0.0 {
                self.osc1.process(s1);
            } else {
                self.osc1.process_with_fm(s1, s2, self.fm1_amount);
            }
            if !self.osc1_on {
                s1.fill(0.0);
            }
        } else {
            // Cross-modulation: osc2 follows osc1 by one sample
            let mut previous = self.last_osc1_sample;
            for (a, b) in s1.iter_mut().zip(s2.iter_mut()) {
                let raw2 = self.osc2.next_sample_fm(previous, self.fm2_amount);
                *b = if self.osc2_on { raw2 } else { 0.0 };

                let raw1 = self.osc1.next_sample_fm(*b, self.fm1_amount);
                *a = if self.osc1_on { raw1 } else { 0.0 };
                previous = *a;
            }
        }

        if let Some(&last) = s1.last() {
            self.last_osc1_sample = last;
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != VoiceState::Free
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    /// Key still held (not yet released).
    pub fn is_key_down(&self) -> bool {
        self.state == VoiceState::Active
    }

    pub fn is_playing_note(&self, note: u8) -> bool {
        self.is_active() && self.note == Some(note)
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn oscillator_frequencies(&self) -> (f32, f32) {
        (self.osc1.frequency(), self.osc2.frequency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;
    const BLOCK: usize = 256;

    fn prepared(channels: usize) -> Voice {
        let mut voice = Voice::new(1);
        voice.prepare(&ProcessSpec::new(SAMPLE_RATE, BLOCK, channels));

        let mut snapshot = ParameterSnapshot::default();
        snapshot.envelope = AdsrParams {
            attack: 0.001,
            decay: 0.01,
            sustain: 0.8,
            release: 0.01,
        };
        voice.apply_snapshot(&snapshot);
        voice
    }

    fn render(voice: &mut Voice, channels: usize, len: usize) -> AudioBuffer {
        let mut out = AudioBuffer::new(channels, len);
        voice.render_next_block(&mut out, 0, len);
        out
    }

    fn configure(voice: &mut Voice, blend: f32, osc1_on: bool, osc2_on: bool, osc2_gain: f32) {
        voice.update_oscillator_waveforms(WaveformKind::Sine, WaveformKind::Saw);
        let osc1 = OscillatorSettings {
            waveform: WaveformKind::Sine,
            pitch_index: 2,
            detune_cents: 0.0,
            gain: 0.9,
            enabled: osc1_on,
            fm_amount: 0.0,
        };
        let osc2 = OscillatorSettings {
            waveform: WaveformKind::Saw,
            pitch_index: 4,
            detune_cents: 7.0,
            gain: osc2_gain,
            enabled: osc2_on,
            fm_amount: 0.0,
        };
        voice.update_from_parameters(&osc1, &osc2);
        voice.update_on_off_flags(osc1_on, osc2_on);
        voice.update_blend(blend);
    }

    #[test]
    fn pitch_table_lookup() {
        assert_eq!(pitch_index_to_semitones(0), -12.0);
        assert_eq!(pitch_index_to_semitones(1), -7.0);
        assert_eq!(pitch_index_to_semitones(2), 0.0);
        assert_eq!(pitch_index_to_semitones(3), 7.0);
        assert_eq!(pitch_index_to_semitones(4), 12.0);
        assert_eq!(pitch_index_to_semitones(9), 0.0);
        assert!((pitch_ratio(12.0, 0.0) - 2.0).abs() < 1e-6);
        assert!((pitch_ratio(0.0, 1200.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn start_note_sets_oscillator_frequencies() {
        let mut voice = prepared(1);
        configure(&mut voice, 0.5, true, true, 0.5);
        voice.start_note(69, 1.0, 0);

        let (f1, f2) = voice.oscillator_frequencies();
        assert!((f1 - 440.0).abs() < 1e-2);
        assert!((f2 - 880.0 * 2.0_f32.powf(7.0 / 1200.0)).abs() < 1e-2);
    }

    #[test]
    fn inactive_voice_adds_nothing() {
        let mut voice = prepared(2);
        let mut out = AudioBuffer::new(2, 64);
        out.channel_mut(0).fill(0.5);
        voice.render_next_block(&mut out, 0, 64);
        assert!(out.channel(0).iter().all(|&s| s == 0.5));
        assert!(out.channel(1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn blend_zero_is_oscillator_one_only() {
        for osc2_on in [true, false] {
            let mut voice = prepared(1);
            configure(&mut voice, 0.0, true, osc2_on, 1.0);
            voice.start_note(60, 1.0, 0);

            let mut expected_voice = prepared(1);
            configure(&mut expected_voice, 0.0, true, true, 0.0);
            expected_voice.start_note(60, 1.0, 0);

            let out = render(&mut voice, 1, BLOCK);
            let expected = render(&mut expected_voice, 1, BLOCK);
            assert_eq!(out.channel(0), expected.channel(0));
        }
    }

    #[test]
    fn blend_one_is_oscillator_two_only() {
        let mut voice = prepared(1);
        configure(&mut voice, 1.0, true, true, 0.7);
        voice.start_note(60, 1.0, 0);

        let mut expected_voice = prepared(1);
        configure(&mut expected_voice, 1.0, false, true, 0.7);
        expected_voice.start_note(60, 1.0, 0);

        let out = render(&mut voice, 1, BLOCK);
        let expected = render(&mut expected_voice, 1, BLOCK);
        assert_eq!(out.channel(0), expected.channel(0));
        assert!(out.channel(0).iter().any(|s| s.abs() > 0.01));
    }

    #[test]
    fn render_accumulates_at_offset() {
        let mut voice = prepared(2);
        configure(&mut voice, 0.5, true, true, 0.5);
        voice.start_note(64, 1.0, 0);

        let mut out = AudioBuffer::new(2, 128);
        out.channel_mut(0).fill(1.0);
        voice.render_next_block(&mut out, 64, 64);

        assert!(out.channel(0)[..64].iter().all(|&s| s == 1.0));
        assert!(out.channel(1)[..64].iter().all(|&s| s == 0.0));
        assert!(out.channel(1)[64..].iter().any(|&s| s != 0.0));
        // Both channels carry the same signal, on top of what was there
        for i in 64..128 {
            assert!((out.channel(0)[i] - 1.0 - out.channel(1)[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn tail_off_keeps_voice_until_envelope_finishes() {
        let mut voice = prepared(1);
        configure(&mut voice, 0.5, true, true, 0.5);
        voice.start_note(60, 0.8, 0);
        render(&mut voice, 1, BLOCK);

        voice.stop_note(true);
        assert_eq!(voice.state(), VoiceState::Releasing);
        assert!(voice.is_active());

        // release is 10 ms = 480 samples
        render(&mut voice, 1, BLOCK);
        render(&mut voice, 1, BLOCK);
        assert!(voice.is_free());
        assert_eq!(voice.note(), None);
    }

    #[test]
    fn hard_stop_frees_immediately() {
        let mut voice = prepared(1);
        voice.start_note(60, 1.0, 0);
        voice.stop_note(false);
        assert!(voice.is_free());
        assert_eq!(voice.envelope_level(), 0.0);

        let out = render(&mut voice, 1, 32);
        assert!(out.channel(0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn velocity_scales_output() {
        let peak = |velocity: f32| {
            let mut voice = prepared(1);
            configure(&mut voice, 0.5, true, true, 0.5);
            voice.start_note(60, velocity, 0);
            let out = render(&mut voice, 1, BLOCK);
            out.channel(0).iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
        };

        let loud = peak(1.0);
        let quiet = peak(0.5);
        assert!(loud > 0.0);
        assert!((quiet / loud - 0.5).abs() < 1e-3);
    }

    #[test]
    fn fm_changes_the_carrier() {
        let render_with = |fm1: f32, fm2: f32| {
            let mut voice = prepared(1);
            configure(&mut voice, 0.0, true, true, 1.0);
            voice.update_fm(fm1, fm2);
            voice.start_note(57, 1.0, 0);
            render(&mut voice, 1, BLOCK)
        };

        let plain = render_with(0.0, 0.0);
        let fm = render_with(300.0, 0.0);
        let cross = render_with(300.0, 150.0);
        assert_ne!(plain.channel(0), fm.channel(0));
        assert_ne!(fm.channel(0), cross.channel(0));
        assert!(cross.channel(0).iter().all(|s| s.is_finite()));
    }

    #[test]
    fn switched_off_oscillator_does_not_modulate() {
        let render_with = |osc2_on: bool, fm1: f32| {
            let mut voice = prepared(1);
            configure(&mut voice, 0.0, true, osc2_on, 1.0);
            voice.update_fm(fm1, 0.0);
            voice.start_note(57, 1.0, 0);
            render(&mut voice, 1, BLOCK)
        };

        assert_eq!(render_with(false, 400.0).channel(0), render_with(true, 0.0).channel(0));
    }

    #[test]
    fn long_blocks_are_chunked() {
        let mut voice = prepared(1);
        configure(&mut voice, 0.5, true, true, 0.5);
        voice.start_note(48, 1.0, 0);

        let out = render(&mut voice, 1, BLOCK * 3 + 17);
        assert!(out.channel(0)[BLOCK * 3..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn accepts_the_synth_sound() {
        let voice = Voice::new(0);
        assert!(voice.can_play_sound(Sound::Synth));
    }
}
