#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    io::AudioBuffer,
    params::ParameterSnapshot,
    synth::{
        message::{NoteEvent, NoteEventKind},
        sound::Sound,
        voice::{Voice, VoiceState},
    },
    ProcessSpec,
};

/*
Voice Allocation
================

A fixed pool of voices, created once and never resized while running.

Note-on
-------

    1. A voice already sounding this note?  → retrigger it (no second owner)
    2. First free voice in pool order?      → start it
    3. Otherwise steal one per StealPolicy  → hard stop, then start

Stealing policies
-----------------

  Oldest     lowest trigger age among all sounding voices
  Quietest   lowest current envelope level (ties go to the oldest)
  Released   oldest voice already in its release tail, else Oldest

Sample-accurate events
----------------------

Events carry an offset into the block. Rendering is split at each offset:

    block:  |----------|-----------------|--------|
            0        ev@10             ev@27     len
            render 0..10, apply ev, render 10..27, apply ev, render 27..len
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StealPolicy {
    Oldest,
    Quietest,
    #[default]
    Released,
}

pub struct VoiceAllocator {
    voices: Vec<Voice>,
    sound: Sound,
    policy: StealPolicy,
    note_counter: u64,
}

impl VoiceAllocator {
    /// A pool of `num_voices` voices (at least one). Each voice gets its own
    /// pair of noise seeds derived from `noise_seed`.
    pub fn new(num_voices: usize, policy: StealPolicy, noise_seed: u64) -> Self {
        let voices = (0..num_voices.max(1) as u64)
            .map(|i| Voice::new(noise_seed.wrapping_add(i * 2)))
            .collect();

        Self {
            voices,
            sound: Sound::Synth,
            policy,
            note_counter: 0,
        }
    }

    /// Not realtime-safe: voices allocate their scratch here.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        for voice in &mut self.voices {
            voice.prepare(spec);
        }
        self.note_counter = 0;
    }

    pub fn set_steal_policy(&mut self, policy: StealPolicy) {
        self.policy = policy;
    }

    pub fn steal_policy(&self) -> StealPolicy {
        self.policy
    }

    pub fn apply_snapshot(&mut self, snapshot: &ParameterSnapshot) {
        for voice in &mut self.voices {
            voice.apply_snapshot(snapshot);
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if !self.sound.applies_to_note(note) {
            return;
        }
        if !velocity.is_finite() || velocity <= 0.0 {
            self.note_off(note);
            return;
        }

        let age = self.note_counter;
        self.note_counter = self.note_counter.wrapping_add(1);

        if let Some(voice) = self.voices.iter_mut().find(|v| v.is_playing_note(note)) {
            voice.start_note(note, velocity, age);
            return;
        }

        let sound = self.sound;
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.is_free() && v.can_play_sound(sound))
        {
            voice.start_note(note, velocity, age);
            return;
        }

        if let Some(idx) = self.find_voice_to_steal() {
            let voice = &mut self.voices[idx];
            voice.stop_note(false);
            voice.start_note(note, velocity, age);
        }
    }

    /// Release the voice holding `note`, if any.
    pub fn note_off(&mut self, note: u8) {
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.is_key_down() && v.note() == Some(note))
        {
            voice.stop_note(true);
        }
    }

    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        for voice in &mut self.voices {
            voice.stop_note(allow_tail_off);
        }
    }

    fn find_voice_to_steal(&self) -> Option<usize> {
        let sounding = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active());

        let oldest = || sounding.clone().min_by_key(|(_, v)| v.age()).map(|(i, _)| i);

        match self.policy {
            StealPolicy::Oldest => oldest(),
            StealPolicy::Quietest => sounding
                .clone()
                .min_by(|(_, a), (_, b)| {
                    a.envelope_level()
                        .total_cmp(&b.envelope_level())
                        .then(a.age().cmp(&b.age()))
                })
                .map(|(i, _)| i),
            StealPolicy::Released => sounding
                .clone()
                .filter(|(_, v)| v.state() == VoiceState::Releasing)
                .min_by_key(|(_, v)| v.age())
                .map(|(i, _)| i)
                .or_else(oldest),
        }
    }

    pub fn handle_event(&mut self, kind: NoteEventKind) {
        match kind {
            NoteEventKind::NoteOn { note, velocity } => self.note_on(note, velocity),
            NoteEventKind::NoteOff { note } => self.note_off(note),
            NoteEventKind::AllNotesOff => self.all_notes_off(true),
        }
    }

    /// Render `num_samples` samples into `output` from `start_sample`,
    /// applying each event at its offset. Offsets are relative to the start
    /// of `output`; events outside the span are applied at its nearest edge.
    pub fn render_next_block(
        &mut self,
        output: &mut AudioBuffer,
        events: &[NoteEvent],
        start_sample: usize,
        num_samples: usize,
    ) {
        let end = start_sample + num_samples;
        let mut position = start_sample;

        for event in events {
            let at = event.offset.clamp(position, end);
            if at > position {
                self.render_voices(output, position, at - position);
                position = at;
            }
            self.handle_event(event.kind);
        }

        if position < end {
            self.render_voices(output, position, end - position);
        }
    }

    fn render_voices(&mut self, output: &mut AudioBuffer, start: usize, len: usize) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.render_next_block(output, start, len);
        }
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn is_note_playing(&self, note: u8) -> bool {
        self.voices.iter().any(|v| v.is_playing_note(note))
    }

    pub fn num_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }
}
