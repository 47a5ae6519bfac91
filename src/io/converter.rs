use crate::{
    io::midi::MidiEvent,
    synth::message::{NoteEvent, NoteEventKind, SynthMessage},
};

/// Convert a MIDI event into a note event at `offset` within the block.
/// `channel_filter = None` accepts every channel (omni).
pub fn midi_to_note_event(
    midi: MidiEvent,
    offset: usize,
    channel_filter: Option<u8>,
) -> Option<NoteEvent> {
    if channel_filter.is_some_and(|channel| channel != midi.channel()) {
        return None;
    }

    let kind = match midi {
        MidiEvent::NoteOn { key, velocity, .. } => NoteEventKind::NoteOn {
            note: key,
            velocity: velocity_to_gain(velocity),
        },
        MidiEvent::NoteOff { key, .. } => NoteEventKind::NoteOff { note: key },
    };

    Some(NoteEvent { offset, kind })
}

pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => Some(SynthMessage::NoteOn {
            note: key,
            velocity: velocity_to_gain(velocity),
        }),
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOff { note: key })
        }
        _ => None,
    }
}

/// MIDI velocity 0..=127 to a linear 0.0..=1.0 note level.
#[inline]
pub fn velocity_to_gain(velocity: u8) -> f32 {
    f32::from(velocity.min(127)) / 127.0
}

/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(57) - 220.0).abs() < 1e-3);
        assert!((midi_note_to_freq(60) - 261.6256).abs() < 1e-2);
    }

    #[test]
    fn channel_filter_drops_other_channels() {
        let event = MidiEvent::NoteOn {
            channel: 3,
            key: 60,
            velocity: 127,
        };
        assert!(midi_to_note_event(event, 0, Some(0)).is_none());

        let converted = midi_to_note_event(event, 12, None).expect("omni accepts");
        assert_eq!(converted.offset, 12);
        assert_eq!(
            converted.kind,
            NoteEventKind::NoteOn {
                note: 60,
                velocity: 1.0
            }
        );
    }

    #[test]
    fn synth_message_keeps_note() {
        let off = MidiEvent::NoteOff {
            channel: 0,
            key: 61,
            velocity: 0,
        };
        assert_eq!(midi_to_synth(off, 0), Some(SynthMessage::NoteOff { note: 61 }));
    }
}
