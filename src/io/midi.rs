const STATUS_NOTE_OFF: u8 = 0x80;
const STATUS_NOTE_ON: u8 = 0x90;

/// Channel voice messages the synth reacts to. Everything else is dropped
/// during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
}

impl MidiEvent {
    /// Decode a raw 3-byte message. Note-on with velocity 0 is a note-off.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let [status, key, velocity, ..] = *bytes else {
            return None;
        };
        if key > 0x7F || velocity > 0x7F {
            return None;
        }

        let channel = status & 0x0F;
        match status & 0xF0 {
            STATUS_NOTE_ON if velocity > 0 => Some(MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            }),
            STATUS_NOTE_ON | STATUS_NOTE_OFF => Some(MidiEvent::NoteOff {
                channel,
                key,
                velocity,
            }),
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. } | MidiEvent::NoteOff { channel, .. } => channel,
        }
    }

    pub fn key(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { key, .. } | MidiEvent::NoteOff { key, .. } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on_and_off() {
        assert_eq!(
            MidiEvent::parse(&[0x91, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 1,
                key: 60,
                velocity: 100
            })
        );
        assert_eq!(
            MidiEvent::parse(&[0x80, 60, 64]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 60,
                velocity: 64
            })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        let event = MidiEvent::parse(&[0x90, 64, 0]);
        assert!(matches!(event, Some(MidiEvent::NoteOff { key: 64, .. })));
    }

    #[test]
    fn ignores_other_messages() {
        assert_eq!(MidiEvent::parse(&[0xB0, 7, 100]), None); // control change
        assert_eq!(MidiEvent::parse(&[0xE0, 0, 64]), None); // pitch bend
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None); // truncated
        assert_eq!(MidiEvent::parse(&[0x90, 0x80, 1]), None); // data byte with status bit
    }
}
