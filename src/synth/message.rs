#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Note traffic pushed from a control thread to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    AllNotesOff,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NoteEventKind {
    /// `velocity` is a linear level in [0, 1].
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    AllNotesOff,
}

/// A note event positioned `offset` samples into the current block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NoteEvent {
    pub offset: usize,
    pub kind: NoteEventKind,
}

impl NoteEvent {
    pub fn note_on(offset: usize, note: u8, velocity: f32) -> Self {
        Self {
            offset,
            kind: NoteEventKind::NoteOn { note, velocity },
        }
    }

    pub fn note_off(offset: usize, note: u8) -> Self {
        Self {
            offset,
            kind: NoteEventKind::NoteOff { note },
        }
    }

    pub fn all_notes_off(offset: usize) -> Self {
        Self {
            offset,
            kind: NoteEventKind::AllNotesOff,
        }
    }
}

impl From<SynthMessage> for NoteEventKind {
    fn from(msg: SynthMessage) -> Self {
        match msg {
            SynthMessage::NoteOn { note, velocity } => NoteEventKind::NoteOn { note, velocity },
            SynthMessage::NoteOff { note } => NoteEventKind::NoteOff { note },
            SynthMessage::AllNotesOff => NoteEventKind::AllNotesOff,
        }
    }
}

pub trait MessageReceiver: Send {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}
