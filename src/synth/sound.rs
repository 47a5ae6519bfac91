/// The kind of sound a voice can be asked to play.
///
/// There is exactly one today. A voice accepts a sound by tag comparison, so
/// adding a second category later is a new variant plus a match arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sound {
    #[default]
    Synth,
}

impl Sound {
    /// Every note number maps to this sound.
    pub fn applies_to_note(self, _note: u8) -> bool {
        true
    }
}
