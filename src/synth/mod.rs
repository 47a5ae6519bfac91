// Voices, the polyphonic pool that drives them, and the note traffic
// that reaches them from other threads.

pub mod allocator;
pub mod message;
pub mod sound;
pub mod voice;

pub use allocator::{StealPolicy, VoiceAllocator};
pub use message::{MessageReceiver, NoteEvent, NoteEventKind, SynthMessage};
pub use sound::Sound;
pub use voice::{Voice, VoiceState};
