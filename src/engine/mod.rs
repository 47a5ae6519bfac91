// Per-block orchestration: parameters in, voices rendered, post stage out.

pub mod config;

use std::sync::Arc;

pub use self::config::{ConfigError, EngineConfig};
use crate::{
    dsp::Mixer,
    io::AudioBuffer,
    params::{ParameterSnapshot, SynthParams},
    synth::{MessageReceiver, NoteEvent, VoiceAllocator},
    telemetry::{scope, ScopeReader, ScopeWriter},
};

/*
One Block
=========

    output.clear()
    snapshot = params.snapshot()              every control read exactly once
    drain queued SynthMessages                take effect at sample 0
    play off?  → hard-stop voices, silence, done
    push snapshot into every voice            block-rate controls
    allocator renders, split at event offsets
    mixer: mute / pan / master gain
    channel 0 → scope ring

Nothing in process_block allocates, locks or logs.
*/

pub struct SynthEngine {
    config: EngineConfig,
    params: Arc<SynthParams>,
    allocator: VoiceAllocator,
    mixer: Mixer,
    receiver: Option<Box<dyn MessageReceiver>>,
    scope_writer: ScopeWriter,
    scope_reader: ScopeReader,
    last_snapshot: ParameterSnapshot,
}

impl SynthEngine {
    pub fn new(config: EngineConfig, params: Arc<SynthParams>) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            log::error!("Rejected engine config: {err}");
            return Err(err);
        }

        let spec = config.process_spec();
        let mut allocator = VoiceAllocator::new(config.voices, config.steal_policy, config.noise_seed);
        allocator.prepare(&spec);

        let snapshot = params.snapshot();
        allocator.apply_snapshot(&snapshot);

        let mut mixer = Mixer::new();
        mixer.set_pan(snapshot.pan);
        mixer.set_master_gain(snapshot.master_gain);
        mixer.set_muted(snapshot.muted);
        mixer.reset();

        let (scope_writer, scope_reader) = scope(config.scope_len);

        log::info!(
            "Synth engine ready: {} Hz, {} ch, block {}, {} voices, steal {:?}",
            config.sample_rate,
            config.channels,
            config.max_block_size,
            config.voices,
            config.steal_policy
        );

        Ok(Self {
            config,
            params,
            allocator,
            mixer,
            receiver: None,
            scope_writer,
            scope_reader,
            last_snapshot: snapshot,
        })
    }

    /// Attach a queue of note messages from another thread. Drained at the
    /// start of every block.
    pub fn with_message_queue(mut self, receiver: impl MessageReceiver + 'static) -> Self {
        log::debug!("Message queue attached");
        self.receiver = Some(Box::new(receiver));
        self
    }

    /// Render one block into `output`, overwriting it.
    ///
    /// `events` must be sorted by offset; offsets index into `output`.
    pub fn process_block(&mut self, output: &mut AudioBuffer, events: &[NoteEvent]) {
        debug_assert_eq!(
            output.num_channels(),
            self.config.channels,
            "output buffer channel count differs from engine config"
        );

        output.clear();
        let len = output.len();

        let snapshot = self.params.snapshot();
        self.last_snapshot = snapshot;

        if let Some(receiver) = self.receiver.as_mut() {
            while let Some(msg) = receiver.pop() {
                self.allocator.handle_event(msg.into());
            }
        }

        if !snapshot.play {
            if self.allocator.active_voice_count() > 0 {
                self.allocator.all_notes_off(false);
            }
            self.write_scope(output);
            return;
        }

        self.allocator.apply_snapshot(&snapshot);
        self.mixer.set_pan(snapshot.pan);
        self.mixer.set_master_gain(snapshot.master_gain);
        self.mixer.set_muted(snapshot.muted);

        self.allocator.render_next_block(output, events, 0, len);
        self.mixer.process(output, len);

        self.write_scope(output);
    }

    fn write_scope(&mut self, output: &AudioBuffer) {
        if output.num_channels() > 0 {
            self.scope_writer.push_slice(output.channel(0));
        }
    }

    /// Hard-stop every voice and snap the gain ramp to its target.
    pub fn reset(&mut self) {
        self.allocator.all_notes_off(false);
        self.mixer.reset();
    }

    pub fn scope_reader(&self) -> ScopeReader {
        self.scope_reader.clone()
    }

    pub fn params(&self) -> &Arc<SynthParams> {
        &self.params
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshot used by the most recent block.
    pub fn last_snapshot(&self) -> &ParameterSnapshot {
        &self.last_snapshot
    }

    pub fn allocator(&self) -> &VoiceAllocator {
        &self.allocator
    }

    /// Direct access for hosts that deliver notes without a queue.
    pub fn allocator_mut(&mut self) -> &mut VoiceAllocator {
        &mut self.allocator
    }

    pub fn active_voice_count(&self) -> usize {
        self.allocator.active_voice_count()
    }

    pub fn is_note_playing(&self, note: u8) -> bool {
        self.allocator.is_note_playing(note)
    }
}
