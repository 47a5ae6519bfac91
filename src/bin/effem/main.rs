//! effem - plays an arpeggio through the default output device
//!
//! Run with: RUST_LOG=info cargo run --bin effem

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use effem::{
    io::{converter::midi_to_synth, midi::MidiEvent, AudioBuffer},
    params::{ParamId, SynthParams},
    synth::SynthMessage,
    EngineConfig, SynthEngine, MAX_CHANNELS,
};
use rtrb::{Producer, RingBuffer};

const ARPEGGIO: [u8; 4] = [57, 60, 64, 69];
const STEP: Duration = Duration::from_millis(220);
const GATE: Duration = Duration::from_millis(160);
const RUN_TIME: Duration = Duration::from_secs(12);
const MESSAGE_QUEUE_LEN: usize = 64;
const MIDI_CHANNEL: u8 = 0;
const ARP_VELOCITY: u8 = 100;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(eyre!(
            "effem needs an f32 output stream, device offers {:?}",
            supported.sample_format()
        ));
    }

    let sample_rate = supported.sample_rate().0 as f32;
    let device_channels = supported.channels() as usize;
    log::info!(
        "Output device: {} ({} Hz, {} ch)",
        device.name().unwrap_or_else(|_| "unknown".into()),
        sample_rate,
        device_channels
    );

    let params = Arc::new(SynthParams::new());
    params.set(ParamId::Osc1Waveform, 2.0); // saw
    params.set(ParamId::Osc2Waveform, 1.0); // square
    params.set(ParamId::Osc2Pitch, 3.0); // +7 semitones
    params.set(ParamId::Osc2Detune, 6.0);
    params.set(ParamId::FilterCutoff, 1_200.0);
    params.set(ParamId::FilterResonance, 1.2);
    params.set(ParamId::Release, 0.25);
    params.set(ParamId::MasterGain, 0.5);

    let config = EngineConfig::new(sample_rate).with_channels(device_channels.clamp(1, MAX_CHANNELS));
    let (msg_tx, msg_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_QUEUE_LEN);
    let mut engine = SynthEngine::new(config, Arc::clone(&params))
        .wrap_err("failed to build synth engine")?
        .with_message_queue(msg_rx);
    let scope = engine.scope_reader();

    // Buffer reused by audio callback
    let mut block = AudioBuffer::new(config.channels, config.max_block_size);

    let stream = device
        .build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| {
                let block_samples = config.max_block_size * device_channels;
                for chunk in data.chunks_mut(block_samples) {
                    block.set_len(chunk.len() / device_channels);
                    engine.process_block(&mut block, &[]);
                    block.write_interleaved(chunk, device_channels);
                }
            },
            move |err| log::error!("Stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    // Arpeggio driver
    let driver = thread::spawn({
        let mut tx = msg_tx;
        move || {
            let started = Instant::now();
            'outer: loop {
                for &note in &ARPEGGIO {
                    if started.elapsed() >= RUN_TIME {
                        break 'outer;
                    }
                    send_midi(&mut tx, [0x90 | MIDI_CHANNEL, note, ARP_VELOCITY]);
                    thread::sleep(GATE);
                    send_midi(&mut tx, [0x80 | MIDI_CHANNEL, note, 0]);
                    thread::sleep(STEP - GATE);
                }
            }
            let _ = tx.push(SynthMessage::AllNotesOff);
        }
    });

    // Control loop: slow sweeps on a few parameters, scope level in the log
    let started = Instant::now();
    while started.elapsed() < RUN_TIME {
        let t = started.elapsed().as_secs_f32();
        let sweep = 0.5 - 0.5 * (t * 0.5).cos();

        params.set(ParamId::FilterCutoff, 300.0 + sweep * 4_000.0);
        params.set(ParamId::Blend, sweep);
        params.set(ParamId::Fm1Amount, if t > RUN_TIME.as_secs_f32() * 0.5 { sweep * 200.0 } else { 0.0 });
        params.set(ParamId::Pan, (t * 0.7).sin() * 0.6);

        log::info!(
            "t={t:5.2}s cutoff={:7.1} Hz blend={:.2} scope peak={:.3}",
            params.get(ParamId::FilterCutoff),
            params.get(ParamId::Blend),
            scope.peak()
        );
        thread::sleep(Duration::from_millis(250));
    }

    driver
        .join()
        .map_err(|_| eyre!("arpeggio thread panicked"))?;

    // Let the last release tail ring out
    thread::sleep(Duration::from_millis(500));
    drop(stream);
    log::info!("Done");

    Ok(())
}

/// Push a raw 3-byte MIDI message onto the engine queue.
fn send_midi(tx: &mut Producer<SynthMessage>, bytes: [u8; 3]) {
    let Some(msg) = MidiEvent::parse(&bytes).and_then(|ev| midi_to_synth(ev, MIDI_CHANNEL)) else {
        log::debug!("Ignored MIDI bytes {bytes:02X?}");
        return;
    };
    if tx.push(msg).is_err() {
        log::warn!("Message queue full, dropped {msg:?}");
    }
}
