#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{AdsrParams, FilterType, WaveformKind},
    params::ParamId,
};

/// Per-oscillator controls as read at the start of a block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorSettings {
    pub waveform: WaveformKind,
    /// Index into the pitch table (-12, -7, 0, +7, +12 semitones).
    pub pitch_index: i32,
    pub detune_cents: f32,
    pub gain: f32,
    pub enabled: bool,
    /// FM depth in Hz applied by the *other* oscillator to this one.
    pub fm_amount: f32,
}

/// Plain copy of every control value, taken once per block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub play: bool,
    pub muted: bool,
    pub osc1: OscillatorSettings,
    pub osc2: OscillatorSettings,
    pub blend: f32,
    pub envelope: AdsrParams,
    pub filter_type: FilterType,
    pub filter_cutoff: f32,
    pub filter_resonance: f32,
    pub pan: f32,
    pub master_gain: f32,
}

impl ParameterSnapshot {
    pub(crate) fn read(mut get: impl FnMut(ParamId) -> f32) -> Self {
        let mut flag = |param| get(param) != 0.0;
        let play = flag(ParamId::Play);
        let muted = flag(ParamId::Mute);
        let osc1_on = flag(ParamId::Osc1On);
        let osc2_on = flag(ParamId::Osc2On);

        Self {
            play,
            muted,
            osc1: OscillatorSettings {
                waveform: WaveformKind::from_index(get(ParamId::Osc1Waveform) as i32),
                pitch_index: get(ParamId::Osc1Pitch) as i32,
                detune_cents: get(ParamId::Osc1Detune),
                gain: get(ParamId::Osc1Gain),
                enabled: osc1_on,
                fm_amount: get(ParamId::Fm1Amount),
            },
            osc2: OscillatorSettings {
                waveform: WaveformKind::from_index(get(ParamId::Osc2Waveform) as i32),
                pitch_index: get(ParamId::Osc2Pitch) as i32,
                detune_cents: get(ParamId::Osc2Detune),
                gain: get(ParamId::Osc2Gain),
                enabled: osc2_on,
                fm_amount: get(ParamId::Fm2Amount),
            },
            blend: get(ParamId::Blend),
            envelope: AdsrParams {
                attack: get(ParamId::Attack),
                decay: get(ParamId::Decay),
                sustain: get(ParamId::Sustain),
                release: get(ParamId::Release),
            },
            filter_type: FilterType::from_index(get(ParamId::FilterType) as i32),
            filter_cutoff: get(ParamId::FilterCutoff),
            filter_resonance: get(ParamId::FilterResonance),
            pan: get(ParamId::Pan),
            master_gain: get(ParamId::MasterGain),
        }
    }

    pub(crate) fn write(&self, mut set: impl FnMut(ParamId, f32)) {
        let flag = |on: bool| if on { 1.0 } else { 0.0 };

        set(ParamId::Play, flag(self.play));
        set(ParamId::Mute, flag(self.muted));

        set(ParamId::Osc1Waveform, self.osc1.waveform.index() as f32);
        set(ParamId::Osc1Pitch, self.osc1.pitch_index as f32);
        set(ParamId::Osc1Detune, self.osc1.detune_cents);
        set(ParamId::Osc1Gain, self.osc1.gain);
        set(ParamId::Osc1On, flag(self.osc1.enabled));
        set(ParamId::Fm1Amount, self.osc1.fm_amount);

        set(ParamId::Osc2Waveform, self.osc2.waveform.index() as f32);
        set(ParamId::Osc2Pitch, self.osc2.pitch_index as f32);
        set(ParamId::Osc2Detune, self.osc2.detune_cents);
        set(ParamId::Osc2Gain, self.osc2.gain);
        set(ParamId::Osc2On, flag(self.osc2.enabled));
        set(ParamId::Fm2Amount, self.osc2.fm_amount);

        set(ParamId::Blend, self.blend);
        set(ParamId::Attack, self.envelope.attack);
        set(ParamId::Decay, self.envelope.decay);
        set(ParamId::Sustain, self.envelope.sustain);
        set(ParamId::Release, self.envelope.release);
        set(ParamId::FilterType, self.filter_type.index() as f32);
        set(ParamId::FilterCutoff, self.filter_cutoff);
        set(ParamId::FilterResonance, self.filter_resonance);
        set(ParamId::Pan, self.pan);
        set(ParamId::MasterGain, self.master_gain);
    }
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self::read(|param| param.range().default)
    }
}
