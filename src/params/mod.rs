//! Control parameters shared between a UI/control thread and the audio thread.
//!
//! Every parameter is a single `f32` stored as bits in an `AtomicU32`. The
//! control thread writes with `set`; the audio thread calls `snapshot` once
//! per block and works from that plain copy for the rest of the block. No
//! locks, no allocation, and a value is never observed half-written.
//! Two parameters may come from different writes (tearing across cells is
//! fine), but the next block always sees the latest committed value.

pub mod snapshot;

use std::sync::atomic::{AtomicU32, Ordering};

pub use snapshot::{OscillatorSettings, ParameterSnapshot};

/// How a parameter's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    /// Integer index in `0..count`.
    Choice { count: u8 },
    /// 0.0 = off, anything else = on.
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }
}

macro_rules! params {
    ($($variant:ident => $id:literal, $kind:expr, ($min:expr, $max:expr, $default:expr);)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ParamId {
            $($variant,)+
        }

        impl ParamId {
            pub const ALL: &'static [ParamId] = &[$(ParamId::$variant,)+];
            pub const COUNT: usize = Self::ALL.len();

            /// Stable string id, e.g. `"osc1Gain"`.
            pub fn id(self) -> &'static str {
                match self {
                    $(ParamId::$variant => $id,)+
                }
            }

            pub fn kind(self) -> ParamKind {
                match self {
                    $(ParamId::$variant => $kind,)+
                }
            }

            pub fn range(self) -> ParamRange {
                match self {
                    $(ParamId::$variant => ParamRange::new($min, $max, $default),)+
                }
            }
        }
    };
}

const TOGGLE: ParamKind = ParamKind::Toggle;
const FLOAT: ParamKind = ParamKind::Float;
const WAVEFORM: ParamKind = ParamKind::Choice { count: 7 };
const PITCH: ParamKind = ParamKind::Choice { count: 5 };
const FILTER: ParamKind = ParamKind::Choice { count: 3 };

params! {
    Play            => "play",            TOGGLE,   (0.0, 1.0, 1.0);
    Mute            => "mute",            TOGGLE,   (0.0, 1.0, 0.0);
    Osc1Waveform    => "osc1Wave",        WAVEFORM, (0.0, 6.0, 0.0);
    Osc2Waveform    => "osc2Wave",        WAVEFORM, (0.0, 6.0, 0.0);
    Osc1Pitch       => "osc1Pitch",       PITCH,    (0.0, 4.0, 2.0);
    Osc2Pitch       => "osc2Pitch",       PITCH,    (0.0, 4.0, 2.0);
    Osc1Detune      => "osc1Detune",      FLOAT,    (-50.0, 50.0, 0.0);
    Osc2Detune      => "osc2Detune",      FLOAT,    (-50.0, 50.0, 0.0);
    Osc1Gain        => "osc1Gain",        FLOAT,    (0.0, 1.0, 0.8);
    Osc2Gain        => "osc2Gain",        FLOAT,    (0.0, 1.0, 0.4);
    Osc1On          => "osc1On",          TOGGLE,   (0.0, 1.0, 1.0);
    Osc2On          => "osc2On",          TOGGLE,   (0.0, 1.0, 1.0);
    Fm1Amount       => "fm1Amount",       FLOAT,    (0.0, 1000.0, 0.0);
    Fm2Amount       => "fm2Amount",       FLOAT,    (0.0, 1000.0, 0.0);
    Blend           => "blend",           FLOAT,    (0.0, 1.0, 0.5);
    Attack          => "attack",          FLOAT,    (0.0, 5.0, 0.01);
    Decay           => "decay",           FLOAT,    (0.0, 5.0, 0.1);
    Sustain         => "sustain",         FLOAT,    (0.0, 1.0, 0.8);
    Release         => "release",         FLOAT,    (0.0, 5.0, 0.3);
    FilterType      => "filterType",      FILTER,   (0.0, 2.0, 0.0);
    FilterCutoff    => "filterCutoff",    FLOAT,    (20.0, 20_000.0, 20_000.0);
    FilterResonance => "filterResonance", FLOAT,    (0.1, 1.5, std::f32::consts::FRAC_1_SQRT_2);
    Pan             => "pan",             FLOAT,    (-1.0, 1.0, 0.0);
    MasterGain      => "masterGain",      FLOAT,    (0.0, 1.0, 0.8);
}

impl ParamId {
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|param| param.id() == id)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Clamp to range; choices round to the nearest index, toggles to 0/1.
    pub fn sanitize(self, value: f32) -> f32 {
        let value = self.range().clamp(value);
        match self.kind() {
            ParamKind::Float => value,
            ParamKind::Choice { .. } => value.round(),
            ParamKind::Toggle => {
                if value != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// The full bank of live parameter cells. Share as `Arc<SynthParams>`.
pub struct SynthParams {
    cells: [AtomicU32; ParamId::COUNT],
}

impl SynthParams {
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|i| {
                AtomicU32::new(ParamId::ALL[i].range().default.to_bits())
            }),
        }
    }

    #[inline]
    pub fn get(&self, param: ParamId) -> f32 {
        f32::from_bits(self.cells[param.index()].load(Ordering::Acquire))
    }

    /// Store a new value, clamped to the parameter's range.
    pub fn set(&self, param: ParamId, value: f32) {
        let value = param.sanitize(value);
        self.cells[param.index()].store(value.to_bits(), Ordering::Release);
    }

    pub fn set_bool(&self, param: ParamId, on: bool) {
        self.set(param, if on { 1.0 } else { 0.0 });
    }

    /// Set by string id. Returns false for an unknown id.
    pub fn set_by_id(&self, id: &str, value: f32) -> bool {
        match ParamId::from_id(id) {
            Some(param) => {
                self.set(param, value);
                true
            }
            None => false,
        }
    }

    pub fn reset_to_defaults(&self) {
        for &param in ParamId::ALL {
            self.set(param, param.range().default);
        }
    }

    /// Read every cell exactly once into a plain per-block copy.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot::read(|param| self.get(param))
    }

    /// Write every value of a snapshot back into the cells.
    pub fn apply_snapshot(&self, snapshot: &ParameterSnapshot) {
        snapshot.write(|param, value| self.set(param, value));
    }
}

impl Default for SynthParams {
    fn default() -> Self {
        Self::new()
    }
}
