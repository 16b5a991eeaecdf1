//! ADSR envelope stage.
//!
//! A four-phase attack/decay/sustain/release state machine that scales the
//! incoming signal by its current level. There is no note-event model:
//! gate-on and gate-off are inferred per sample from whether the input's
//! magnitude crosses a fixed threshold ([`GATE_THRESHOLD`]).

use crate::param::{RangedParam, StageError, float_value};
use crate::stage::{Stage, StageKind};
use crate::value::ParamValue;

const PARAM_NAMES: &[&str] = &["attack", "decay", "sustain", "release"];

/// Input magnitude above which the envelope considers the gate open.
pub const GATE_THRESHOLD: f64 = 0.001;

/// Phases of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    /// No gate; level is zero.
    Idle,
    /// Rising toward full level.
    Attack,
    /// Falling from full level toward the sustain level.
    Decay,
    /// Holding at the sustain level while the gate stays open.
    Sustain,
    /// Falling toward zero after gate-off.
    Release,
}

/// Amplitude envelope: `output = input * level`.
///
/// ## Parameters
/// - `attack`: rise time in seconds (0.001 to 2.0, default 0.01)
/// - `decay`: fall time from peak to sustain in seconds (0.001 to 2.0, default 0.1)
/// - `sustain`: hold level (0.0 to 1.0, default 0.7)
/// - `release`: fall rate after gate-off, expressed as the time a full-scale
///   level would take to reach zero, in seconds (0.001 to 5.0, default 0.5)
pub struct Envelope {
    attack: RangedParam,
    decay: RangedParam,
    sustain: RangedParam,
    release: RangedParam,
    state: EnvState,
    level: f64,
    target: f64,
    rate: f64,
    sample_rate: f64,
}

impl Envelope {
    /// Creates an envelope with default parameters at 44.1 kHz.
    pub fn new() -> Self {
        Self {
            attack: RangedParam::new("attack", 0.01, 0.001, 2.0),
            decay: RangedParam::new("decay", 0.1, 0.001, 2.0),
            sustain: RangedParam::new("sustain", 0.7, 0.0, 1.0),
            release: RangedParam::new("release", 0.5, 0.001, 5.0),
            state: EnvState::Idle,
            level: 0.0,
            target: 0.0,
            rate: 0.0,
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
        }
    }

    /// Current phase of the state machine.
    pub fn state(&self) -> EnvState {
        self.state
    }

    /// Current envelope level in `[0.0, 1.0]`.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Level the state machine is currently moving toward.
    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Envelope {
    fn kind(&self) -> StageKind {
        StageKind::Envelope
    }

    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "input and output buffers must have same length"
        );
        for (out, &sample_in) in output.iter_mut().zip(input) {
            let magnitude = f64::from(sample_in).abs();
            if magnitude > GATE_THRESHOLD && self.state == EnvState::Idle {
                self.state = EnvState::Attack;
                self.level = 0.0;
                self.target = 1.0;
                self.rate = 1.0 / (self.attack.get() * self.sample_rate);
            } else if magnitude <= GATE_THRESHOLD
                && self.state != EnvState::Idle
                && self.state != EnvState::Release
            {
                self.state = EnvState::Release;
                self.target = 0.0;
                self.rate = 1.0 / (self.release.get() * self.sample_rate);
            }

            match self.state {
                EnvState::Attack => {
                    self.level += self.rate;
                    if self.level >= 1.0 {
                        self.level = 1.0;
                        self.state = EnvState::Decay;
                        self.target = self.sustain.get();
                        self.rate =
                            (1.0 - self.sustain.get()) / (self.decay.get() * self.sample_rate);
                    }
                }
                EnvState::Decay => {
                    self.level -= self.rate;
                    if self.level <= self.sustain.get() {
                        self.level = self.sustain.get();
                        self.state = EnvState::Sustain;
                    }
                }
                EnvState::Sustain => {
                    self.level = self.sustain.get();
                }
                EnvState::Release => {
                    self.level -= self.rate;
                    if self.level <= 0.0 {
                        self.level = 0.0;
                        self.state = EnvState::Idle;
                    }
                }
                EnvState::Idle => {
                    self.level = 0.0;
                }
            }

            *out = (f64::from(sample_in) * self.level) as f32;
        }
    }

    fn set_parameter(&mut self, name: &str, value: &ParamValue) -> Result<(), StageError> {
        match name {
            "attack" => self.attack.set(float_value(name, value)?),
            "decay" => self.decay.set(float_value(name, value)?),
            "sustain" => self.sustain.set(float_value(name, value)?),
            "release" => self.release.set(float_value(name, value)?),
            _ => Err(StageError::UnknownParameter(name.to_owned())),
        }
    }

    fn parameter(&self, name: &str) -> Result<ParamValue, StageError> {
        match name {
            "attack" => Ok(ParamValue::Float(self.attack.get())),
            "decay" => Ok(ParamValue::Float(self.decay.get())),
            "sustain" => Ok(ParamValue::Float(self.sustain.get())),
            "release" => Ok(ParamValue::Float(self.release.get())),
            _ => Err(StageError::UnknownParameter(name.to_owned())),
        }
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        PARAM_NAMES
    }

    fn parameter_range(&self, name: &str) -> Option<(f64, f64)> {
        match name {
            "attack" => Some(self.attack.range()),
            "decay" => Some(self.decay.range()),
            "sustain" => Some(self.sustain.range()),
            "release" => Some(self.release.range()),
            _ => None,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.state = EnvState::Idle;
        self.level = 0.0;
        self.target = 0.0;
        self.rate = 0.0;
    }

    fn describe(&self) -> String {
        format!(
            "envelope: A={:.3}s D={:.3}s S={:.2} R={:.3}s",
            self.attack.get(),
            self.decay.get(),
            self.sustain.get(),
            self.release.get()
        )
    }
}
