//! The stage contract shared by every processing unit.
//!
//! A [`Stage`] is a named, stateful signal processor: it transforms a block
//! of samples while carrying continuous state (phase accumulators, filter
//! delays, envelope levels) across calls. All stages expose a flat tagged
//! parameter set and can be driven uniformly through a boxed trait object.

use crate::param::StageError;
use crate::value::ParamValue;

/// The closed set of stage kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Phase-accumulator tone generator.
    Oscillator,
    /// Second-order lowpass filter.
    Filter,
    /// ADSR amplitude envelope.
    Envelope,
    /// Low-frequency modulator.
    Lfo,
}

impl StageKind {
    /// Wire-format name of the kind (`"oscillator"`, `"filter"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            StageKind::Oscillator => "oscillator",
            StageKind::Filter => "filter",
            StageKind::Envelope => "envelope",
            StageKind::Lfo => "lfo",
        }
    }

    /// Parses a wire-format kind name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "oscillator" => Some(StageKind::Oscillator),
            "filter" => Some(StageKind::Filter),
            "envelope" => Some(StageKind::Envelope),
            "lfo" => Some(StageKind::Lfo),
            _ => None,
        }
    }
}

/// Waveform shapes shared by the oscillator and the LFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    /// Pure sine.
    #[default]
    Sine,
    /// Rising ramp with abrupt reset.
    Saw,
    /// Binary high/low.
    Square,
    /// Linear rise and fall.
    Triangle,
}

impl Waveform {
    /// Parses a `waveType` label. Unknown labels yield `None` and render
    /// as silence rather than failing the assignment.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sine" => Some(Waveform::Sine),
            "saw" => Some(Waveform::Saw),
            "square" => Some(Waveform::Square),
            "triangle" => Some(Waveform::Triangle),
            _ => None,
        }
    }

    /// The `waveType` label for this shape.
    pub const fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
        }
    }

    /// Evaluates the waveform at `phase` radians in `[0, TAU)`.
    ///
    /// Output is in `[-1.0, 1.0]`.
    #[inline]
    pub fn sample(self, phase: f64) -> f64 {
        use std::f64::consts::PI;
        use std::f64::consts::TAU;
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Saw => 2.0 * (phase / TAU) - 1.0,
            Waveform::Square => {
                if phase < PI {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                if phase < PI {
                    2.0 * phase / PI - 1.0
                } else {
                    3.0 - 2.0 * phase / PI
                }
            }
        }
    }
}

/// Object-safe trait implemented by every processing stage.
///
/// Stages are driven repeatedly with their internal state carried forward;
/// [`reset`](Self::reset) clears that transient state while leaving
/// parameter values untouched.
pub trait Stage: Send {
    /// Which kind of stage this is.
    fn kind(&self) -> StageKind;

    /// Processes one block of samples.
    ///
    /// `output` must have the same length as `input`. Semantics vary by
    /// kind: generators mix onto the input, modulators scale or offset it.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]);

    /// Assigns a parameter by name.
    ///
    /// Fails with [`StageError::TypeMismatch`] when the tagged value's type
    /// does not match the parameter's declared type, and with
    /// [`StageError::OutOfRange`] when a ranged numeric parameter falls
    /// outside its declared `[min, max]`.
    fn set_parameter(&mut self, name: &str, value: &ParamValue) -> Result<(), StageError>;

    /// Reads a parameter by name.
    fn parameter(&self, name: &str) -> Result<ParamValue, StageError>;

    /// Names of every parameter this stage exposes.
    fn parameter_names(&self) -> &'static [&'static str];

    /// Declared `(min, max)` range of a numeric parameter, if any.
    ///
    /// Text parameters and unknown names return `None`. Used by the safety
    /// layer to keep repair values assignable.
    fn parameter_range(&self, name: &str) -> Option<(f64, f64)> {
        let _ = name;
        None
    }

    /// Updates the sample rate used for time-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f64);

    /// Clears transient state (phase, filter delays, envelope level).
    ///
    /// Parameter values are preserved.
    fn reset(&mut self);

    /// Human-readable one-line summary for diagnostics.
    fn describe(&self) -> String;
}
