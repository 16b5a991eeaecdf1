//! Low-frequency oscillator stage.
//!
//! Structurally the same phase accumulator as the audio-rate oscillator,
//! but running at modulation rates and summed onto the input scaled by a
//! depth parameter.

use std::f64::consts::TAU;

use crate::param::{RangedParam, StageError, float_value, text_value};
use crate::stage::{Stage, StageKind, Waveform};
use crate::value::ParamValue;

const PARAM_NAMES: &[&str] = &["rate", "depth", "waveType"];

/// Low-frequency modulator: `output = input + waveform(phase) * depth`.
///
/// ## Parameters
/// - `rate`: modulation frequency in Hz (0.01 to 20.0, default 1.0)
/// - `depth`: modulation amount (0.0 to 1.0, default 0.5)
/// - `waveType`: `"sine"`, `"saw"`, `"square"`, or `"triangle"` (default `"sine"`)
pub struct Lfo {
    rate: RangedParam,
    depth: RangedParam,
    wave_name: String,
    waveform: Option<Waveform>,
    phase: f64,
    sample_rate: f64,
}

impl Lfo {
    /// Creates an LFO with default parameters at 44.1 kHz.
    pub fn new() -> Self {
        Self {
            rate: RangedParam::new("rate", 1.0, 0.01, 20.0),
            depth: RangedParam::new("depth", 0.5, 0.0, 1.0),
            wave_name: "sine".to_owned(),
            waveform: Some(Waveform::Sine),
            phase: 0.0,
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Lfo {
    fn kind(&self) -> StageKind {
        StageKind::Lfo
    }

    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "input and output buffers must have same length"
        );
        let increment = TAU * self.rate.get() / self.sample_rate;
        let depth = self.depth.get();
        for (out, &sample_in) in output.iter_mut().zip(input) {
            let modulation = match self.waveform {
                Some(wave) => wave.sample(self.phase) * depth,
                None => 0.0,
            };
            *out = (f64::from(sample_in) + modulation) as f32;
            self.phase += increment;
            while self.phase >= TAU {
                self.phase -= TAU;
            }
        }
    }

    fn set_parameter(&mut self, name: &str, value: &ParamValue) -> Result<(), StageError> {
        match name {
            "rate" => self.rate.set(float_value(name, value)?),
            "depth" => self.depth.set(float_value(name, value)?),
            "waveType" => {
                let label = text_value(name, value)?;
                self.waveform = Waveform::from_name(label);
                self.wave_name = label.to_owned();
                Ok(())
            }
            _ => Err(StageError::UnknownParameter(name.to_owned())),
        }
    }

    fn parameter(&self, name: &str) -> Result<ParamValue, StageError> {
        match name {
            "rate" => Ok(ParamValue::Float(self.rate.get())),
            "depth" => Ok(ParamValue::Float(self.depth.get())),
            "waveType" => Ok(ParamValue::Text(self.wave_name.clone())),
            _ => Err(StageError::UnknownParameter(name.to_owned())),
        }
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        PARAM_NAMES
    }

    fn parameter_range(&self, name: &str) -> Option<(f64, f64)> {
        match name {
            "rate" => Some(self.rate.range()),
            "depth" => Some(self.depth.range()),
            _ => None,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }

    fn describe(&self) -> String {
        format!(
            "lfo: {} at {:.2} Hz, depth {:.2}",
            self.wave_name,
            self.rate.get(),
            self.depth.get()
        )
    }
}
