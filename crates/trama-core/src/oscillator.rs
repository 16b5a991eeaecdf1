//! Phase-accumulator oscillator stage.
//!
//! Generates one of four waveforms at a configurable frequency and mixes it
//! *onto* the incoming signal: the oscillator is additive, it never
//! replaces what already arrived. This is what lets a chain of generators
//! layer without an explicit mixer.

use std::f64::consts::TAU;

use crate::param::{RangedParam, StageError, float_value, text_value};
use crate::stage::{Stage, StageKind, Waveform};
use crate::value::ParamValue;

const PARAM_NAMES: &[&str] = &["frequency", "amplitude", "phase", "waveType"];

/// Waveform generator driven by a wrapped phase accumulator.
///
/// ## Parameters
/// - `frequency`: oscillation frequency in Hz (20.0 to 20000.0, default 440.0)
/// - `amplitude`: linear output scale (0.0 to 1.0, default 0.5)
/// - `phase`: phase offset in cycles, sine only (0.0 to 1.0, default 0.0)
/// - `waveType`: `"sine"`, `"saw"`, `"square"`, or `"triangle"` (default `"sine"`)
///
/// Output per sample is `waveform(phase) * amplitude + input`. An
/// unrecognized `waveType` label is accepted and contributes silence.
pub struct Oscillator {
    frequency: RangedParam,
    amplitude: RangedParam,
    phase: RangedParam,
    wave_name: String,
    waveform: Option<Waveform>,
    /// Accumulated phase in radians, wrapped to `[0, TAU)`.
    phase_acc: f64,
    sample_rate: f64,
}

impl Oscillator {
    /// Creates an oscillator with default parameters at 44.1 kHz.
    pub fn new() -> Self {
        Self {
            frequency: RangedParam::new("frequency", 440.0, 20.0, 20000.0),
            amplitude: RangedParam::new("amplitude", 0.5, 0.0, 1.0),
            phase: RangedParam::new("phase", 0.0, 0.0, 1.0),
            wave_name: "sine".to_owned(),
            waveform: Some(Waveform::Sine),
            phase_acc: 0.0,
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Oscillator {
    fn kind(&self) -> StageKind {
        StageKind::Oscillator
    }

    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "input and output buffers must have same length"
        );
        let increment = TAU * self.frequency.get() / self.sample_rate;
        let amplitude = self.amplitude.get();
        let offset = self.phase.get() * TAU;
        for (out, &sample_in) in output.iter_mut().zip(input) {
            let raw = match self.waveform {
                // The phase offset applies to the sine shape only; the
                // piecewise shapes read the bare accumulator.
                Some(Waveform::Sine) => (self.phase_acc + offset).sin(),
                Some(wave) => wave.sample(self.phase_acc),
                None => 0.0,
            };
            *out = (raw * amplitude + f64::from(sample_in)) as f32;
            self.phase_acc += increment;
            while self.phase_acc >= TAU {
                self.phase_acc -= TAU;
            }
        }
    }

    fn set_parameter(&mut self, name: &str, value: &ParamValue) -> Result<(), StageError> {
        match name {
            "frequency" => self.frequency.set(float_value(name, value)?),
            "amplitude" => self.amplitude.set(float_value(name, value)?),
            "phase" => self.phase.set(float_value(name, value)?),
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
            "frequency" => Ok(ParamValue::Float(self.frequency.get())),
            "amplitude" => Ok(ParamValue::Float(self.amplitude.get())),
            "phase" => Ok(ParamValue::Float(self.phase.get())),
            "waveType" => Ok(ParamValue::Text(self.wave_name.clone())),
            _ => Err(StageError::UnknownParameter(name.to_owned())),
        }
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        PARAM_NAMES
    }

    fn parameter_range(&self, name: &str) -> Option<(f64, f64)> {
        match name {
            "frequency" => Some(self.frequency.range()),
            "amplitude" => Some(self.amplitude.range()),
            "phase" => Some(self.phase.range()),
            _ => None,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.phase_acc = 0.0;
    }

    fn describe(&self) -> String {
        format!(
            "oscillator: {} wave at {:.1} Hz, amplitude {:.2}",
            self.wave_name,
            self.frequency.get(),
            self.amplitude.get()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(frequency: f64, amplitude: f64, wave: &str) -> Oscillator {
        let mut osc = Oscillator::new();
        osc.set_parameter("frequency", &ParamValue::Float(frequency))
            .unwrap();
        osc.set_parameter("amplitude", &ParamValue::Float(amplitude))
            .unwrap();
        osc.set_parameter("waveType", &ParamValue::from(wave))
            .unwrap();
        osc
    }

    #[test]
    fn defaults() {
        let osc = Oscillator::new();
        assert_eq!(osc.parameter("frequency").unwrap(), ParamValue::Float(440.0));
        assert_eq!(osc.parameter("amplitude").unwrap(), ParamValue::Float(0.5));
        assert_eq!(osc.parameter("waveType").unwrap(), ParamValue::from("sine"));
    }

    #[test]
    fn sine_matches_closed_form() {
        let mut osc = configured(440.0, 0.5, "sine");
        let input = vec![0.0_f32; 256];
        let mut output = vec![0.0_f32; 256];
        osc.process_block(&input, &mut output);
        for (k, &sample) in output.iter().enumerate() {
            let expected = (0.5 * (TAU * 440.0 * k as f64 / 44100.0).sin()) as f32;
            assert!(
                (sample - expected).abs() < 1e-6,
                "sample {k}: got {sample}, expected {expected}"
            );
        }
    }

    #[test]
    fn output_mixes_onto_input() {
        let mut osc = configured(440.0, 0.5, "sine");
        let input = vec![0.25_f32; 64];
        let mut output = vec![0.0_f32; 64];
        osc.process_block(&input, &mut output);
        // Sample 0 is sin(0) * 0.5 + 0.25.
        assert!((output[0] - 0.25).abs() < 1e-7);
        // The carrier rides on top of the input rather than replacing it.
        let mut reference = vec![0.0_f32; 64];
        osc.reset();
        osc.process_block(&vec![0.0_f32; 64], &mut reference);
        for (mixed, tone) in output.iter().zip(&reference) {
            assert!((mixed - tone - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn unknown_waveform_is_silent() {
        let mut osc = configured(440.0, 1.0, "wobble");
        let input = vec![0.0_f32; 32];
        let mut output = vec![1.0_f32; 32];
        osc.process_block(&input, &mut output);
        assert!(output.iter().all(|&s| s == 0.0));
        // The label is preserved for diagnostics.
        assert_eq!(osc.parameter("waveType").unwrap(), ParamValue::from("wobble"));
    }

    #[test]
    fn reset_clears_phase_but_keeps_parameters() {
        let mut osc = configured(1000.0, 0.8, "saw");
        let input = vec![0.0_f32; 100];
        let mut first = vec![0.0_f32; 100];
        osc.process_block(&input, &mut first);
        osc.reset();
        let mut second = vec![0.0_f32; 100];
        osc.process_block(&input, &mut second);
        assert_eq!(first, second);
        assert_eq!(osc.parameter("amplitude").unwrap(), ParamValue::Float(0.8));
    }

    #[test]
    fn rejects_out_of_range_frequency() {
        let mut osc = Oscillator::new();
        let err = osc
            .set_parameter("frequency", &ParamValue::Float(5.0))
            .unwrap_err();
        assert!(matches!(err, StageError::OutOfRange { .. }));
        let err = osc
            .set_parameter("frequency", &ParamValue::Float(96000.0))
            .unwrap_err();
        assert!(matches!(err, StageError::OutOfRange { .. }));
    }

    #[test]
    fn rejects_mistyped_values() {
        let mut osc = Oscillator::new();
        assert!(matches!(
            osc.set_parameter("frequency", &ParamValue::from("fast")),
            Err(StageError::TypeMismatch { .. })
        ));
        assert!(matches!(
            osc.set_parameter("waveType", &ParamValue::Float(1.0)),
            Err(StageError::TypeMismatch { .. })
        ));
        assert!(matches!(
            osc.set_parameter("detune", &ParamValue::Float(1.0)),
            Err(StageError::UnknownParameter(_))
        ));
    }

    #[test]
    fn phase_offset_shifts_sine() {
        let mut osc = configured(440.0, 1.0, "sine");
        osc.set_parameter("phase", &ParamValue::Float(0.25)).unwrap();
        let input = vec![0.0_f32; 4];
        let mut output = vec![0.0_f32; 4];
        osc.process_block(&input, &mut output);
        // A quarter-cycle offset starts the sine at its crest.
        assert!((output[0] - 1.0).abs() < 1e-6);
    }
}
