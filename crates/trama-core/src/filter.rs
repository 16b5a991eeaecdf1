//! Second-order lowpass filter stage.
//!
//! A biquad in direct form I. The five coefficients are derived from the
//! current cutoff and resonance on every call (nothing is cached across
//! blocks), while the four delay-line scalars persist as the stage's
//! continuous state.

use std::f64::consts::TAU;

use crate::param::{RangedParam, StageError, float_value, text_value};
use crate::stage::{Stage, StageKind};
use crate::value::ParamValue;

const PARAM_NAMES: &[&str] = &["cutoff", "resonance", "filterType"];

/// Resonant lowpass biquad.
///
/// ## Parameters
/// - `cutoff`: corner frequency in Hz (20.0 to 20000.0, default 1000.0)
/// - `resonance`: filter Q (0.0 to 0.99, default 0.1)
/// - `filterType`: descriptive label (default `"lowpass"`); the response
///   is always the lowpass form regardless of the label
pub struct Filter {
    cutoff: RangedParam,
    resonance: RangedParam,
    filter_label: String,
    // Direct form I delay scalars.
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    sample_rate: f64,
}

impl Filter {
    /// Creates a filter with default parameters at 44.1 kHz.
    pub fn new() -> Self {
        Self {
            cutoff: RangedParam::new("cutoff", 1000.0, 20.0, 20000.0),
            resonance: RangedParam::new("resonance", 0.1, 0.0, 0.99),
            filter_label: "lowpass".to_owned(),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
            sample_rate: crate::DEFAULT_SAMPLE_RATE,
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Filter {
    fn kind(&self) -> StageKind {
        StageKind::Filter
    }

    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "input and output buffers must have same length"
        );
        let w0 = TAU * self.cutoff.get() / self.sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * self.resonance.get());

        let a0 = 1.0 + alpha;
        let b0 = (1.0 - cos_w0) / 2.0 / a0;
        let b1 = (1.0 - cos_w0) / a0;
        let b2 = (1.0 - cos_w0) / 2.0 / a0;
        let a1 = -2.0 * cos_w0 / a0;
        let a2 = (1.0 - alpha) / a0;

        for (out, &sample_in) in output.iter_mut().zip(input) {
            let x0 = f64::from(sample_in);
            let y0 = b0 * x0 + b1 * self.x1 + b2 * self.x2 - a1 * self.y1 - a2 * self.y2;
            self.x2 = self.x1;
            self.x1 = x0;
            self.y2 = self.y1;
            self.y1 = y0;
            *out = y0 as f32;
        }
    }

    fn set_parameter(&mut self, name: &str, value: &ParamValue) -> Result<(), StageError> {
        match name {
            "cutoff" => self.cutoff.set(float_value(name, value)?),
            "resonance" => self.resonance.set(float_value(name, value)?),
            "filterType" => {
                self.filter_label = text_value(name, value)?.to_owned();
                Ok(())
            }
            _ => Err(StageError::UnknownParameter(name.to_owned())),
        }
    }

    fn parameter(&self, name: &str) -> Result<ParamValue, StageError> {
        match name {
            "cutoff" => Ok(ParamValue::Float(self.cutoff.get())),
            "resonance" => Ok(ParamValue::Float(self.resonance.get())),
            "filterType" => Ok(ParamValue::Text(self.filter_label.clone())),
            _ => Err(StageError::UnknownParameter(name.to_owned())),
        }
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        PARAM_NAMES
    }

    fn parameter_range(&self, name: &str) -> Option<(f64, f64)> {
        match name {
            "cutoff" => Some(self.cutoff.range()),
            "resonance" => Some(self.resonance.range()),
            _ => None,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    fn describe(&self) -> String {
        format!(
            "filter: {} at {:.1} Hz, resonance {:.2}",
            self.filter_label,
            self.cutoff.get(),
            self.resonance.get()
        )
    }
}
