//! Level measurement shared by the safety layer.
//!
//! Peak here is the maximum absolute sample value: a sample-peak
//! approximation with no oversampling, which is all the layer's
//! thresholds are calibrated against.

/// Maximum absolute sample value (linear).
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()))
}

/// Peak level in dBFS. Silence floors at -200 dB.
pub fn peak_db(signal: &[f32]) -> f32 {
    to_db(peak(signal))
}

/// Root-mean-square level (linear). Empty buffers measure 0.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = signal.iter().map(|&s| s * s).sum();
    (sum_sq / signal.len() as f32).sqrt()
}

/// RMS level in dBFS. Silence floors at -200 dB.
pub fn rms_db(signal: &[f32]) -> f32 {
    to_db(rms(signal))
}

/// Peak-to-RMS ratio in dB; 0 for silent buffers.
///
/// A sine measures ~3 dB; transient-heavy material much more.
pub fn crest_factor_db(signal: &[f32]) -> f32 {
    let rms_val = rms(signal);
    if rms_val > 1e-10 {
        20.0 * (peak(signal) / rms_val).log10()
    } else {
        0.0
    }
}

/// Mean sample value, i.e. the DC component (linear). Empty buffers measure 0.
pub fn dc_offset(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().sum::<f32>() / signal.len() as f32
}

/// Converts a linear level to dB with a 1e-10 silence floor.
pub(crate) fn to_db(linear: f32) -> f32 {
    20.0 * linear.max(1e-10).log10()
}
