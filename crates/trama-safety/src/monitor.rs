//! Safety metrics snapshot and threshold monitoring.
//!
//! [`SafetyMetrics`] is an ephemeral, recomputed-on-demand view of one
//! buffer; nothing here is persisted. The pass/fail thresholds are fixed:
//! no clipping, no denormals, true peak at or below -0.1 dB, DC offset at
//! or below -60 dB, and at least 3 dB of headroom.

use crate::{dynamics, headroom, validate};

/// Maximum acceptable true peak, in dBFS.
pub const TRUE_PEAK_LIMIT_DB: f32 = -0.1;

/// Maximum acceptable DC offset level, in dB.
pub const DC_OFFSET_LIMIT_DB: f32 = -60.0;

/// Minimum acceptable headroom, in dB.
pub const MIN_HEADROOM_DB: f32 = 3.0;

/// Snapshot of one buffer's safety-relevant measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyMetrics {
    /// Sample-peak level in dBFS.
    pub true_peak_db: f32,
    /// RMS level in dBFS.
    pub rms_db: f32,
    /// Peak-to-RMS ratio in dB.
    pub crest_factor_db: f32,
    /// DC component level in dB.
    pub dc_offset_db: f32,
    /// Whether any sample reached full scale.
    pub clipping: bool,
    /// Whether any sample is an IEEE subnormal.
    pub denormals: bool,
    /// Distance from peak to full scale in dB.
    pub headroom_db: f32,
}

/// Computes the full metrics snapshot for a buffer.
pub fn safety_metrics(audio: &[f32]) -> SafetyMetrics {
    SafetyMetrics {
        true_peak_db: dynamics::peak_db(audio),
        rms_db: dynamics::rms_db(audio),
        crest_factor_db: dynamics::crest_factor_db(audio),
        dc_offset_db: dynamics::to_db(dynamics::dc_offset(audio).abs()),
        clipping: validate::has_clipping(audio),
        denormals: validate::has_denormals(audio),
        headroom_db: headroom::headroom_db(audio),
    }
}

/// Classifies a snapshot against the fixed thresholds.
pub fn within_thresholds(metrics: &SafetyMetrics) -> bool {
    !metrics.clipping
        && !metrics.denormals
        && metrics.true_peak_db <= TRUE_PEAK_LIMIT_DB
        && metrics.dc_offset_db <= DC_OFFSET_LIMIT_DB
        && metrics.headroom_db >= MIN_HEADROOM_DB
}

/// Measures and classifies in one call.
pub fn monitor_safety(audio: &[f32]) -> bool {
    within_thresholds(&safety_metrics(audio))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(amplitude: f32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|n| amplitude * (std::f32::consts::TAU * n as f32 / 100.0).sin())
            .collect()
    }

    #[test]
    fn metrics_of_a_quarter_scale_sine() {
        let audio = sine(0.25, 10000);
        let metrics = safety_metrics(&audio);
        assert!((metrics.true_peak_db + 12.04).abs() < 0.1);
        assert!((metrics.rms_db + 15.05).abs() < 0.1);
        assert!((metrics.crest_factor_db - 3.01).abs() < 0.1);
        assert!((metrics.headroom_db - 12.04).abs() < 0.1);
        assert!(!metrics.clipping);
        assert!(!metrics.denormals);
    }

    #[test]
    fn quarter_scale_sine_passes() {
        assert!(monitor_safety(&sine(0.25, 10000)));
    }

    #[test]
    fn clipping_fails() {
        let mut audio = sine(0.25, 1000);
        audio[500] = 1.0;
        assert!(!monitor_safety(&audio));
    }

    #[test]
    fn tight_headroom_fails() {
        // Peak 0.9 leaves ~0.9 dB of headroom, under the 3 dB minimum.
        assert!(!monitor_safety(&sine(0.9, 1000)));
    }

    #[test]
    fn dc_offset_fails() {
        let audio: Vec<f32> = sine(0.25, 10000).iter().map(|s| s + 0.05).collect();
        let metrics = safety_metrics(&audio);
        assert!(metrics.dc_offset_db > DC_OFFSET_LIMIT_DB);
        assert!(!within_thresholds(&metrics));
    }

    #[test]
    fn denormals_fail() {
        let mut audio = sine(0.25, 1000);
        audio[10] = f32::MIN_POSITIVE / 4.0;
        let metrics = safety_metrics(&audio);
        assert!(metrics.denormals);
        assert!(!within_thresholds(&metrics));
    }
}
