//! Peak limiting over rendered buffers.
//!
//! Peak detection is direct sample-peak scanning (no oversampling). Three
//! flavors: a uniform scale-down to a ceiling, a per-sample soft knee, and
//! a hard clamp. All limits and thresholds are in dBFS.

use trama_core::db_to_linear;

use crate::dynamics;

/// Default true-peak ceiling in dBFS.
pub const DEFAULT_LIMIT_DB: f32 = -1.0;

/// Default soft-limit threshold in dBFS.
pub const DEFAULT_SOFT_THRESHOLD_DB: f32 = -3.0;

/// Default soft-limit ratio.
pub const DEFAULT_SOFT_RATIO: f32 = 4.0;

/// Maximum absolute sample value in the buffer (linear).
pub fn true_peak(audio: &[f32]) -> f32 {
    dynamics::peak(audio)
}

/// Scales the whole buffer down uniformly when its peak exceeds
/// `limit_db`. Quieter buffers pass unchanged.
pub fn limit_true_peak(audio: &mut [f32], limit_db: f32) {
    let peak = true_peak(audio);
    let limit_linear = db_to_linear(f64::from(limit_db)) as f32;
    if peak > limit_linear {
        let gain = limit_linear / peak;
        tracing::debug!("limit_true_peak: peak {:.4} -> gain {:.4}", peak, gain);
        for sample in audio.iter_mut() {
            *sample *= gain;
        }
    }
}

/// Per-sample soft knee: magnitude above the threshold is reduced by
/// `ratio` (4.0 means excess shrinks to a quarter), preserving sign.
pub fn soft_limit(audio: &mut [f32], threshold_db: f32, ratio: f32) {
    let threshold_linear = db_to_linear(f64::from(threshold_db)) as f32;
    let inverse_ratio = 1.0 / ratio;
    for sample in audio.iter_mut() {
        let magnitude = sample.abs();
        if magnitude > threshold_linear {
            let excess = magnitude - threshold_linear;
            let limited = threshold_linear + excess * inverse_ratio;
            *sample = limited.copysign(*sample);
        }
    }
}

/// Clamps every sample into `[-limit, limit]`, `limit` given in dBFS.
pub fn hard_limit(audio: &mut [f32], limit_db: f32) {
    let limit_linear = db_to_linear(f64::from(limit_db)) as f32;
    for sample in audio.iter_mut() {
        *sample = sample.clamp(-limit_linear, limit_linear);
    }
}
