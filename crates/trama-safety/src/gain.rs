//! Gain staging across a graph's stages.
//!
//! Per-stage gain is currently modeled for oscillators only: the estimate
//! is `20·log10(amplitude)`, and other stage kinds report unity (0 dB).
//! Automatic staging pulls any stage that sits more than a tolerance above
//! the target back down to the target level.

use trama_core::{Graph, ParamValue, Stage, StageKind, db_to_linear, linear_to_db};

/// Default staging target in dB.
pub const TARGET_GAIN_DB: f64 = -18.0;

/// Slack above the target before staging intervenes, in dB.
pub const GAIN_TOLERANCE_DB: f64 = 3.0;

/// Estimated gain of a single stage in dB.
///
/// Oscillators contribute `20·log10(amplitude)`; every other kind is
/// treated as unity gain.
pub fn stage_gain_db(stage: &dyn Stage) -> f64 {
    if stage.kind() == StageKind::Oscillator
        && let Ok(ParamValue::Float(amplitude)) = stage.parameter("amplitude")
    {
        return linear_to_db(amplitude);
    }
    0.0
}

/// Pulls every stage whose estimated gain exceeds `target_db` by more than
/// [`GAIN_TOLERANCE_DB`] down to the target.
pub fn stage_gain(graph: &mut Graph, target_db: f64) {
    for name in graph.stage_names() {
        let Some(stage) = graph.stage_mut(&name) else {
            continue;
        };
        let current_db = stage_gain_db(stage);
        if current_db > target_db + GAIN_TOLERANCE_DB && stage.kind() == StageKind::Oscillator {
            let target_amplitude = db_to_linear(target_db);
            if stage
                .set_parameter("amplitude", &ParamValue::Float(target_amplitude))
                .is_ok()
            {
                tracing::debug!(
                    "gain_stage: '{}' {:.1} dB -> {:.1} dB",
                    name,
                    current_db,
                    target_db
                );
            }
        }
    }
}

/// Stages every oscillator toward the default [`TARGET_GAIN_DB`].
pub fn auto_gain_stage(graph: &mut Graph) {
    stage_gain(graph, TARGET_GAIN_DB);
}

/// Reports stages with positive gain or gain below -30 dB.
pub fn check_gain_staging(graph: &Graph) -> Vec<String> {
    let mut issues = Vec::new();
    for name in graph.stage_names() {
        let Some(stage) = graph.stage(&name) else {
            continue;
        };
        let gain_db = stage_gain_db(stage);
        if gain_db > 0.0 {
            issues.push(format!("stage '{name}' has positive gain: {gain_db:.1} dB"));
        }
        if gain_db < -30.0 {
            issues.push(format!("stage '{name}' has very low gain: {gain_db:.1} dB"));
        }
    }
    issues
}
