//! Numeric-hazard repair across stage parameters.
//!
//! NaN assignments slip past ordered range checks, and legally assigned
//! values can still be extreme enough to destabilize downstream math.
//! This pass scans every numeric parameter on every stage, replacing
//! NaN/∞ with zero and clamping magnitudes over [`PARAM_MAGNITUDE_LIMIT`].
//! Repair values are folded into the parameter's declared range first so a
//! repair can never itself be rejected.

use trama_core::{Graph, ParamValue, Stage};

use crate::dynamics;

/// Magnitude above which a parameter value counts as runaway.
pub const PARAM_MAGNITUDE_LIMIT: f64 = 1000.0;

/// Sample variance above which a buffer is flagged as chaotic.
pub const CHAOS_VARIANCE_LIMIT: f32 = 1.0;

/// Repairs every offending numeric parameter in the graph.
///
/// NaN and ±∞ become 0.0; values with magnitude over
/// [`PARAM_MAGNITUDE_LIMIT`] are clamped to ±1000. Both repairs are then
/// clamped into the parameter's declared range before assignment.
pub fn prevent_chaos(graph: &mut Graph) {
    for name in graph.stage_names() {
        let Some(stage) = graph.stage_mut(&name) else {
            continue;
        };
        for param in stage.parameter_names() {
            let Ok(ParamValue::Float(value)) = stage.parameter(param) else {
                continue;
            };
            let repaired = if value.is_nan() || value.is_infinite() {
                0.0
            } else if value.abs() > PARAM_MAGNITUDE_LIMIT {
                value.clamp(-PARAM_MAGNITUDE_LIMIT, PARAM_MAGNITUDE_LIMIT)
            } else {
                continue;
            };
            let assignable = match stage.parameter_range(param) {
                Some((min, max)) => repaired.clamp(min, max),
                None => repaired,
            };
            if stage
                .set_parameter(param, &ParamValue::Float(assignable))
                .is_ok()
            {
                tracing::debug!(
                    "chaos_repair: '{}'.{} {} -> {}",
                    name,
                    param,
                    value,
                    assignable
                );
            }
        }
    }
}

/// Reports offending stage/parameter pairs without mutating anything.
pub fn check_chaos_indicators(graph: &Graph) -> Vec<String> {
    let mut indicators = Vec::new();
    for name in graph.stage_names() {
        let Some(stage) = graph.stage(&name) else {
            continue;
        };
        for param in stage.parameter_names() {
            let Ok(ParamValue::Float(value)) = stage.parameter(param) else {
                continue;
            };
            if value.is_nan() || value.is_infinite() {
                indicators.push(format!("stage '{name}' parameter '{param}' is NaN/Inf"));
            } else if value.abs() > PARAM_MAGNITUDE_LIMIT {
                indicators.push(format!(
                    "stage '{name}' parameter '{param}' has extreme value: {value}"
                ));
            }
        }
    }
    indicators
}

/// Whether every numeric parameter in the graph is finite and within the
/// magnitude limit.
pub fn parameters_bounded(graph: &Graph) -> bool {
    check_chaos_indicators(graph).is_empty()
}

/// Heuristic chaos flag for a rendered buffer: sample variance above
/// [`CHAOS_VARIANCE_LIMIT`]. Not a true Lyapunov-style measure.
pub fn detect_chaos(audio: &[f32]) -> bool {
    if audio.is_empty() {
        return false;
    }
    let mean = dynamics::dc_offset(audio);
    let variance =
        audio.iter().map(|&s| (s - mean) * (s - mean)).sum::<f32>() / audio.len() as f32;
    variance > CHAOS_VARIANCE_LIMIT
}
