//! Composite protection passes.
//!
//! Orchestration façade over the individual safety units. Three tiers:
//! *basic* (gain staging + feedback guard), *advanced* (chaos repair +
//! headroom management), and *emergency* (buffer-only last resort:
//! hard limit, then uniform peak limiting).

use trama_core::Graph;

use crate::{chaos, feedback, gain, headroom, limiter};

/// Basic protection: automatic gain staging plus the feedback guard.
///
/// The protective action passed to the feedback guard is deliberately a
/// no-op here; callers that want stages inserted on instability use
/// [`feedback::apply_feedback_protection`] directly with their own action.
pub fn apply_basic_protection(graph: &mut Graph) {
    gain::auto_gain_stage(graph);
    feedback::apply_feedback_protection(graph, |_| {});
}

/// Advanced protection: chaos repair plus proactive headroom management.
pub fn apply_advanced_protection(graph: &mut Graph) {
    chaos::prevent_chaos(graph);
    headroom::manage_headroom(graph, headroom::TARGET_HEADROOM_DB);
}

/// Both graph-level tiers in order.
pub fn apply_protection(graph: &mut Graph) {
    apply_basic_protection(graph);
    apply_advanced_protection(graph);
}

/// Emergency, buffer-only last resort: hard limit at -0.1 dBFS, then a
/// uniform true-peak limit at -1 dBFS.
pub fn apply_emergency_protection(audio: &mut [f32]) {
    limiter::hard_limit(audio, -0.1);
    limiter::limit_true_peak(audio, limiter::DEFAULT_LIMIT_DB);
}

/// Heuristic: whether the graph already carries protective stages, judged
/// by stage naming.
pub fn is_protected(graph: &Graph) -> bool {
    graph
        .stage_names()
        .iter()
        .any(|name| name.contains("limiter") || name.contains("protection"))
}
