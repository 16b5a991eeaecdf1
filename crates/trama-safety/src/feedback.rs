//! Feedback stability guarding.
//!
//! Loop gain is estimated with the same coarse proxy the graph itself
//! uses: the product of every oscillator's amplitude. Filter, envelope,
//! and LFO contributions are deliberately not modeled.

use trama_core::Graph;

/// Loop gains at or above this margin count as unstable.
pub const STABILITY_MARGIN: f64 = 0.99;

/// Estimated loop gain of the graph (linear).
pub fn loop_gain(graph: &Graph) -> f64 {
    graph.total_gain()
}

/// Whether a loop gain is inside the stability margin.
#[inline]
pub fn is_stable(gain: f64) -> bool {
    gain < STABILITY_MARGIN
}

/// Whether the graph's estimated loop gain is stable.
pub fn check_stability(graph: &Graph) -> bool {
    is_stable(loop_gain(graph))
}

/// Invokes `protect` when the graph's loop gain is unstable.
///
/// The closure is the extension point for inserting protective stages
/// (limiters, trims) into the graph; it runs only on instability. Returns
/// whether it was engaged.
pub fn apply_feedback_protection<F>(graph: &mut Graph, protect: F) -> bool
where
    F: FnOnce(&mut Graph),
{
    if check_stability(graph) {
        return false;
    }
    tracing::debug!(
        "feedback_protection: loop gain {:.3} >= {}, engaging protective action",
        loop_gain(graph),
        STABILITY_MARGIN
    );
    protect(graph);
    true
}
