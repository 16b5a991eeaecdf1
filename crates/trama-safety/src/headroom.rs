//! Headroom measurement and management.
//!
//! Headroom is the dB distance between a buffer's peak and full scale:
//! `20·log10(1/peak)`. Management comes in two forms: a proactive pass
//! that scales oscillator amplitudes before rendering, and a corrective
//! pass over an already-rendered buffer.

use trama_core::{Graph, ParamValue, Stage, StageKind, db_to_linear};

use crate::dynamics;

/// Default headroom target for the proactive graph pass, in dB.
pub const TARGET_HEADROOM_DB: f64 = 6.0;

/// Default minimum acceptable headroom, in dB.
pub const MIN_HEADROOM_DB: f32 = 3.0;

/// Headroom of a buffer in dB; silent buffers report 0.
pub fn headroom_db(audio: &[f32]) -> f32 {
    let peak = dynamics::peak(audio);
    if peak > 0.0 {
        20.0 * (1.0 / peak).log10()
    } else {
        0.0
    }
}

/// Proactively scales every oscillator's amplitude down by the gain that
/// corresponds to `target_db` of headroom.
pub fn manage_headroom(graph: &mut Graph, target_db: f64) {
    let scale = db_to_linear(-target_db);
    for name in graph.stage_names() {
        let Some(stage) = graph.stage_mut(&name) else {
            continue;
        };
        if stage.kind() != StageKind::Oscillator {
            continue;
        }
        let Ok(ParamValue::Float(amplitude)) = stage.parameter("amplitude") else {
            continue;
        };
        let scaled = amplitude * scale;
        if stage
            .set_parameter("amplitude", &ParamValue::Float(scaled))
            .is_ok()
        {
            tracing::debug!(
                "manage_headroom: '{}' amplitude {:.3} -> {:.3}",
                name,
                amplitude,
                scaled
            );
        }
    }
}

/// Scales a rendered buffer down when its headroom is below `target_db`.
///
/// Buffers already meeting the target pass unchanged; this pass never
/// boosts.
pub fn adjust_headroom(audio: &mut [f32], target_db: f32) {
    let current_db = headroom_db(audio);
    if current_db < target_db {
        let gain = db_to_linear(f64::from(current_db - target_db)) as f32;
        tracing::debug!(
            "adjust_headroom: {:.1} dB -> {:.1} dB (gain {:.4})",
            current_db,
            target_db,
            gain
        );
        for sample in audio.iter_mut() {
            *sample *= gain;
        }
    }
}

/// Whether the buffer's headroom meets `min_db`.
pub fn monitor_headroom(audio: &[f32], min_db: f32) -> bool {
    headroom_db(audio) >= min_db
}

#[cfg(test)]
mod tests {
    use super::*;
    use trama_core::Oscillator;

    #[test]
    fn headroom_of_half_scale_is_six_db() {
        let audio = vec![0.5_f32, -0.25, 0.1];
        assert!((headroom_db(&audio) - 6.02).abs() < 0.01);
        assert_eq!(headroom_db(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn adjust_headroom_creates_the_requested_margin() {
        let mut audio = vec![0.9_f32, -0.45, 0.2];
        adjust_headroom(&mut audio, 6.0);
        assert!((headroom_db(&audio) - 6.0).abs() < 0.01);
        // Relative levels survive the uniform scale.
        assert!((audio[1] / audio[0] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn adjust_headroom_never_boosts() {
        let mut audio = vec![0.1_f32, -0.05];
        let before = audio.clone();
        adjust_headroom(&mut audio, 6.0);
        assert_eq!(audio, before);
    }

    #[test]
    fn manage_headroom_scales_oscillators() {
        let mut graph = Graph::new();
        graph.add_stage("osc1", Box::new(Oscillator::new())); // amplitude 0.5
        manage_headroom(&mut graph, TARGET_HEADROOM_DB);
        let ParamValue::Float(amplitude) = graph.parameter("osc1", "amplitude").unwrap() else {
            panic!("amplitude should be a float");
        };
        assert!((amplitude - 0.5 * db_to_linear(-6.0)).abs() < 1e-9);
    }

    #[test]
    fn manage_headroom_ignores_other_kinds() {
        let mut graph = Graph::new();
        graph.add_stage("filter1", Box::new(trama_core::Filter::new()));
        manage_headroom(&mut graph, TARGET_HEADROOM_DB);
        assert_eq!(
            graph.parameter("filter1", "cutoff").unwrap(),
            ParamValue::Float(1000.0)
        );
    }

    #[test]
    fn monitor_thresholds() {
        let comfortable = vec![0.25_f32; 16]; // ~12 dB headroom
        let tight = vec![0.95_f32; 16]; // ~0.4 dB headroom
        assert!(monitor_headroom(&comfortable, MIN_HEADROOM_DB));
        assert!(!monitor_headroom(&tight, MIN_HEADROOM_DB));
    }
}
