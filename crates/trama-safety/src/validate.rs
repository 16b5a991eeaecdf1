//! Validation findings for buffers and graphs.
//!
//! Read-only checks that report problems as human-readable findings, in
//! the same never-throw style as [`Graph::validate`](trama_core::Graph::validate).

use trama_core::{Graph, ParamValue, Stage};

use crate::dynamics;

/// Any sample at or beyond full scale counts as clipping.
pub fn has_clipping(audio: &[f32]) -> bool {
    audio.iter().any(|s| s.abs() >= 1.0)
}

/// Whether the buffer's mean exceeds the DC threshold (0.001 linear).
pub fn has_dc_offset(audio: &[f32]) -> bool {
    dynamics::dc_offset(audio).abs() > 0.001
}

/// Whether the buffer is effectively silent (RMS below 0.001).
pub fn is_near_silent(audio: &[f32]) -> bool {
    dynamics::rms(audio) < 0.001
}

/// Whether any sample is an IEEE subnormal.
///
/// Denormals stall hardware pipelines; their presence in a rendered buffer
/// usually means a decaying feedback path was left running.
pub fn has_denormals(audio: &[f32]) -> bool {
    audio.iter().any(|s| s.is_subnormal())
}

/// Buffer-level findings: clipping, DC offset, near-silence, denormals.
pub fn validate_audio(audio: &[f32]) -> Vec<String> {
    let mut issues = Vec::new();
    if has_clipping(audio) {
        issues.push("audio clipping detected".to_owned());
    }
    if has_dc_offset(audio) {
        issues.push("dc offset detected".to_owned());
    }
    if is_near_silent(audio) {
        issues.push("audio is silent or too quiet".to_owned());
    }
    if has_denormals(audio) {
        issues.push("denormal samples detected".to_owned());
    }
    issues
}

/// Graph-level findings: cycles, disconnection, and parameter violations.
pub fn validate_graph(graph: &Graph) -> Vec<String> {
    let mut issues = Vec::new();
    if graph.has_cycles() {
        issues.push("graph contains a connection cycle".to_owned());
    }
    if !graph.is_connected() {
        issues.push("graph has disconnected components".to_owned());
    }
    issues.extend(check_parameter_violations(graph));
    issues
}

/// Scans every parameter for non-finite values and read errors.
pub fn check_parameter_violations(graph: &Graph) -> Vec<String> {
    let mut violations = Vec::new();
    for name in graph.stage_names() {
        let Some(stage) = graph.stage(&name) else {
            continue;
        };
        for param in stage.parameter_names() {
            match stage.parameter(param) {
                Ok(ParamValue::Float(value)) if value.is_nan() || value.is_infinite() => {
                    violations.push(format!("stage '{name}' parameter '{param}' is invalid"));
                }
                Ok(_) => {}
                Err(err) => {
                    violations.push(format!("stage '{name}' parameter '{param}' error: {err}"));
                }
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use trama_core::{Connection, Oscillator};

    #[test]
    fn clean_buffer_has_no_findings() {
        let audio: Vec<f32> = (0..1000)
            .map(|n| 0.5 * (std::f32::consts::TAU * n as f32 / 100.0).sin())
            .collect();
        assert!(validate_audio(&audio).is_empty());
    }

    #[test]
    fn clipping_detected_at_full_scale() {
        assert!(has_clipping(&[0.5, 1.0, 0.2]));
        assert!(has_clipping(&[-1.3]));
        assert!(!has_clipping(&[0.99, -0.99]));
    }

    #[test]
    fn dc_offset_detected() {
        let shifted = vec![0.01_f32; 256];
        assert!(has_dc_offset(&shifted));
        let centered: Vec<f32> = (0..256).map(|n| if n % 2 == 0 { 0.5 } else { -0.5 }).collect();
        assert!(!has_dc_offset(&centered));
    }

    #[test]
    fn near_silence_detected() {
        assert!(is_near_silent(&vec![0.0005_f32; 128]));
        assert!(!is_near_silent(&vec![0.5_f32; 128]));
    }

    #[test]
    fn denormals_detected() {
        let subnormal = f32::MIN_POSITIVE / 2.0;
        assert!(subnormal.is_subnormal());
        assert!(has_denormals(&[0.0, subnormal, 0.5]));
        assert!(!has_denormals(&[0.0, 0.5, f32::MIN_POSITIVE]));
    }

    #[test]
    fn graph_findings_mirror_structure() {
        let mut graph = Graph::new();
        graph.add_stage("a", Box::new(Oscillator::new()));
        graph.add_stage("b", Box::new(Oscillator::new()));
        graph.add_connection(Connection::new("a", "b"));
        graph.add_connection(Connection::new("b", "a"));
        let issues = validate_graph(&graph);
        assert!(issues.iter().any(|i| i.contains("cycle")));
    }

    #[test]
    fn nan_parameter_is_a_violation() {
        let mut graph = Graph::new();
        graph.add_stage("osc1", Box::new(Oscillator::new()));
        graph
            .set_parameter("osc1", "amplitude", &ParamValue::Float(f64::NAN))
            .unwrap();
        let violations = check_parameter_violations(&graph);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("amplitude"));
    }
}
