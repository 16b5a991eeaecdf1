//! End-to-end safety pipeline tests.
//!
//! Render real graphs through trama-core and drive the full safety layer
//! over the results: protect, render, measure, correct.

use trama_core::{Connection, Filter, Graph, Oscillator, ParamValue, Stage};
use trama_safety::{chaos, gain, limiter, monitor, protection, validate};

fn sine_oscillator(frequency: f64, amplitude: f64) -> Box<dyn Stage> {
    let mut osc = Oscillator::new();
    osc.set_parameter("frequency", &ParamValue::Float(frequency))
        .unwrap();
    osc.set_parameter("amplitude", &ParamValue::Float(amplitude))
        .unwrap();
    Box::new(osc)
}

#[test]
fn protected_graph_renders_within_thresholds() {
    let mut graph = Graph::new();
    graph.add_stage("osc1", sine_oscillator(440.0, 1.0));

    // Unprotected, the full-scale oscillator fails the monitor.
    let hot = graph.render(4410, 44100.0);
    assert!(!monitor::monitor_safety(&hot));

    // Basic protection pulls the oscillator to -18 dB; the rendered
    // buffer then clears every fixed threshold.
    graph.reset();
    protection::apply_basic_protection(&mut graph);
    let staged = graph.render(4410, 44100.0);
    let metrics = monitor::safety_metrics(&staged);
    assert!(
        monitor::within_thresholds(&metrics),
        "metrics after staging: {metrics:?}"
    );
}

#[test]
fn emergency_pass_rescues_a_clipped_render() {
    let mut graph = Graph::new();
    // Two hot oscillators at the same frequency sum beyond full scale.
    graph.add_stage("osc1", sine_oscillator(440.0, 1.0));
    graph.add_stage("osc2", sine_oscillator(440.0, 1.0));
    let mut audio = graph.render(4410, 44100.0);
    assert!(validate::has_clipping(&audio));

    protection::apply_emergency_protection(&mut audio);
    assert!(!validate::has_clipping(&audio));
    let peak = limiter::true_peak(&audio);
    assert!(peak <= trama_core::db_to_linear(-1.0) as f32 + 1e-6);
}

#[test]
fn validation_findings_survive_the_render_boundary() {
    let mut graph = Graph::new();
    graph.add_stage("osc1", sine_oscillator(440.0, 0.5));
    graph.add_stage("filter1", Box::new(Filter::new()));
    graph.add_connection(Connection::new("osc1", "filter1"));
    graph.add_connection(Connection::new("filter1", "osc1"));

    // The cyclic graph is diagnosable but still renders.
    let graph_issues = validate::validate_graph(&graph);
    assert!(graph_issues.iter().any(|i| i.contains("cycle")));
    let audio = graph.render(1024, 44100.0);
    assert_eq!(audio.len(), 1024);
    assert!(audio.iter().all(|s| s.is_finite()));
}

#[test]
fn chaos_repair_keeps_the_graph_renderable() {
    let mut graph = Graph::new();
    graph.add_stage("osc1", sine_oscillator(440.0, 0.5));
    graph
        .set_parameter("osc1", "frequency", &ParamValue::Float(f64::NAN))
        .unwrap();

    assert!(!chaos::parameters_bounded(&graph));
    chaos::prevent_chaos(&mut graph);
    assert!(chaos::parameters_bounded(&graph));

    let audio = graph.render(1024, 44100.0);
    assert!(audio.iter().all(|s| s.is_finite()));
}

#[test]
fn gain_findings_and_staging_agree() {
    let mut graph = Graph::new();
    graph.add_stage("osc1", sine_oscillator(440.0, 0.02));
    let issues = gain::check_gain_staging(&graph);
    assert!(issues.iter().any(|i| i.contains("very low")));
    // Staging only pulls hot stages down; the quiet one is a finding, not
    // a mutation target.
    gain::auto_gain_stage(&mut graph);
    assert_eq!(
        graph.parameter("osc1", "amplitude").unwrap(),
        ParamValue::Float(0.02)
    );
}
