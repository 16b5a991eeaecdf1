//! Demonstration of building, validating, and rendering a stage graph.
//!
//! Run with: cargo run --example graph_demo

use trama_core::{Connection, Envelope, Filter, Graph, Oscillator, ParamValue, Stage};

const SAMPLE_RATE: f64 = 44100.0;

fn main() {
    println!("trama Graph Demo");
    println!("================\n");

    // Build a three-stage voice: oscillator -> filter -> envelope.
    let mut graph = Graph::new();

    let osc = {
        let mut o = Oscillator::new();
        o.set_parameter("frequency", &ParamValue::Float(220.0))
            .unwrap();
        o.set_parameter("amplitude", &ParamValue::Float(0.4))
            .unwrap();
        o.set_parameter("waveType", &ParamValue::from("saw")).unwrap();
        o
    };
    let filter = {
        let mut f = Filter::new();
        f.set_parameter("cutoff", &ParamValue::Float(1800.0)).unwrap();
        f.set_parameter("resonance", &ParamValue::Float(0.6)).unwrap();
        f
    };
    let env = {
        let mut e = Envelope::new();
        e.set_parameter("attack", &ParamValue::Float(0.02)).unwrap();
        e.set_parameter("sustain", &ParamValue::Float(0.6)).unwrap();
        e
    };

    graph.add_stage("osc1", Box::new(osc));
    graph.add_stage("filter1", Box::new(filter));
    graph.add_stage("env1", Box::new(env));
    graph.add_connection(Connection::new("osc1", "filter1"));
    graph.add_connection(Connection::new("filter1", "env1"));

    println!("Stages:");
    for name in graph.stage_names() {
        println!("  {} - {}", name, graph.stage(&name).unwrap().describe());
    }
    println!("Execution order: {:?}", graph.topological_order());

    let issues = graph.validate();
    if issues.is_empty() {
        println!("Validation: clean\n");
    } else {
        println!("Validation findings:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!();
    }

    // Render one second from silence.
    let output = graph.render(SAMPLE_RATE as usize, SAMPLE_RATE);
    let rms = (output.iter().map(|s| s * s).sum::<f32>() / output.len() as f32).sqrt();
    let peak = output.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()));
    println!("Rendered {} samples", output.len());
    println!("Peak: {peak:.4}");
    println!("RMS:  {rms:.4}");

    println!("\nDemo complete!");
}
