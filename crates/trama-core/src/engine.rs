//! Single-mutex engine wrapper.
//!
//! [`Engine`] owns a [`Graph`] behind one mutex so that structural edits,
//! parameter access, and rendering never interleave. There is no
//! reader/writer distinction (every access is exclusive) and no internal
//! scheduler: a render runs to completion once started. Callers that need
//! a real-time deadline measure the wall-clock duration afterwards via
//! [`timed_render`](Engine::timed_render) and compare it to their budget.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::graph::{Connection, Graph, GraphError};
use crate::stage::Stage;
use crate::value::ParamValue;

struct EngineState {
    graph: Graph,
    sample_rate: f64,
}

/// Thread-safe owner of a stage graph.
///
/// All operations lock the same mutex, serializing graph edits against
/// rendering exactly as a host application needs.
pub struct Engine {
    state: Mutex<EngineState>,
}

impl Engine {
    /// Creates an engine with an empty graph at 44.1 kHz.
    pub fn new() -> Self {
        Self::with_sample_rate(crate::DEFAULT_SAMPLE_RATE)
    }

    /// Creates an engine with an empty graph at the given sample rate.
    pub fn with_sample_rate(sample_rate: f64) -> Self {
        Self {
            state: Mutex::new(EngineState {
                graph: Graph::new(),
                sample_rate,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // Lock poisoning carries no meaning for the graph; recover the guard.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Graph management ---

    /// Adds a stage, first aligning it to the engine's sample rate.
    pub fn add_stage(&self, name: impl Into<String>, mut stage: Box<dyn Stage>) {
        let mut state = self.lock();
        stage.set_sample_rate(state.sample_rate);
        state.graph.add_stage(name, stage);
    }

    /// Removes a stage and its connections. Returns whether it existed.
    pub fn remove_stage(&self, name: &str) -> bool {
        self.lock().graph.remove_stage(name)
    }

    /// Appends a connection.
    pub fn add_connection(&self, connection: Connection) {
        self.lock().graph.add_connection(connection);
    }

    /// Removes every connection with the given pairing.
    pub fn remove_connection(&self, source: &str, destination: &str) {
        self.lock().graph.remove_connection(source, destination);
    }

    // --- Parameter access ---

    /// Assigns a parameter on a named stage.
    pub fn set_parameter(
        &self,
        stage: &str,
        name: &str,
        value: &ParamValue,
    ) -> Result<(), GraphError> {
        self.lock().graph.set_parameter(stage, name, value)
    }

    /// Reads a parameter from a named stage.
    pub fn parameter(&self, stage: &str, name: &str) -> Result<ParamValue, GraphError> {
        self.lock().graph.parameter(stage, name)
    }

    // --- Rendering ---

    /// Processes an input buffer through the graph.
    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        self.lock().graph.process(input)
    }

    /// Renders from silence at the engine's sample rate.
    pub fn render(&self, num_samples: usize) -> Vec<f32> {
        let mut state = self.lock();
        let sample_rate = state.sample_rate;
        state.graph.render(num_samples, sample_rate)
    }

    /// Renders from silence and reports the wall-clock duration, for
    /// after-the-fact deadline checks.
    pub fn timed_render(&self, num_samples: usize) -> (Vec<f32>, Duration) {
        let start = Instant::now();
        let output = self.render(num_samples);
        (output, start.elapsed())
    }

    // --- Diagnostics ---

    /// Structural and configuration findings for the current graph.
    pub fn validate(&self) -> Vec<String> {
        self.lock().graph.validate()
    }

    /// Names of every owned stage.
    pub fn stage_names(&self) -> Vec<String> {
        self.lock().graph.stage_names()
    }

    /// A snapshot of the connection list.
    pub fn connections(&self) -> Vec<Connection> {
        self.lock().graph.connections().to_vec()
    }

    /// The oscillator-amplitude gain proxy of the current graph.
    pub fn total_gain(&self) -> f64 {
        self.lock().graph.total_gain()
    }

    // --- Audio settings ---

    /// Updates the sample rate and propagates it to every stage.
    pub fn set_sample_rate(&self, sample_rate: f64) {
        let mut state = self.lock();
        state.sample_rate = sample_rate;
        state.graph.set_sample_rate(sample_rate);
    }

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.lock().sample_rate
    }

    /// Clears the transient state of every stage.
    pub fn reset(&self) {
        self.lock().graph.reset();
    }

    /// Runs a closure with exclusive access to the owned graph.
    ///
    /// For callers (like the safety layer) whose passes take the whole
    /// graph; the mutex is held for the closure's full duration.
    pub fn with_graph<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        f(&mut self.lock().graph)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::Oscillator;

    #[test]
    fn render_produces_requested_length() {
        let engine = Engine::new();
        engine.add_stage("osc1", Box::new(Oscillator::new()));
        let output = engine.render(256);
        assert_eq!(output.len(), 256);
    }

    #[test]
    fn timed_render_reports_duration() {
        let engine = Engine::new();
        engine.add_stage("osc1", Box::new(Oscillator::new()));
        let (output, elapsed) = engine.timed_render(4096);
        assert_eq!(output.len(), 4096);
        assert!(elapsed > Duration::ZERO);
    }

    #[test]
    fn parameter_round_trip() {
        let engine = Engine::new();
        engine.add_stage("osc1", Box::new(Oscillator::new()));
        engine
            .set_parameter("osc1", "frequency", &ParamValue::Float(660.0))
            .unwrap();
        assert_eq!(
            engine.parameter("osc1", "frequency").unwrap(),
            ParamValue::Float(660.0)
        );
    }

    #[test]
    fn edits_and_renders_serialize_across_threads() {
        let engine = std::sync::Arc::new(Engine::new());
        engine.add_stage("osc1", Box::new(Oscillator::new()));

        let renderer = {
            let engine = engine.clone();
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let output = engine.render(512);
                    assert_eq!(output.len(), 512);
                }
            })
        };
        let editor = {
            let engine = engine.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    let freq = 220.0 + f64::from(i);
                    engine
                        .set_parameter("osc1", "frequency", &ParamValue::Float(freq))
                        .unwrap();
                }
            })
        };
        renderer.join().unwrap();
        editor.join().unwrap();
    }
}
