//! trama-core - stage contract, DSP stages, and graph execution engine.
//!
//! This crate is the signal-processing heart of trama: named, stateful
//! processing stages wired together by a [`Graph`] that executes them in
//! topological order over a single evolving buffer.
//!
//! # Core Abstractions
//!
//! ## Stages
//!
//! - [`Stage`] - object-safe trait for all processing units
//! - [`Oscillator`] - phase-accumulator synthesis, additively mixed onto
//!   the input
//! - [`Filter`] - second-order lowpass biquad (direct form I)
//! - [`Envelope`] - ADSR state machine gated by input magnitude
//! - [`Lfo`] - low-frequency modulator summed onto the input
//!
//! ## Parameters
//!
//! Every stage exposes a flat, named parameter set of tagged values
//! ([`ParamValue`]: float, text, or bool). Numeric parameters carry a
//! declared range ([`RangedParam`]) and reject out-of-range assignment
//! instead of clamping.
//!
//! ## Graph
//!
//! [`Graph`] owns its stages (name-keyed), holds a list of
//! [`Connection`]s, and provides structural diagnostics (cycle detection,
//! connectivity, topological order) alongside sequential execution.
//! Structural problems are findings from [`Graph::validate`], never
//! errors; processing degrades to pass-through on a degenerate topology.
//!
//! ## Engine
//!
//! [`Engine`] wraps a graph behind a single mutex so that structural
//! edits, parameter access, and rendering never interleave. There is no
//! internal scheduler: every call blocks until it completes.
//!
//! # Example
//!
//! ```rust
//! use trama_core::{Graph, Oscillator, ParamValue};
//!
//! let mut graph = Graph::new();
//! graph.add_stage("osc1", Box::new(Oscillator::new()));
//! graph
//!     .set_parameter("osc1", "frequency", &ParamValue::Float(220.0))
//!     .unwrap();
//!
//! let output = graph.render(512, 44100.0);
//! assert_eq!(output.len(), 512);
//! ```

pub mod engine;
pub mod envelope;
pub mod filter;
pub mod graph;
pub mod lfo;
pub mod math;
pub mod oscillator;
pub mod param;
pub mod stage;
pub mod value;

pub use engine::Engine;
pub use envelope::{Envelope, EnvState, GATE_THRESHOLD};
pub use filter::Filter;
pub use graph::{Connection, Graph, GraphError};
pub use lfo::Lfo;
pub use math::{db_to_linear, linear_to_db};
pub use oscillator::Oscillator;
pub use param::{RangedParam, StageError};
pub use stage::{Stage, StageKind, Waveform};
pub use value::ParamValue;

/// A single mono audio sample.
pub type Sample = f32;

/// An owned, single-channel buffer of samples.
pub type AudioBuffer = Vec<Sample>;

/// Nominal sample rate used when nothing else is configured.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;
