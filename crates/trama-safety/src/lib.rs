//! trama-safety - layered defenses for graphs and rendered audio.
//!
//! A set of independent analyzers and mutators that keep arbitrary stage
//! configurations from producing unsafe or unstable audio. Each unit is a
//! stateless function family over a [`Graph`](trama_core::Graph) and/or a
//! rendered buffer; all mutated state lives on whatever is passed in.
//!
//! None of these functions fail: they either *report* (returning a list of
//! findings or a boolean) or *mutate* toward a safer state. Every call is
//! a single deterministic pass with no retry logic.
//!
//! # Units
//!
//! - [`dynamics`] - peak/RMS/crest measurement shared by the layer
//! - [`gain`] - per-stage gain estimation and automatic gain staging
//! - [`limiter`] - sample-peak limiting (uniform, soft-knee, hard clamp)
//! - [`feedback`] - loop-gain stability checks with an explicit
//!   protective-action hook
//! - [`chaos`] - NaN/∞ repair and extreme-parameter clamping
//! - [`headroom`] - headroom measurement and management
//! - [`validate`] - buffer and graph validation findings
//! - [`monitor`] - the full [`SafetyMetrics`] snapshot and thresholds
//! - [`protection`] - composite basic/advanced/emergency passes
//!
//! # Example
//!
//! ```rust
//! use trama_core::{Graph, Oscillator, ParamValue};
//! use trama_safety::{monitor, protection};
//!
//! let mut graph = Graph::new();
//! graph.add_stage("osc1", Box::new(Oscillator::new()));
//! graph
//!     .set_parameter("osc1", "amplitude", &ParamValue::Float(1.0))
//!     .unwrap();
//!
//! protection::apply_basic_protection(&mut graph);
//! let mut audio = graph.render(1024, 44100.0);
//! if !monitor::monitor_safety(&audio) {
//!     protection::apply_emergency_protection(&mut audio);
//! }
//! ```

pub mod chaos;
pub mod dynamics;
pub mod feedback;
pub mod gain;
pub mod headroom;
pub mod limiter;
pub mod monitor;
pub mod protection;
pub mod validate;

pub use monitor::SafetyMetrics;
