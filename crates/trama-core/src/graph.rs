//! Stage graph - ownership, topology diagnostics, and execution.
//!
//! A [`Graph`] owns a named collection of stages and a list of
//! [`Connection`]s. Connections drive *ordering*, not mixing: processing
//! feeds one evolving buffer sequentially through every stage in
//! topological order, regardless of the declared fan-in/fan-out shape.
//! That linear-chain contract is deliberate; see [`Graph::process`].
//!
//! Structural problems (cycles, disconnected components, runaway gain) are
//! never errors: they are findings reported by [`Graph::validate`], and
//! processing degrades to pass-through on a degenerate topology. The only
//! hard errors at this level are parameter configuration mistakes, which
//! surface synchronously from the parameter accessors.

use std::collections::{BTreeMap, HashSet, VecDeque};

use thiserror::Error;

use crate::param::StageError;
use crate::stage::{Stage, StageKind};
use crate::value::ParamValue;

use serde::{Deserialize, Serialize};

/// Errors from name-addressed graph operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// The graph owns no stage with this name.
    #[error("no stage named '{0}'")]
    UnknownStage(String),

    /// A stage-level configuration error.
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// A directed edge between two named stages.
///
/// Connections are used to derive execution order. The modulation fields
/// (`parameter`, `amount`) describe intent for modulation-style edges and
/// travel with the preset wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Name of the source stage.
    pub source: String,
    /// Name of the destination stage.
    pub destination: String,
    /// Target parameter for modulation-style edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Scalar modulation amount.
    #[serde(default = "default_amount")]
    pub amount: f64,
    /// Whether the edge is active.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_amount() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

impl Connection {
    /// Creates an enabled audio connection with unit amount.
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            parameter: None,
            amount: 1.0,
            enabled: true,
        }
    }
}

/// Owns a set of named stages and the connections between them.
///
/// Stage names are unique: adding a stage under an existing name replaces
/// the previous owner. Acyclicity is diagnosable, not enforced: a graph
/// can hold (and even process) a cycle, and [`validate`](Self::validate)
/// will report it.
#[derive(Default)]
pub struct Graph {
    stages: BTreeMap<String, Box<dyn Stage>>,
    connections: Vec<Connection>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Structural mutation ---

    /// Takes ownership of a stage under the given name.
    ///
    /// An existing stage with the same name is dropped and replaced.
    pub fn add_stage(&mut self, name: impl Into<String>, stage: Box<dyn Stage>) {
        let name = name.into();
        tracing::debug!("graph_add: stage '{}' ({})", name, stage.kind().name());
        self.stages.insert(name, stage);
    }

    /// Removes a stage and every connection that references it.
    ///
    /// Returns `false` when no stage had that name. Pruning the touching
    /// connections keeps the edge list free of dangling references.
    pub fn remove_stage(&mut self, name: &str) -> bool {
        let removed = self.stages.remove(name).is_some();
        if removed {
            tracing::debug!("graph_remove: stage '{}'", name);
            self.connections
                .retain(|conn| conn.source != name && conn.destination != name);
        }
        removed
    }

    /// Appends a connection.
    ///
    /// No uniqueness constraint is enforced beyond the pairing itself, and
    /// endpoints are not required to name existing stages.
    pub fn add_connection(&mut self, connection: Connection) {
        tracing::debug!(
            "graph_connect: '{}' -> '{}'",
            connection.source,
            connection.destination
        );
        self.connections.push(connection);
    }

    /// Removes every connection with the given source/destination pairing.
    pub fn remove_connection(&mut self, source: &str, destination: &str) {
        tracing::debug!("graph_disconnect: '{}' -> '{}'", source, destination);
        self.connections
            .retain(|conn| !(conn.source == source && conn.destination == destination));
    }

    // --- Accessors ---

    /// Borrows a stage by name.
    pub fn stage(&self, name: &str) -> Option<&dyn Stage> {
        self.stages.get(name).map(|stage| &**stage)
    }

    /// Mutably borrows a stage by name.
    pub fn stage_mut(&mut self, name: &str) -> Option<&mut (dyn Stage + 'static)> {
        self.stages.get_mut(name).map(|stage| &mut **stage)
    }

    /// Names of every owned stage, in stable (sorted) order.
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.keys().cloned().collect()
    }

    /// The current connection list.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of owned stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the graph owns no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Assigns a parameter on a named stage.
    pub fn set_parameter(
        &mut self,
        stage: &str,
        name: &str,
        value: &ParamValue,
    ) -> Result<(), GraphError> {
        let target = self
            .stages
            .get_mut(stage)
            .ok_or_else(|| GraphError::UnknownStage(stage.to_owned()))?;
        target.set_parameter(name, value)?;
        Ok(())
    }

    /// Reads a parameter from a named stage.
    pub fn parameter(&self, stage: &str, name: &str) -> Result<ParamValue, GraphError> {
        let target = self
            .stages
            .get(stage)
            .ok_or_else(|| GraphError::UnknownStage(stage.to_owned()))?;
        Ok(target.parameter(name)?)
    }

    // --- Topology diagnostics ---

    /// Whether the connection set contains a directed cycle.
    ///
    /// Depth-first search with a recursion stack, started from every stage.
    pub fn has_cycles(&self) -> bool {
        let mut visited = HashSet::new();
        let mut stack = HashSet::new();
        for name in self.stages.keys() {
            if !visited.contains(name.as_str()) && self.cycle_from(name, &mut visited, &mut stack) {
                return true;
            }
        }
        false
    }

    fn cycle_from(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        stack: &mut HashSet<String>,
    ) -> bool {
        visited.insert(node.to_owned());
        stack.insert(node.to_owned());
        for conn in &self.connections {
            if conn.source == node {
                if !visited.contains(conn.destination.as_str()) {
                    if self.cycle_from(&conn.destination, visited, stack) {
                        return true;
                    }
                } else if stack.contains(conn.destination.as_str()) {
                    return true;
                }
            }
        }
        stack.remove(node);
        false
    }

    /// Whether every stage is reachable from every other, treating
    /// connections as undirected edges. Purely diagnostic.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.stages.keys().next() else {
            return true;
        };
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start.clone());
        queue.push_back(start.clone());
        while let Some(current) = queue.pop_front() {
            for conn in &self.connections {
                if conn.source == current && !visited.contains(conn.destination.as_str()) {
                    visited.insert(conn.destination.clone());
                    queue.push_back(conn.destination.clone());
                }
                if conn.destination == current && !visited.contains(conn.source.as_str()) {
                    visited.insert(conn.source.clone());
                    queue.push_back(conn.source.clone());
                }
            }
        }
        visited.len() == self.stages.len()
    }

    /// Execution order: reversed depth-first post-order over the
    /// connections, covering every stage even those with no edges.
    ///
    /// Undefined (but still total) in the presence of cycles.
    pub fn topological_order(&self) -> Vec<String> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        for name in self.stages.keys() {
            if !visited.contains(name.as_str()) {
                self.post_order(name, &mut visited, &mut result);
            }
        }
        result.reverse();
        result
    }

    fn post_order(&self, node: &str, visited: &mut HashSet<String>, result: &mut Vec<String>) {
        visited.insert(node.to_owned());
        for conn in &self.connections {
            if conn.source == node && !visited.contains(conn.destination.as_str()) {
                self.post_order(&conn.destination, visited, result);
            }
        }
        result.push(node.to_owned());
    }

    /// Coarse stability proxy: the product of every oscillator's amplitude.
    ///
    /// Other stage kinds do not contribute. Consumed by the safety layer
    /// and by [`validate`](Self::validate).
    pub fn total_gain(&self) -> f64 {
        let mut total = 1.0;
        for stage in self.stages.values() {
            if stage.kind() == StageKind::Oscillator
                && let Ok(ParamValue::Float(amplitude)) = stage.parameter("amplitude")
            {
                total *= amplitude;
            }
        }
        total
    }

    /// Reports structural and configuration issues as human-readable
    /// findings. Never fails; an empty list means a clean bill of health.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.has_cycles() {
            issues.push("graph contains a connection cycle".to_owned());
        }
        if !self.is_connected() {
            issues.push("graph has disconnected components".to_owned());
        }
        let total = self.total_gain();
        if total >= 1.0 {
            issues.push(format!(
                "total gain {total:.3} >= 1.0, risk of feedback runaway"
            ));
        }
        for (name, stage) in &self.stages {
            for param in stage.parameter_names() {
                if let Err(err) = stage.parameter(param) {
                    issues.push(format!("stage '{name}' parameter '{param}': {err}"));
                }
            }
        }
        issues
    }

    // --- Execution ---

    /// Renders one block by feeding the input through every stage.
    ///
    /// The same evolving buffer passes sequentially through all stages in
    /// topological order: a single linear chain, irrespective of the
    /// declared fan-in/fan-out shape of the connection set. True fan-in
    /// mixing is intentionally not performed; callers relying on the
    /// ordering contract should keep their connection sets tree-shaped.
    ///
    /// With no stages (or an empty order) the input passes through
    /// unchanged.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        if self.stages.is_empty() {
            return input.to_vec();
        }
        let order = self.topological_order();
        if order.is_empty() {
            return input.to_vec();
        }
        let mut current = input.to_vec();
        let mut scratch = vec![0.0_f32; input.len()];
        for name in &order {
            // Connections may name stages that were never added; they
            // occupy a slot in the order but do not process.
            if let Some(stage) = self.stages.get_mut(name) {
                stage.process_block(&current, &mut scratch);
                std::mem::swap(&mut current, &mut scratch);
            }
        }
        current
    }

    /// Renders `num_samples` of output from a silent input at the given
    /// sample rate.
    pub fn render(&mut self, num_samples: usize, sample_rate: f64) -> Vec<f32> {
        self.set_sample_rate(sample_rate);
        self.process(&vec![0.0_f32; num_samples])
    }

    /// Propagates a sample-rate change to every stage.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        for stage in self.stages.values_mut() {
            stage.set_sample_rate(sample_rate);
        }
    }

    /// Clears the transient state of every stage, preserving parameters.
    pub fn reset(&mut self) {
        for stage in self.stages.values_mut() {
            stage.reset();
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("stages", &self.stage_names())
            .field("connections", &self.connections)
            .finish()
    }
}
