//! trama-preset - the JSON preset wire format and stage factory.
//!
//! A preset is a JSON object with a `stages` map and a `connections`
//! array:
//!
//! ```json
//! {
//!   "stages": {
//!     "osc1": {
//!       "type": "oscillator",
//!       "parameters": { "frequency": 440.0, "waveType": "sine" }
//!     },
//!     "filter1": { "type": "filter", "parameters": { "cutoff": 1200.0 } }
//!   },
//!   "connections": [
//!     { "source": "osc1", "destination": "filter1" }
//!   ]
//! }
//! ```
//!
//! Parsing is strict at the boundary: malformed JSON, an unknown stage
//! `type`, and any parameter that the target stage rejects (wrong type or
//! out of range) all fail *before* a [`Graph`] reaches the caller. This
//! crate works on strings only; where preset text lives is the embedding
//! application's concern.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use trama_core::{
    Connection, Envelope, Filter, Graph, Lfo, Oscillator, ParamValue, Stage, StageError, StageKind,
};

/// Errors from preset parsing and serialization.
#[derive(Debug, Error)]
pub enum PresetError {
    /// The document is not valid JSON or does not match the wire format.
    #[error("malformed preset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The `type` field names no known stage kind.
    #[error("unknown stage type: {0}")]
    UnknownStageType(String),

    /// A stage rejected one of its configured parameters.
    #[error("stage '{stage}': {source}")]
    Parameter {
        /// Name of the stage whose parameter was rejected.
        stage: String,
        /// The underlying configuration error.
        source: StageError,
    },
}

/// One stage entry in the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDoc {
    /// Stage kind name (`"oscillator"`, `"filter"`, `"envelope"`, `"lfo"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Parameter assignments applied after construction.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
}

/// The whole preset document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetDoc {
    /// Named stage definitions.
    #[serde(default)]
    pub stages: BTreeMap<String, StageDoc>,
    /// Connection list; wire defaults are `amount = 1.0`, `enabled = true`.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Constructs a stage of the named kind and applies the given parameters.
///
/// Unknown kinds are rejected here, before any graph sees the stage.
pub fn build_stage(
    kind: &str,
    parameters: &BTreeMap<String, ParamValue>,
) -> Result<Box<dyn Stage>, PresetError> {
    let kind = StageKind::from_name(kind)
        .ok_or_else(|| PresetError::UnknownStageType(kind.to_owned()))?;
    let mut stage: Box<dyn Stage> = match kind {
        StageKind::Oscillator => Box::new(Oscillator::new()),
        StageKind::Filter => Box::new(Filter::new()),
        StageKind::Envelope => Box::new(Envelope::new()),
        StageKind::Lfo => Box::new(Lfo::new()),
    };
    for (name, value) in parameters {
        stage
            .set_parameter(name, value)
            .map_err(|source| PresetError::Parameter {
                stage: kind.name().to_owned(),
                source,
            })?;
    }
    Ok(stage)
}

/// Parses a preset document into a ready-to-render [`Graph`].
///
/// Fails on malformed JSON, unknown stage types, and rejected parameters;
/// on failure no partially built graph escapes.
pub fn parse_preset(json: &str) -> Result<Graph, PresetError> {
    let doc: PresetDoc = serde_json::from_str(json)?;
    graph_from_doc(&doc)
}

/// Builds a [`Graph`] from an already-deserialized document.
pub fn graph_from_doc(doc: &PresetDoc) -> Result<Graph, PresetError> {
    let mut graph = Graph::new();
    for (name, stage_doc) in &doc.stages {
        let stage =
            build_stage(&stage_doc.kind, &stage_doc.parameters).map_err(|err| match err {
                PresetError::Parameter { source, .. } => PresetError::Parameter {
                    stage: name.clone(),
                    source,
                },
                other => other,
            })?;
        graph.add_stage(name.clone(), stage);
    }
    for connection in &doc.connections {
        graph.add_connection(connection.clone());
    }
    tracing::debug!(
        "preset: built graph with {} stages, {} connections",
        doc.stages.len(),
        doc.connections.len()
    );
    Ok(graph)
}

/// Captures a graph's stages and connections as a wire-format document.
pub fn doc_from_graph(graph: &Graph) -> PresetDoc {
    let mut stages = BTreeMap::new();
    for name in graph.stage_names() {
        let Some(stage) = graph.stage(&name) else {
            continue;
        };
        let mut parameters = BTreeMap::new();
        for param in stage.parameter_names() {
            if let Ok(value) = stage.parameter(param) {
                parameters.insert((*param).to_owned(), value);
            }
        }
        stages.insert(
            name,
            StageDoc {
                kind: stage.kind().name().to_owned(),
                parameters,
            },
        );
    }
    PresetDoc {
        stages,
        connections: graph.connections().to_vec(),
    }
}

/// Serializes a graph to pretty-printed preset JSON.
pub fn write_preset(graph: &Graph) -> Result<String, PresetError> {
    Ok(serde_json::to_string_pretty(&doc_from_graph(graph))?)
}
