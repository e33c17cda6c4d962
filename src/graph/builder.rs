//! Construction of a [`SignalGraph`] from declarative connectivity.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;

use super::{Edge, NodeId, Selector, SignalGraph};
use crate::config::Connections;
use crate::RouterError;

/// Separates a real module id from the node name it is exposed as.
const ALIAS_SEPARATOR: &str = " as ";

/// Separates a matrix device from one of its outputs in a source id.
const OUTPUT_SEPARATOR: &str = "__";

/// Inputs of one device, keyed by input selector.
type Inputs = IndexMap<Selector, NodeId>;

impl SignalGraph {
    /// Builds a graph from a nested map of input connectivity.
    ///
    /// The map has the structure `{ device: { input: source } }` or
    /// `{ device: [source, ...] }`; list entries are numbered from 1.
    ///
    /// Sources fed by a matrix switcher are written `"device__output"`. For
    /// example, two displays and two laptops behind a 2x2 matrix:
    ///
    /// ```
    /// use signal_router::{Connections, SignalGraph};
    ///
    /// let connections: Connections = serde_json::from_str(r#"{
    ///     "Display_1": { "hdmi": "Switcher_1__1" },
    ///     "Display_2": { "hdmi": "Switcher_1__2" },
    ///     "Switcher_1": ["Laptop_1", "Laptop_2"]
    /// }"#)?;
    ///
    /// let graph = SignalGraph::from_map(&connections)?;
    /// assert!(graph.contains("Switcher_1__1"));
    /// assert!(!graph.contains("Switcher_1"));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// Device keys name the module that controls the device. A key written
    /// `"module as node"` exposes the module under another node name, which
    /// can be used for readability (`"Display_1 as Left_LCD"`) or to split a
    /// large matrix into several virtual switchers that each see only a
    /// subset of its inputs.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Config`] if a device's inputs are neither a
    /// list nor a map, if a source id is not a string or number, or if a
    /// matrix output refers to a device with no connections of its own.
    pub fn from_map(connections: &Connections) -> Result<Self, RouterError> {
        let mut graph = SignalGraph::new();
        let mut matrix_nodes: Vec<NodeId> = Vec::new();

        let (connections, modules) = normalise(connections)?;

        for (device, inputs) in &connections {
            graph.insert(device.clone());

            for (input, source) in inputs {
                graph.insert(source.clone());
                graph.join(Edge {
                    source: device.clone(),
                    target: source.clone(),
                    device: module_for(&modules, device),
                    input: input.clone(),
                    output: None,
                })?;

                let Some((upstream, output)) = source.split_once(OUTPUT_SEPARATOR) else {
                    continue;
                };
                if output.is_empty() {
                    continue;
                }

                let upstream = NodeId::new(upstream);
                let output = Selector::parse(output);
                let matrix_inputs = connections.get(&upstream).ok_or_else(|| {
                    let reason = format!("output '{source}' is used by {device}");
                    RouterError::Config {
                        device: upstream.to_string(),
                        reason: format!("{reason} but the device has no connections"),
                    }
                })?;

                for (matrix_input, upstream_source) in matrix_inputs {
                    graph.insert(upstream_source.clone());
                    graph.join(Edge {
                        source: source.clone(),
                        target: upstream_source.clone(),
                        device: module_for(&modules, &upstream),
                        input: matrix_input.clone(),
                        output: Some(output.clone()),
                    })?;
                }

                if !matrix_nodes.contains(&upstream) {
                    matrix_nodes.push(upstream);
                }
            }
        }

        // The bare matrix ids are only ever edge sources, never targets.
        for id in &matrix_nodes {
            graph.delete(id, false)?;
        }

        tracing::debug!(
            nodes = graph.len(),
            matrices = matrix_nodes.len(),
            "built signal graph"
        );

        Ok(graph)
    }
}

/// Normalises raw connections into `{ node: { input: source } }` and
/// extracts the `{ node: module }` alias table.
fn normalise(
    connections: &Connections,
) -> Result<(IndexMap<NodeId, Inputs>, HashMap<NodeId, NodeId>), RouterError> {
    let mut normalised = IndexMap::with_capacity(connections.len());
    let mut modules = HashMap::with_capacity(connections.len());

    for (key, inputs) in connections.iter() {
        let (module, node) = match key.split_once(ALIAS_SEPARATOR) {
            Some((module, node)) => (NodeId::new(module), NodeId::new(node)),
            None => (NodeId::new(key), NodeId::new(key)),
        };

        let inputs = normalise_inputs(key, inputs)?;
        modules.insert(node.clone(), module);
        normalised.insert(node, inputs);
    }

    Ok((normalised, modules))
}

fn normalise_inputs(device: &str, inputs: &Value) -> Result<Inputs, RouterError> {
    match inputs {
        Value::Array(sources) => (1u32..)
            .zip(sources)
            .map(|(index, source)| {
                source_id(device, source).map(|id| (Selector::Index(index), id))
            })
            .collect(),
        Value::Object(sources) => sources
            .iter()
            .map(|(input, source)| {
                source_id(device, source).map(|id| (Selector::parse(input), id))
            })
            .collect(),
        other => Err(RouterError::Config {
            device: device.to_string(),
            reason: format!("inputs must be a map or a list, got {other}"),
        }),
    }
}

fn source_id(device: &str, source: &Value) -> Result<NodeId, RouterError> {
    match source {
        Value::String(id) => Ok(NodeId::new(id)),
        Value::Number(id) => Ok(NodeId::new(id.to_string())),
        other => Err(RouterError::Config {
            device: device.to_string(),
            reason: format!("source must be a string, got {other}"),
        }),
    }
}

fn module_for(modules: &HashMap<NodeId, NodeId>, node: &NodeId) -> NodeId {
    modules.get(node).cloned().unwrap_or_else(|| node.clone())
}
