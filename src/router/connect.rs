//! Connect requests: route resolution, conflict detection and activation.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use indexmap::{IndexMap, IndexSet};

use super::{Generation, Router, SignalMap};
use crate::device::{Capability, Device};
use crate::graph::{Edge, NodeId, SignalGraph};
use crate::{ConnectOptions, DeviceError, RouterError, RouterEvent};

/// `source => { sink => edges }` for every accepted route.
type EdgeMap = IndexMap<NodeId, IndexMap<NodeId, Vec<Edge>>>;

/// Result of a [`Router::connect`] call that achieved something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
    /// Routes actually realised, keyed by every requested source in request
    /// order. A source whose sinks were all dropped maps to an empty list.
    pub applied: SignalMap,
    /// `true` if every edge was activated (or already in place).
    pub complete: bool,
    /// Edges that could not be activated or whose device call failed.
    pub failed: Vec<Edge>,
}

impl Router {
    /// Routes a set of signals to their destinations.
    ///
    /// Each `source => sinks` entry is resolved to the shortest path per
    /// sink. When two sources need the same node, the one declared first in
    /// `signal_map` keeps it. Every edge the accepted routes need is then
    /// activated, all device calls running concurrently.
    ///
    /// With [`ConnectOptions::atomic`] any unresolvable route, conflict or
    /// unroutable edge fails the call before a single device is touched.
    /// Otherwise those routes are logged and dropped. With
    /// [`ConnectOptions::force`] devices are switched even when they already
    /// report the requested input.
    ///
    /// # Errors
    ///
    /// - [`RouterError::NoRoute`] / [`RouterError::Conflict`] /
    ///   [`RouterError::Unroutable`] under atomic mode
    /// - the first [`RouterError::NoRoute`] / [`RouterError::Conflict`] when
    ///   every requested route was dropped
    /// - [`RouterError::NothingActivated`] when edges needed activation and
    ///   none succeeded
    pub async fn connect(
        &self,
        signal_map: &SignalMap,
        options: ConnectOptions,
    ) -> Result<ConnectOutcome, RouterError> {
        let generation = self.current();

        let (edge_map, first_dropped) =
            self.build_edge_map(&generation, signal_map, options.atomic)?;

        let accepted: usize = edge_map.values().map(IndexMap::len).sum();
        if let Some(err) = first_dropped.filter(|_| accepted == 0) {
            return Err(err);
        }

        let edges: IndexSet<Edge> = edge_map
            .values()
            .flat_map(|routes| routes.values().flatten().cloned())
            .collect();

        let (success, failed) = self.activate_all(&generation.graph, edges, options).await?;

        if failed.is_empty() {
            tracing::debug!("signal map activated");
            return Ok(ConnectOutcome {
                applied: applied_map(&edge_map, |_| true),
                complete: true,
                failed,
            });
        }

        if success.is_empty() {
            return Err(RouterError::NothingActivated {
                failed: failed.len(),
            });
        }

        tracing::warn!("signal map partially activated");
        let applied = applied_map(&edge_map, |edges| {
            edges.iter().all(|edge| success.contains(edge))
        });
        Ok(ConnectOutcome {
            applied,
            complete: false,
            failed,
        })
    }

    /// Resolves every requested route, dropping (or under `atomic`
    /// rejecting) the ones that cannot be resolved or that conflict with
    /// routes accepted for earlier sources.
    ///
    /// Also returns the error of the first dropped route, if any.
    fn build_edge_map(
        &self,
        generation: &Generation,
        signal_map: &SignalMap,
        atomic: bool,
    ) -> Result<(EdgeMap, Option<RouterError>), RouterError> {
        let mut nodes_in_use: HashSet<NodeId> = HashSet::new();
        let mut edge_map = EdgeMap::new();
        let mut first_dropped = None;

        for (source, sinks) in signal_map.iter() {
            let mut source_nodes: HashSet<NodeId> = HashSet::new();
            edge_map.insert(source.clone(), IndexMap::new());

            for sink in sinks {
                let resolved = generation.route(source, sink).and_then(|route| {
                    if route.nodes.iter().any(|node| nodes_in_use.contains(node)) {
                        return Err(RouterError::Conflict {
                            from: source.to_string(),
                            to: sink.to_string(),
                            claimed: applied_map(&edge_map, |_| true).to_string(),
                        });
                    }
                    Ok(route)
                });

                match resolved {
                    Ok(route) => {
                        source_nodes.extend(route.nodes);
                        if let Some(routes) = edge_map.get_mut(source) {
                            routes.insert(sink.clone(), route.edges);
                        }
                    }
                    Err(err) if atomic => return Err(err),
                    Err(err) => {
                        tracing::error!("{err}");
                        self.emit_event(RouterEvent::RouteDropped {
                            source: source.clone(),
                            sink: sink.clone(),
                            reason: err.to_string(),
                        });
                        first_dropped.get_or_insert(err);
                    }
                }
            }

            nodes_in_use.extend(source_nodes);
        }

        Ok((edge_map, first_dropped))
    }

    /// Activates `edges`, partitioning them into succeeded and failed.
    ///
    /// Edges that are already satisfied count as succeeded without a device
    /// call. Edges that cannot be attempted fail without one.
    async fn activate_all(
        &self,
        graph: &SignalGraph,
        edges: IndexSet<Edge>,
        options: ConnectOptions,
    ) -> Result<(HashSet<Edge>, Vec<Edge>), RouterError> {
        let mut success = HashSet::new();
        let mut unroutable = Vec::new();
        let mut pending: Vec<(Edge, Arc<dyn Device>)> = Vec::new();

        for edge in edges {
            let device = self.devices.get(&edge.device);
            if !self.needs_activation(graph, &edge, device.as_deref(), options.force) {
                success.insert(edge);
                continue;
            }
            match device {
                Some(device) if self.can_activate(&edge, device.as_ref()) => {
                    pending.push((edge, device));
                }
                Some(_) => unroutable.push(edge),
                None => {
                    self.unroutable(&edge, "does not exist");
                    unroutable.push(edge);
                }
            }
        }

        if options.atomic && !unroutable.is_empty() {
            return Err(RouterError::Unroutable {
                edges: unroutable.iter().map(ToString::to_string).collect(),
            });
        }

        let results = join_all(
            pending
                .iter()
                .map(|(edge, device)| activate(edge, device.as_ref())),
        )
        .await;

        let mut failed = unroutable;
        for ((edge, _), result) in pending.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    tracing::debug!("switched {edge}");
                    success.insert(edge);
                }
                Err(err) => {
                    tracing::warn!("failed to switch {edge}: {err}");
                    self.emit_event(RouterEvent::EdgeFailed {
                        edge: edge.clone(),
                        error: err.to_string(),
                    });
                    failed.push(edge);
                }
            }
        }

        Ok((success, failed))
    }

    /// Whether `edge` needs a device call, or can be treated as satisfied.
    fn needs_activation(
        &self,
        graph: &SignalGraph,
        edge: &Edge,
        device: Option<&dyn Device>,
        force: bool,
    ) -> bool {
        let single_source = graph.outdegree(&edge.source) == 1;

        let reason = match device {
            None if single_source => "does not exist, but appears to be an alias",
            Some(device)
                if edge.is_nx1() && !force && device.input().as_ref() == Some(&edge.input) =>
            {
                "already on correct input"
            }
            Some(device)
                if edge.is_nx1() && !device.supports(Capability::SwitchTo) && single_source =>
            {
                "has an incompatible api, but only a single input defined"
            }
            _ => return true,
        };

        tracing::info!("module for {} {reason} - skipping {edge}", edge.device);
        self.emit_event(RouterEvent::EdgeSkipped {
            edge: edge.clone(),
            reason: reason.to_string(),
        });
        false
    }

    /// Whether a call to `device` can be attempted for `edge`.
    fn can_activate(&self, edge: &Edge, device: &dyn Device) -> bool {
        let reason = if !device.is_connected() {
            "offline"
        } else if edge.is_nx1() && !device.supports(Capability::SwitchTo) {
            "has an incompatible api (missing switch_to)"
        } else if edge.is_nxn() && !device.supports(Capability::Switch) {
            "has an incompatible api (missing switch)"
        } else {
            return true;
        };

        self.unroutable(edge, reason);
        false
    }

    fn unroutable(&self, edge: &Edge, reason: &str) {
        tracing::warn!("mod {} {reason} - can not switch {edge}", edge.device);
        self.emit_event(RouterEvent::EdgeUnroutable {
            edge: edge.clone(),
            reason: reason.to_string(),
        });
    }
}

async fn activate(edge: &Edge, device: &dyn Device) -> Result<(), DeviceError> {
    match &edge.output {
        None => device.switch_to(&edge.input).await,
        Some(output) => device.switch(&edge.input, output).await,
    }
}

/// Sinks per source whose edges all satisfy `realised`.
fn applied_map(edge_map: &EdgeMap, realised: impl Fn(&[Edge]) -> bool) -> SignalMap {
    let mut applied = SignalMap::new();
    for (source, routes) in edge_map {
        applied.insert_source(source.clone());
        for (sink, edges) in routes {
            if realised(edges) {
                applied.push(source.clone(), sink.clone());
            }
        }
    }
    applied
}
