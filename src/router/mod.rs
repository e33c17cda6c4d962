//! Signal router: owns the current graph and turns requests into device
//! interactions.
//!
//! ```text
//! Connections → SignalGraph::from_map → Generation (graph + path cache)
//!                                            │
//! connect(map) → routes → conflict check → edge set → join_all(devices)
//! ```
//!
//! - **Generation**: an immutable graph plus its lazily filled per-sink path
//!   cache, swapped wholesale on reload
//! - **Connect**: resolves routes, rejects conflicts, activates edges
//!   concurrently and reports full or partial success
//! - **Queries**: read-only topology lookups against the current generation

mod connect;
mod query;
mod signal_map;

pub use connect::ConnectOutcome;
pub use signal_map::SignalMap;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::device::{Device, DeviceRegistry};
use crate::graph::{Edge, NodeId, Paths, SignalGraph};
use crate::{
    event_callback, Connections, EventCallback, RouterConfig, RouterError, RouterEvent,
};

/// A resolved path from a source to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Nodes along the path, source first.
    pub nodes: Vec<NodeId>,
    /// Edges to activate, nearest the source first; the last edge is the
    /// one at the sink.
    pub edges: Vec<Edge>,
}

impl Route {
    /// Number of hops.
    pub fn hops(&self) -> usize {
        self.edges.len()
    }
}

/// Node lists of the current graph, for status displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyStatus {
    /// Generation counter of the graph these lists describe.
    pub generation: u64,
    /// Every node.
    pub nodes: Vec<NodeId>,
    /// Signal origins.
    pub inputs: Vec<NodeId>,
    /// Final destinations.
    pub outputs: Vec<NodeId>,
}

/// One loaded graph and the paths computed against it.
pub(crate) struct Generation {
    id: u64,
    graph: Arc<SignalGraph>,
    paths: Mutex<HashMap<NodeId, Arc<Paths>>>,
}

impl Generation {
    fn new(id: u64, graph: SignalGraph) -> Self {
        Self {
            id,
            graph: Arc::new(graph),
            paths: Mutex::new(HashMap::new()),
        }
    }

    /// Shortest paths rooted at `sink`, computed on first use.
    pub(crate) fn paths(&self, sink: &str) -> Arc<Paths> {
        let mut cache = self.paths.lock();
        if let Some(paths) = cache.get(sink) {
            return Arc::clone(paths);
        }
        let paths = Arc::new(self.graph.dijkstra(sink));
        cache.insert(NodeId::new(sink), Arc::clone(&paths));
        paths
    }

    /// Finds the shortest path between two nodes.
    pub(crate) fn route(&self, source: &str, sink: &str) -> Result<Route, RouterError> {
        let paths = self.paths(sink);
        let distance = paths
            .distance_to(source)
            .ok_or_else(|| RouterError::no_route(source, sink))?;

        tracing::debug!("found route connecting {source} to {sink} in {distance} hops");

        let mut nodes = vec![NodeId::new(source)];
        let mut edges = Vec::with_capacity(distance);
        let mut node = nodes[0].clone();
        while let Some(prev) = paths.predecessor(&node) {
            let edge = self
                .graph
                .edge(prev, &node)
                .ok_or_else(|| RouterError::UnknownNode {
                    id: prev.to_string(),
                })?;
            edges.push(edge.clone());
            nodes.push(prev.clone());
            node = prev.clone();
        }

        tracing::debug!(
            "{}",
            edges
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" then ")
        );

        Ok(Route { nodes, edges })
    }
}

/// Routes signals across a switching network.
///
/// The router is `Send + Sync`; share it behind an `Arc`. Reloading the
/// connectivity swaps in a new graph atomically, and every `connect()` or
/// query works against the graph that was current when it started.
///
/// Overlapping `connect()` calls are not serialised against each other. If
/// two requests may race for the same intermediate node, put a queue or
/// mutex in front of `connect()`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use signal_router::{ConnectOptions, Connections, MockDevice, Router, SignalMap};
/// use serde_json::json;
///
/// # futures::executor::block_on(async {
/// let switcher = Arc::new(MockDevice::matrix("Switcher_1"));
///
/// let router = Router::builder()
///     .connections(
///         Connections::new()
///             .device("Display_1", json!({ "hdmi": "Switcher_1__1" }))
///             .device("Switcher_1", json!(["Laptop_1", "Laptop_2"])),
///     )
///     .device("Switcher_1", switcher.clone())
///     .build()?;
///
/// let outcome = router
///     .connect(&SignalMap::from([("Laptop_2", "Display_1")]), ConnectOptions::default())
///     .await?;
///
/// assert!(outcome.complete);
/// assert_eq!(switcher.call_count(), 1);
/// # Ok::<(), signal_router::RouterError>(())
/// # })?;
/// # Ok::<(), signal_router::RouterError>(())
/// ```
pub struct Router {
    generation: ArcSwap<Generation>,
    generation_counter: AtomicU64,
    devices: DeviceRegistry,
    event_callback: Option<EventCallback>,
}

impl Router {
    /// Creates a builder for configuring a router.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Creates a router with an empty graph.
    pub fn new(devices: DeviceRegistry) -> Self {
        Self {
            generation: ArcSwap::from_pointee(Generation::new(0, SignalGraph::new())),
            generation_counter: AtomicU64::new(0),
            devices,
            event_callback: None,
        }
    }

    /// Sets the event callback.
    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    /// Sends an event to the callback if configured.
    fn emit_event(&self, event: RouterEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(event);
        }
    }

    /// Rebuilds the graph from `connections` and swaps it in.
    ///
    /// Cached paths belong to the old graph and are dropped with it. If the
    /// connections are invalid the current graph stays in place.
    pub fn load(&self, connections: &Connections) -> Result<(), RouterError> {
        if connections.is_empty() {
            tracing::warn!("no connections defined");
        }

        tracing::debug!("building graph from signal map");
        let graph = SignalGraph::from_map(connections)?;

        let id = self.generation_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Generation::new(id, graph);
        let event = RouterEvent::GraphLoaded {
            generation: id,
            nodes: generation.graph.node_ids(),
            inputs: generation.graph.sinks(),
            outputs: generation.graph.sources(),
        };
        self.generation.store(Arc::new(generation));

        self.emit_event(event);
        Ok(())
    }

    /// Applies new settings.
    pub fn apply_config(&self, config: &RouterConfig) -> Result<(), RouterError> {
        self.load(&config.connections)
    }

    /// The graph currently in use.
    pub fn graph(&self) -> Arc<SignalGraph> {
        Arc::clone(&self.generation.load().graph)
    }

    /// Generation counter of the graph currently in use (0 before the first
    /// load).
    pub fn generation(&self) -> u64 {
        self.generation.load().id
    }

    /// Node lists of the current graph.
    pub fn status(&self) -> TopologyStatus {
        let generation = self.generation.load();
        TopologyStatus {
            generation: generation.id,
            nodes: generation.graph.node_ids(),
            inputs: generation.graph.sinks(),
            outputs: generation.graph.sources(),
        }
    }

    /// The devices this router drives.
    pub fn devices(&self) -> &DeviceRegistry {
        &self.devices
    }

    /// Finds the shortest path from `source` to `sink`.
    ///
    /// Repeated calls against the same generation return the same route.
    pub fn route(&self, source: &str, sink: &str) -> Result<Route, RouterError> {
        self.generation.load().route(source, sink)
    }

    fn current(&self) -> Arc<Generation> {
        self.generation.load_full()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let generation = self.generation.load();
        f.debug_struct("Router")
            .field("generation", &generation.id)
            .field("nodes", &generation.graph.len())
            .field("devices", &self.devices)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a [`Router`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use signal_router::{Connections, MockDevice, Router};
/// use serde_json::json;
///
/// let router = Router::builder()
///     .connections(Connections::new().device("Display_1", json!(["Laptop_1"])))
///     .device("Display_1", Arc::new(MockDevice::switcher("Display_1")))
///     .on_event(|event| tracing::info!(?event, "router event"))
///     .build()?;
///
/// assert_eq!(router.generation(), 1);
/// # Ok::<(), signal_router::RouterError>(())
/// ```
#[must_use]
pub struct RouterBuilder {
    connections: Connections,
    devices: DeviceRegistry,
    event_callback: Option<EventCallback>,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterBuilder {
    /// Creates a new builder with no connections or devices.
    pub fn new() -> Self {
        Self {
            connections: Connections::default(),
            devices: DeviceRegistry::new(),
            event_callback: None,
        }
    }

    /// Sets the signal connectivity.
    pub fn connections(mut self, connections: Connections) -> Self {
        self.connections = connections;
        self
    }

    /// Takes the connectivity from settings.
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.connections = config.connections;
        self
    }

    /// Uses an existing registry (shared with whoever manages devices).
    pub fn devices(mut self, devices: DeviceRegistry) -> Self {
        self.devices = devices;
        self
    }

    /// Registers the device controlling module `id`.
    pub fn device(self, id: impl Into<NodeId>, device: Arc<dyn Device>) -> Self {
        self.devices.register(id, device);
        self
    }

    /// Set a callback to receive runtime events.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(RouterEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(callback));
        self
    }

    /// Builds the router and loads the initial graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the connections cannot be turned into a graph.
    pub fn build(self) -> Result<Router, RouterError> {
        let mut router = Router::new(self.devices);
        if let Some(callback) = self.event_callback {
            router = router.with_event_callback(callback);
        }
        router.load(&self.connections)?;
        Ok(router)
    }
}
