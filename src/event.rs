//! Runtime events for monitoring routing activity.
//!
//! Events are notifications about what the router did: graph reloads,
//! routes dropped by best-effort connects and per-edge outcomes. They are
//! for status displays and metrics; control flow never depends on them.

use std::sync::Arc;

use crate::graph::{Edge, NodeId};

/// Runtime events emitted by the [`Router`](crate::Router).
///
/// # Example
///
/// ```
/// use signal_router::RouterEvent;
///
/// fn handle_event(event: RouterEvent) {
///     match event {
///         RouterEvent::GraphLoaded { generation, nodes, .. } => {
///             eprintln!("graph #{generation}: {} nodes", nodes.len());
///         }
///         RouterEvent::RouteDropped { source, sink, reason } => {
///             eprintln!("dropped {source} -> {sink}: {reason}");
///         }
///         RouterEvent::EdgeSkipped { edge, reason } => {
///             eprintln!("skipped {edge}: {reason}");
///         }
///         RouterEvent::EdgeUnroutable { edge, reason } => {
///             eprintln!("can not switch {edge}: {reason}");
///         }
///         RouterEvent::EdgeFailed { edge, error } => {
///             eprintln!("failed to switch {edge}: {error}");
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum RouterEvent {
    /// A new signal graph was built and swapped in.
    GraphLoaded {
        /// Generation counter, incremented on every load.
        generation: u64,
        /// Every node in the graph.
        nodes: Vec<NodeId>,
        /// Signal origins (nodes that feed others but are fed by nothing).
        inputs: Vec<NodeId>,
        /// Final destinations (nodes nothing else is fed from).
        outputs: Vec<NodeId>,
    },

    /// A best-effort connect dropped one sink of a request.
    RouteDropped {
        /// Requested source.
        source: NodeId,
        /// Sink that was dropped.
        sink: NodeId,
        /// Why the route was dropped.
        reason: String,
    },

    /// An edge did not need a device call and counts as satisfied.
    EdgeSkipped {
        /// The skipped edge.
        edge: Edge,
        /// Why no call was needed.
        reason: String,
    },

    /// An edge could not be attempted (device missing, offline or lacking
    /// the required operation).
    EdgeUnroutable {
        /// The edge that could not be activated.
        edge: Edge,
        /// Why the edge could not be activated.
        reason: String,
    },

    /// A device call was made and reported failure.
    EdgeFailed {
        /// The edge whose activation failed.
        edge: Edge,
        /// Description of the error.
        error: String,
    },
}

/// Callback type for receiving router events.
///
/// Register via [`RouterBuilder::on_event()`](crate::RouterBuilder::on_event).
pub type EventCallback = Arc<dyn Fn(RouterEvent) + Send + Sync>;

/// Creates an [`EventCallback`] from a closure.
///
/// # Example
///
/// ```
/// use signal_router::{event_callback, RouterEvent};
///
/// let callback = event_callback(|event| {
///     println!("Got event: {:?}", event);
/// });
/// ```
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(RouterEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_event_debug() {
        let event = RouterEvent::RouteDropped {
            source: NodeId::new("Laptop_1"),
            sink: NodeId::new("Display_9"),
            reason: "no route".to_string(),
        };
        let debug = format!("{:?}", event);
        assert!(debug.contains("RouteDropped"));
        assert!(debug.contains("Display_9"));
    }

    #[test]
    fn test_event_callback_helper() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let callback = event_callback(move |_| {
            called_clone.store(true, Ordering::SeqCst);
        });

        callback(RouterEvent::GraphLoaded {
            generation: 1,
            nodes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        });
        assert!(called.load(Ordering::SeqCst));
    }
}
