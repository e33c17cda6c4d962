//! Signal graph and path finding.
//!
//! All signal sinks and sources are nodes; directed edges carry the
//! connectivity information needed to drive a device so that the hop is
//! "active".
//!
//! Edge direction is inverted relative to signal flow: edges start at the
//! display side and end at the signal origin. Environments usually have a
//! handful of displays and many sources, so a single search rooted at a
//! display enumerates every source that can reach it, and dropping a node
//! that is known to have no incoming edges never needs a scan.
//!
//! ```text
//! Display_1 ──hdmi──▶ Switcher_1__1 ──in 1──▶ Laptop_1
//!                                  └─in 2──▶ Laptop_2
//! ```

mod builder;
mod edge;
mod node_id;

pub use edge::{Edge, EdgeKind, Selector};
pub use node_id::{DeviceId, NodeId};

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use indexmap::IndexMap;

use crate::RouterError;

/// A node and its outgoing edges, keyed by target node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    edges: IndexMap<NodeId, Edge>,
}

impl Node {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            edges: IndexMap::new(),
        }
    }

    /// Returns the node id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the edge to `target`, if one exists.
    pub fn edge(&self, target: &str) -> Option<&Edge> {
        self.edges.get(target)
    }

    /// Iterates outgoing edges in the order they were joined.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }
}

/// Result of a single-source shortest path search.
///
/// Nodes absent from `distance_to` are unreachable (infinite distance).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paths {
    distance_to: HashMap<NodeId, usize>,
    predecessor: HashMap<NodeId, NodeId>,
}

impl Paths {
    /// Hop count from the search root, or `None` if unreachable.
    pub fn distance_to(&self, id: &str) -> Option<usize> {
        self.distance_to.get(id).copied()
    }

    /// The node preceding `id` on its shortest path from the root.
    pub fn predecessor(&self, id: &str) -> Option<&NodeId> {
        self.predecessor.get(id)
    }

    /// Returns `true` if `id` has a finite distance from the root.
    pub fn is_reachable(&self, id: &str) -> bool {
        self.distance_to.contains_key(id)
    }
}

/// Directed graph of switching nodes.
///
/// Built once per configuration load and never mutated afterwards; a reload
/// builds a new graph. See [`SignalGraph::from_map`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalGraph {
    nodes: IndexMap<NodeId, Node>,
}

impl SignalGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node with the given id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns `true` if the node exists.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all nodes.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node ids.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    /// Adds a node. Inserting an existing id is a no-op.
    pub fn insert(&mut self, id: impl Into<NodeId>) -> &mut Self {
        let id = id.into();
        self.nodes
            .entry(id.clone())
            .or_insert_with(|| Node::new(id));
        self
    }

    /// Removes a node.
    ///
    /// With `check_incoming_edges` set, every edge pointing at the node is
    /// removed as well, which walks every edge in the graph. Passing `false`
    /// skips that walk; it is only sound when the node is known to have no
    /// incoming edges (placeholder nodes during construction). Any other use
    /// leaves edges pointing at a missing node.
    ///
    /// The remaining nodes keep their insertion order.
    pub fn delete(
        &mut self,
        id: &str,
        check_incoming_edges: bool,
    ) -> Result<&mut Self, RouterError> {
        if self.nodes.shift_remove(id).is_none() {
            return Err(RouterError::UnknownNode { id: id.to_string() });
        }
        if check_incoming_edges {
            for node in self.nodes.values_mut() {
                node.edges.shift_remove(id);
            }
        }
        Ok(self)
    }

    /// Adds a directed edge from `edge.source` to `edge.target`.
    ///
    /// Replaces any existing edge between the same pair of nodes.
    pub fn join(&mut self, edge: Edge) -> Result<&mut Self, RouterError> {
        if !self.nodes.contains_key(&edge.target) {
            return Err(RouterError::UnknownNode {
                id: edge.target.to_string(),
            });
        }
        let node = self
            .nodes
            .get_mut(&edge.source)
            .ok_or_else(|| RouterError::UnknownNode {
                id: edge.source.to_string(),
            })?;
        node.edges.insert(edge.target.clone(), edge);
        Ok(self)
    }

    /// Ids of the nodes reached by `id`'s outgoing edges.
    pub fn successors(&self, id: &str) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.edges.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Nodes with no incoming edges (displays and other final sinks of the
    /// signal flow).
    pub fn sources(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.indegree(id) == 0)
            .cloned()
            .collect()
    }

    /// Nodes with no outgoing edges (signal origins).
    pub fn sinks(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.edges.is_empty())
            .map(|node| node.id.clone())
            .collect()
    }

    /// All edges ending at `id`. Walks the whole graph.
    pub fn incoming_edges(&self, id: &str) -> Vec<&Edge> {
        self.nodes
            .values()
            .filter_map(|node| node.edges.get(id))
            .collect()
    }

    /// All edges starting at `id`.
    pub fn outgoing_edges(&self, id: &str) -> Vec<&Edge> {
        self.nodes
            .get(id)
            .map(|node| node.edges.values().collect())
            .unwrap_or_default()
    }

    /// Number of edges ending at `id`.
    pub fn indegree(&self, id: &str) -> usize {
        self.nodes
            .values()
            .filter(|node| node.edges.contains_key(id))
            .count()
    }

    /// Number of edges starting at `id`.
    pub fn outdegree(&self, id: &str) -> usize {
        self.nodes.get(id).map_or(0, |node| node.edges.len())
    }

    /// Returns the edge from `source` to `target`.
    pub fn edge(&self, source: &str, target: &str) -> Option<&Edge> {
        self.nodes.get(source).and_then(|node| node.edge(target))
    }

    /// Shortest paths from `root` to every reachable node.
    ///
    /// All edges weigh 1. When two paths tie, the first one discovered wins:
    /// equal-distance entries leave the queue in the order they were pushed
    /// and a distance is only replaced by a strictly shorter one. An unknown
    /// root yields empty paths.
    pub fn dijkstra(&self, root: &str) -> Paths {
        let mut paths = Paths::default();
        let Some((root, _)) = self.nodes.get_key_value(root) else {
            return paths;
        };

        let mut queue = BinaryHeap::new();
        let mut discovered = 0usize;

        paths.distance_to.insert(root.clone(), 0);
        queue.push(Reverse((0usize, discovered, root.clone())));

        while let Some(Reverse((distance, _, id))) = queue.pop() {
            if paths.distance_to(&id).is_some_and(|best| distance > best) {
                continue;
            }
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            for next in node.edges.keys() {
                let alt = distance + 1;
                if paths.distance_to(next).is_some_and(|best| alt >= best) {
                    continue;
                }
                paths.distance_to.insert(next.clone(), alt);
                paths.predecessor.insert(next.clone(), id.clone());
                discovered += 1;
                queue.push(Reverse((alt, discovered, next.clone())));
            }
        }

        paths
    }
}

impl std::fmt::Display for SignalGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.nodes.keys().map(NodeId::as_str).collect();
        write!(f, "{{ {} }}", ids.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Display_1 -> Switcher_1__1 -> {Laptop_1, Laptop_2}
    fn chain() -> SignalGraph {
        let mut graph = SignalGraph::new();
        graph
            .insert("Display_1")
            .insert("Switcher_1__1")
            .insert("Laptop_1")
            .insert("Laptop_2");
        graph
            .join(Edge::nx1("Display_1", "Switcher_1__1", "Display_1", "hdmi"))
            .unwrap()
            .join(Edge::nxn("Switcher_1__1", "Laptop_1", "Switcher_1", 1u32, 1u32))
            .unwrap()
            .join(Edge::nxn("Switcher_1__1", "Laptop_2", "Switcher_1", 2u32, 1u32))
            .unwrap();
        graph
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut graph = SignalGraph::new();
        graph.insert("a").insert("a");
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_join_unknown_node() {
        let mut graph = SignalGraph::new();
        graph.insert("a");

        let result = graph.join(Edge::nx1("a", "b", "a", 1u32));
        assert!(matches!(result, Err(RouterError::UnknownNode { id }) if id == "b"));

        let result = graph.join(Edge::nx1("c", "a", "c", 1u32));
        assert!(matches!(result, Err(RouterError::UnknownNode { id }) if id == "c"));
    }

    #[test]
    fn test_degrees_and_endpoints() {
        let graph = chain();

        assert_eq!(graph.outdegree("Switcher_1__1"), 2);
        assert_eq!(graph.indegree("Switcher_1__1"), 1);
        assert_eq!(graph.sources(), vec![NodeId::new("Display_1")]);
        assert_eq!(
            graph.sinks(),
            vec![NodeId::new("Laptop_1"), NodeId::new("Laptop_2")]
        );
        assert_eq!(graph.incoming_edges("Laptop_1").len(), 1);
        assert_eq!(graph.outgoing_edges("Display_1").len(), 1);
    }

    #[test]
    fn test_delete_checks_incoming_edges() {
        let mut graph = chain();
        graph.delete("Laptop_2", true).unwrap();

        assert!(!graph.contains("Laptop_2"));
        assert_eq!(graph.outdegree("Switcher_1__1"), 1);
    }

    #[test]
    fn test_delete_keeps_node_order() {
        let mut graph = chain();
        graph.insert("Orphan");
        graph.delete("Switcher_1__1", true).unwrap();

        assert_eq!(
            graph.node_ids(),
            vec![
                NodeId::new("Display_1"),
                NodeId::new("Laptop_1"),
                NodeId::new("Laptop_2"),
                NodeId::new("Orphan"),
            ]
        );
        assert_eq!(graph.outdegree("Display_1"), 0);
    }

    #[test]
    fn test_delete_unknown_node() {
        let mut graph = chain();
        assert!(matches!(
            graph.delete("nope", true),
            Err(RouterError::UnknownNode { .. })
        ));
    }

    #[test]
    fn test_dijkstra_distances() {
        let graph = chain();
        let paths = graph.dijkstra("Display_1");

        assert_eq!(paths.distance_to("Display_1"), Some(0));
        assert_eq!(paths.distance_to("Switcher_1__1"), Some(1));
        assert_eq!(paths.distance_to("Laptop_2"), Some(2));
        assert_eq!(
            paths.predecessor("Laptop_2").map(NodeId::as_str),
            Some("Switcher_1__1")
        );
        assert_eq!(paths.predecessor("Display_1"), None);
    }

    #[test]
    fn test_dijkstra_unreachable() {
        let mut graph = chain();
        graph.insert("Orphan");
        let paths = graph.dijkstra("Display_1");

        assert_eq!(paths.distance_to("Orphan"), None);
        assert!(!paths.is_reachable("Orphan"));
        assert_eq!(paths.predecessor("Orphan"), None);
    }

    #[test]
    fn test_dijkstra_unknown_root() {
        let paths = chain().dijkstra("Nowhere");
        assert_eq!(paths, Paths::default());
    }

    #[test]
    fn test_dijkstra_first_discovered_wins_ties() {
        // root reaches end through both a and b in two hops
        let mut graph = SignalGraph::new();
        graph.insert("root").insert("a").insert("b").insert("end");
        graph
            .join(Edge::nx1("root", "a", "root", 1u32))
            .unwrap()
            .join(Edge::nx1("root", "b", "root", 2u32))
            .unwrap()
            .join(Edge::nx1("b", "end", "b", 1u32))
            .unwrap()
            .join(Edge::nx1("a", "end", "a", 1u32))
            .unwrap();

        let paths = graph.dijkstra("root");
        assert_eq!(paths.distance_to("end"), Some(2));
        assert_eq!(paths.predecessor("end").map(NodeId::as_str), Some("a"));
    }

    #[test]
    fn test_dijkstra_predecessor_distance_invariant() {
        let graph = chain();
        let paths = graph.dijkstra("Display_1");

        for id in graph.node_ids() {
            if let Some(prev) = paths.predecessor(&id) {
                assert_eq!(
                    paths.distance_to(&id),
                    paths.distance_to(prev).map(|d| d + 1)
                );
            }
        }
    }

    #[test]
    fn test_display() {
        let mut graph = SignalGraph::new();
        graph.insert("a").insert("b");
        assert_eq!(graph.to_string(), "{ a, b }");
    }
}
