//! Ordered `source -> sinks` maps used for requests and results.

use indexmap::IndexMap;

use crate::graph::NodeId;

/// A set of routes keyed by source, in declaration order.
///
/// Used both as the request to [`Router::connect`](crate::Router::connect)
/// and as the map of routes it actually applied. Order matters: when two
/// sources need the same node, the one declared first keeps it.
///
/// # Example
///
/// ```
/// use signal_router::SignalMap;
///
/// let map = SignalMap::new()
///     .route("Laptop_1", "Display_1")
///     .route_all("Camera_1", ["Display_2", "Recorder_1"]);
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.sinks("Camera_1").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalMap(IndexMap<NodeId, Vec<NodeId>>);

impl SignalMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `sink` to the sinks of `source`.
    #[must_use]
    pub fn route(mut self, source: impl Into<NodeId>, sink: impl Into<NodeId>) -> Self {
        self.push(source.into(), sink.into());
        self
    }

    /// Adds every sink in `sinks` to the sinks of `source`.
    #[must_use]
    pub fn route_all<I, T>(mut self, source: impl Into<NodeId>, sinks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        let entry = self.0.entry(source.into()).or_default();
        entry.extend(sinks.into_iter().map(Into::into));
        self
    }

    /// Ensures `source` is present, even with no sinks.
    pub(crate) fn insert_source(&mut self, source: NodeId) {
        self.0.entry(source).or_default();
    }

    pub(crate) fn push(&mut self, source: NodeId, sink: NodeId) {
        self.0.entry(source).or_default().push(sink);
    }

    /// Sinks requested for (or applied to) `source`.
    pub fn sinks(&self, source: &str) -> Option<&[NodeId]> {
        self.0.get(source).map(Vec::as_slice)
    }

    /// Iterates `(source, sinks)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &[NodeId])> {
        self.0.iter().map(|(source, sinks)| (source, sinks.as_slice()))
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no sources are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of `(source, sink)` routes.
    pub fn route_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl<S, T> FromIterator<(S, T)> for SignalMap
where
    S: Into<NodeId>,
    T: Into<NodeId>,
{
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (source, sink) in iter {
            map.push(source.into(), sink.into());
        }
        map
    }
}

impl<S, T, const N: usize> From<[(S, T); N]> for SignalMap
where
    S: Into<NodeId>,
    T: Into<NodeId>,
{
    fn from(routes: [(S, T); N]) -> Self {
        routes.into_iter().collect()
    }
}

impl std::fmt::Display for SignalMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes: Vec<String> = self
            .0
            .iter()
            .map(|(source, sinks)| {
                let sinks: Vec<&str> = sinks.iter().map(NodeId::as_str).collect();
                format!("{source} => [{}]", sinks.join(", "))
            })
            .collect();
        write!(f, "{{ {} }}", routes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_map_preserves_order() {
        let map = SignalMap::from([("b", "Display_1"), ("a", "Display_2"), ("b", "Display_3")]);

        let sources: Vec<&str> = map.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(sources, vec!["b", "a"]);
        assert_eq!(map.sinks("b").unwrap().len(), 2);
        assert_eq!(map.route_count(), 3);
    }

    #[test]
    fn test_signal_map_display() {
        let map = SignalMap::new()
            .route("Laptop_1", "Display_1")
            .route_all("Camera_1", ["Display_2", "Recorder_1"]);

        assert_eq!(
            map.to_string(),
            "{ Laptop_1 => [Display_1], Camera_1 => [Display_2, Recorder_1] }"
        );
    }

    #[test]
    fn test_signal_map_empty_source() {
        let mut map = SignalMap::new();
        map.insert_source(NodeId::new("Laptop_1"));

        assert_eq!(map.len(), 1);
        assert_eq!(map.sinks("Laptop_1"), Some(&[][..]));
        assert_eq!(map.route_count(), 0);
    }
}
