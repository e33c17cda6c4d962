//! Node identification type.

use std::borrow::Borrow;
use std::ops::Deref;
use std::sync::Arc;

/// Identifier for a node in the signal graph.
///
/// Every signal endpoint (display, laptop input, matrix output facet) and
/// every controlling device is named by a `NodeId`. It wraps an `Arc<str>`
/// so the same id can sit in node tables, edges, paths and request maps
/// without copying the string.
///
/// Ids are compared verbatim; surrounding whitespace is trimmed once when
/// the id is created, which is the only normalisation applied.
///
/// # Example
///
/// ```
/// use signal_router::NodeId;
///
/// let display = NodeId::new("Display_1");
///
/// assert_eq!(display, NodeId::new(" Display_1 "));
/// assert_ne!(display, NodeId::new("display_1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Arc<str>);

/// Devices are addressed with the same identifier type as nodes.
pub type DeviceId = NodeId;

impl NodeId {
    /// Creates a new node id from a string.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref().trim()))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for NodeId {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for NodeId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_equality() {
        let a = NodeId::new("Laptop_1");
        let b = NodeId::new("Laptop_1");
        let c = NodeId::new("Laptop_2");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_node_id_trims_whitespace() {
        assert_eq!(NodeId::new("  Switcher_1 ").as_str(), "Switcher_1");
    }

    #[test]
    fn test_node_id_display() {
        let id = NodeId::new("Display_1");
        assert_eq!(format!("{id}"), "Display_1");
    }

    #[test]
    fn test_node_id_borrow_lookup() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(NodeId::new("Display_1"), 1);

        assert_eq!(map.get("Display_1"), Some(&1));
    }
}
