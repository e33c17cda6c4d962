//! Graph edge types.
//!
//! An [`Edge`] runs from a sink-side node to a source-side node and carries
//! everything needed to realise that hop on hardware: which device to drive,
//! which input to select and, for matrix devices, which output to send it to.

use std::sync::Arc;

use super::NodeId;

/// An input or output selector on a device.
///
/// Selectors written as plain digits (`"3"`, or a JSON number) are positional
/// indices; anything else is a named port such as `hdmi` or `usb_c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    /// Positional (1-based) port.
    Index(u32),
    /// Named port.
    Name(Arc<str>),
}

impl Selector {
    /// Parses a selector, turning all-digit strings into indices.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = raw.parse() {
                return Self::Index(index);
            }
        }
        Self::Name(Arc::from(raw))
    }

    /// Returns the index if this is a positional selector.
    pub fn index(&self) -> Option<u32> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Name(_) => None,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<u32> for Selector {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Selector {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

/// How an edge is activated on its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Single-output switch: select an input.
    Nx1,
    /// Matrix / multi-output device: route an input to an output.
    Nxn,
}

/// A directed hop in the signal graph.
///
/// Direction is inverted relative to signal flow: `source` is the node
/// nearer the display and `target` the node nearer the signal origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Sink-side node.
    pub source: NodeId,
    /// Source-side node.
    pub target: NodeId,
    /// Module that must be driven to realise this hop (alias resolved).
    pub device: NodeId,
    /// Input to select on `device`.
    pub input: Selector,
    /// Output on `device`, present only for matrix devices.
    pub output: Option<Selector>,
}

impl Edge {
    /// Creates a single-output (nx1) edge.
    pub fn nx1(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        device: impl Into<NodeId>,
        input: impl Into<Selector>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            device: device.into(),
            input: input.into(),
            output: None,
        }
    }

    /// Creates a matrix (nxn) edge.
    pub fn nxn(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        device: impl Into<NodeId>,
        input: impl Into<Selector>,
        output: impl Into<Selector>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            device: device.into(),
            input: input.into(),
            output: Some(output.into()),
        }
    }

    /// Returns the activation kind.
    pub fn kind(&self) -> EdgeKind {
        if self.output.is_some() {
            EdgeKind::Nxn
        } else {
            EdgeKind::Nx1
        }
    }

    /// Checks if the edge is a switchable input on a single output device.
    pub fn is_nx1(&self) -> bool {
        self.kind() == EdgeKind::Nx1
    }

    /// Checks if the edge is a matrix switcher / multi-output device hop.
    pub fn is_nxn(&self) -> bool {
        self.kind() == EdgeKind::Nxn
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.output {
            None => write!(f, "{} to {} (in {})", self.target, self.device, self.input),
            Some(output) => write!(
                f,
                "{} to {} (in {} out {})",
                self.target, self.device, self.input, output
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parse_numeric() {
        assert_eq!(Selector::parse("3"), Selector::Index(3));
        assert_eq!(Selector::parse(" 12 "), Selector::Index(12));
    }

    #[test]
    fn test_selector_parse_named() {
        assert_eq!(Selector::parse("hdmi"), Selector::Name(Arc::from("hdmi")));
        assert_eq!(Selector::parse("hdmi2"), Selector::Name(Arc::from("hdmi2")));
        assert_eq!(Selector::parse("-1"), Selector::Name(Arc::from("-1")));
    }

    #[test]
    fn test_selector_parse_overflow_stays_named() {
        assert!(matches!(
            Selector::parse("99999999999999"),
            Selector::Name(_)
        ));
    }

    #[test]
    fn test_edge_kind() {
        let single = Edge::nx1("Display_1", "Laptop_1", "Display_1", "hdmi");
        let matrix = Edge::nxn("Switcher_1__1", "Laptop_1", "Switcher_1", 1u32, "1");

        assert!(single.is_nx1());
        assert!(!single.is_nxn());
        assert!(matrix.is_nxn());
        assert_eq!(matrix.output, Some(Selector::Index(1)));
    }

    #[test]
    fn test_edge_display() {
        let single = Edge::nx1("Display_1", "Laptop_1", "Display_1", "hdmi");
        assert_eq!(single.to_string(), "Laptop_1 to Display_1 (in hdmi)");

        let matrix = Edge::nxn("Switcher_1__2", "Laptop_2", "Switcher_1", 2u32, 2u32);
        assert_eq!(matrix.to_string(), "Laptop_2 to Switcher_1 (in 2 out 2)");
    }
}
