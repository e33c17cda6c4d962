//! Error types for signal-router.
//!
//! Errors are split into two categories:
//! - **Fatal errors** ([`RouterError`]): returned from graph construction,
//!   `connect()` and topology queries
//! - **Device errors** ([`DeviceError`]): returned by individual device
//!   calls and folded into the partial result of `connect()`, never raised

use std::path::PathBuf;

use crate::device::Capability;

/// Fatal errors from building the graph, connecting routes or querying
/// topology.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The connectivity configuration is malformed.
    #[error("invalid connections for {device}: {reason}")]
    Config {
        /// Device key the problem was found under.
        device: String,
        /// What was wrong.
        reason: String,
    },

    /// Configuration text was not valid JSON for the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A node was referenced that does not exist in the graph.
    #[error("\"{id}\" does not exist")]
    UnknownNode {
        /// The missing node id.
        id: String,
    },

    /// The sink cannot be reached from the source.
    #[error("no route from {from} to {to}")]
    NoRoute {
        /// Requested signal source.
        from: String,
        /// Requested sink.
        to: String,
    },

    /// A route needs a node already claimed by an earlier source.
    #[error("route from {from} to {to} conflicts with routes in {claimed}")]
    Conflict {
        /// Signal source of the rejected route.
        from: String,
        /// Sink of the rejected route.
        to: String,
        /// Rendering of the routes accepted before this one.
        claimed: String,
    },

    /// An atomic connect found edges that cannot be activated.
    #[error("can not perform all routes: {}", edges.join(", "))]
    Unroutable {
        /// The edges that could not be activated.
        edges: Vec<String>,
    },

    /// Every edge that needed activation failed.
    #[error("failed to activate, devices untouched ({failed} edges failed)")]
    NothingActivated {
        /// Number of failed edges.
        failed: usize,
    },

    /// The node feeds nothing.
    #[error("no outputs from {node}")]
    NoOutputs {
        /// The queried node.
        node: String,
    },

    /// The node feeds more than one device; a sink must be given.
    #[error("multiple outputs from {node}, please specify a sink")]
    AmbiguousSource {
        /// The queried node.
        node: String,
    },

    /// The node is not a plain input on a single device.
    #[error("{node} is not an input node")]
    NotAnInputNode {
        /// The queried node.
        node: String,
    },

    /// The sink has no input with the given selector.
    #[error("{sink} has no input {input}")]
    UnknownInput {
        /// The queried sink.
        sink: String,
        /// The requested input.
        input: String,
    },
}

impl RouterError {
    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a no-route error.
    pub fn no_route(from: impl ToString, to: impl ToString) -> Self {
        Self::NoRoute {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Errors reported by a [`Device`](crate::Device) when asked to switch.
///
/// Device errors are recoverable from the router's point of view: the edge
/// lands in the failed set and the rest of the request carries on. The
/// router never retries; retry belongs to the device driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The device is not reachable.
    #[error("device offline")]
    Offline,

    /// The device does not implement the requested operation.
    #[error("unsupported operation: {capability}")]
    Unsupported {
        /// The missing capability.
        capability: Capability,
    },

    /// The device executed the command and reported failure.
    #[error("switch failed: {reason}")]
    Failed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Custom error for user-implemented devices.
    #[error("{0}")]
    Custom(String),
}

impl DeviceError {
    /// Creates a custom device error with the given message.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Creates a switch failed error with the given reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_route_display() {
        let err = RouterError::no_route("Laptop_1", "NoSuchDisplay");
        assert_eq!(err.to_string(), "no route from Laptop_1 to NoSuchDisplay");
    }

    #[test]
    fn test_unroutable_display() {
        let err = RouterError::Unroutable {
            edges: vec!["a to b (in 1)".to_string(), "c to d (in 2)".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "can not perform all routes: a to b (in 1), c to d (in 2)"
        );
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = RouterError::io("/tmp/router.json", io_err);
        assert!(err.to_string().contains("/tmp/router.json"));
    }

    #[test]
    fn test_device_error_custom() {
        let err = DeviceError::custom("no ack");
        assert_eq!(err.to_string(), "no ack");
    }

    #[test]
    fn test_device_error_unsupported() {
        let err = DeviceError::Unsupported {
            capability: Capability::Switch,
        };
        assert_eq!(err.to_string(), "unsupported operation: switch");
    }
}
