//! Configuration types for the router.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RouterError;

/// Declarative signal connectivity, as consumed by
/// [`SignalGraph::from_map`](crate::SignalGraph::from_map).
///
/// Maps each device key to its inputs. Inputs are either a JSON object of
/// `input -> source` or a JSON array of sources numbered from 1. Key order
/// is preserved.
///
/// # Example
///
/// ```
/// use signal_router::Connections;
/// use serde_json::json;
///
/// let connections = Connections::new()
///     .device("Display_1", json!({ "hdmi": "Laptop_1", "vga": "Pc_1" }))
///     .device("Recorder as Capture", json!(["Camera_1", "Camera_2"]));
///
/// assert_eq!(connections.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Connections(IndexMap<String, Value>);

impl Connections {
    /// Creates empty connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the inputs of a device.
    #[must_use]
    pub fn device(mut self, key: impl Into<String>, inputs: Value) -> Self {
        self.0.insert(key.into(), inputs);
        self
    }

    /// Iterates `(device key, inputs)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of device entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no devices are defined.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Router settings.
///
/// # Example
///
/// ```
/// use signal_router::RouterConfig;
///
/// let config = RouterConfig::from_json_str(r#"{
///     "connections": {
///         "Display_1": ["Laptop_1", "Laptop_2"]
///     }
/// }"#)?;
///
/// assert_eq!(config.connections.len(), 1);
/// # Ok::<(), signal_router::RouterError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Nested map of signal connectivity.
    ///
    /// Default: empty (the router starts with an empty graph).
    pub connections: Connections,
}

impl RouterConfig {
    /// Parses settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, RouterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RouterError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| RouterError::io(path, e))?;
        Self::from_json_str(&json)
    }
}

/// Options for a single [`Router::connect`](crate::Router::connect) call.
///
/// # Example
///
/// ```
/// use signal_router::ConnectOptions;
///
/// let options = ConnectOptions::default().atomic();
/// assert!(options.atomic);
/// assert!(!options.force);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Refuse to touch any device unless every requested route can be
    /// realised.
    ///
    /// Default: false (best effort)
    pub atomic: bool,

    /// Switch devices even when they already report the requested input.
    ///
    /// Default: false
    pub force: bool,
}

impl ConnectOptions {
    /// Enables all-or-nothing application.
    #[must_use]
    pub fn atomic(mut self) -> Self {
        self.atomic = true;
        self
    }

    /// Enables forced switching.
    #[must_use]
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}
