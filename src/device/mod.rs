//! Device trait and registry: the boundary to hardware control.
//!
//! A [`Device`] is a control proxy for one switching module (display,
//! switcher, matrix). The router never encodes wire protocols; it asks a
//! device to select an input, or to route an input to an output, and reads
//! back the device's own view of its state.
//!
//! - [`DeviceRegistry`]: looks devices up by module id
//! - [`MockDevice`]: scriptable in-memory device for tests and demos

mod mock;

pub use mock::{MockCall, MockDevice};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::graph::{NodeId, Selector};
use crate::DeviceError;

/// Operations a device may offer for activating edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Select an input on a single-output device.
    SwitchTo,
    /// Route an input to an output on a matrix device.
    Switch,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SwitchTo => write!(f, "switch_to"),
            Self::Switch => write!(f, "switch"),
        }
    }
}

/// A controllable switching device.
///
/// The router probes [`supports`](Device::supports) before calling an
/// operation and never calls one the device does not advertise.
///
/// # Implementation Notes
///
/// - Methods take `&self` - use interior mutability (`Mutex`, atomics) for state
/// - Switch calls for different edges run concurrently, possibly on the
///   same device when one matrix carries several routes
/// - Retrying a failed command is the device's business; the router reports
///   whatever the call returns
///
/// # Example
///
/// ```
/// use signal_router::{Capability, Device, DeviceError, Selector};
/// use async_trait::async_trait;
///
/// struct Projector {
///     name: String,
/// }
///
/// #[async_trait]
/// impl Device for Projector {
///     fn name(&self) -> &str {
///         &self.name
///     }
///
///     fn supports(&self, capability: Capability) -> bool {
///         capability == Capability::SwitchTo
///     }
///
///     async fn switch_to(&self, input: &Selector) -> Result<(), DeviceError> {
///         println!("{} -> input {}", self.name, input);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Device: Send + Sync {
    /// Human-readable name for logging and error messages.
    fn name(&self) -> &str;

    /// Whether the device is currently reachable.
    ///
    /// Default implementation reports connected.
    fn is_connected(&self) -> bool {
        true
    }

    /// The input the device currently reports as active, if known.
    ///
    /// Default implementation reports nothing.
    fn input(&self) -> Option<Selector> {
        None
    }

    /// Whether the device implements the given operation.
    fn supports(&self, capability: Capability) -> bool;

    /// Select `input` on a single-output device.
    ///
    /// Default implementation reports the operation as unsupported.
    async fn switch_to(&self, input: &Selector) -> Result<(), DeviceError> {
        let _ = input;
        Err(DeviceError::Unsupported {
            capability: Capability::SwitchTo,
        })
    }

    /// Route `input` to `output` on a matrix device.
    ///
    /// Default implementation reports the operation as unsupported.
    async fn switch(&self, input: &Selector, output: &Selector) -> Result<(), DeviceError> {
        let _ = (input, output);
        Err(DeviceError::Unsupported {
            capability: Capability::Switch,
        })
    }
}

/// Devices available to the router, keyed by module id.
///
/// Cloning a registry shares the underlying table, so devices can be added
/// or removed after the router is built.
#[derive(Clone, Default)]
pub struct DeviceRegistry {
    devices: Arc<RwLock<HashMap<NodeId, Arc<dyn Device>>>>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the device controlling module `id`.
    pub fn register(&self, id: impl Into<NodeId>, device: Arc<dyn Device>) {
        self.devices.write().insert(id.into(), device);
    }

    /// Removes the device for module `id`, returning it.
    pub fn remove(&self, id: &str) -> Option<Arc<dyn Device>> {
        self.devices.write().remove(id)
    }

    /// Looks up the device for module `id`.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Device>> {
        self.devices.read().get(id).cloned()
    }

    /// Returns `true` if a device is registered for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.devices.read().contains_key(id)
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Returns `true` if no devices are registered.
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let devices = self.devices.read();
        let mut ids: Vec<&str> = devices.keys().map(NodeId::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("DeviceRegistry")
            .field("devices", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSwitcher {
        name: String,
        count: AtomicUsize,
    }

    #[async_trait]
    impl Device for CountingSwitcher {
        fn name(&self) -> &str {
            &self.name
        }

        fn supports(&self, capability: Capability) -> bool {
            capability == Capability::SwitchTo
        }

        async fn switch_to(&self, _input: &Selector) -> Result<(), DeviceError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_default_methods() {
        let device = CountingSwitcher {
            name: "Display_1".to_string(),
            count: AtomicUsize::new(0),
        };

        assert!(device.is_connected());
        assert_eq!(device.input(), None);

        device.switch_to(&Selector::Index(1)).await.unwrap();
        assert_eq!(device.count.load(Ordering::SeqCst), 1);

        let result = device.switch(&Selector::Index(1), &Selector::Index(2)).await;
        assert_eq!(
            result,
            Err(DeviceError::Unsupported {
                capability: Capability::Switch
            })
        );
    }

    #[test]
    fn test_registry_register_and_remove() {
        let registry = DeviceRegistry::new();
        registry.register("Display_1", Arc::new(MockDevice::switcher("Display_1")));

        assert!(registry.contains("Display_1"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Display_1").unwrap().name(), "Display_1");

        assert!(registry.remove("Display_1").is_some());
        assert!(registry.is_empty());
        assert!(registry.get("Display_1").is_none());
    }

    #[test]
    fn test_registry_clones_share_devices() {
        let registry = DeviceRegistry::new();
        let shared = registry.clone();
        shared.register("Switcher_1", Arc::new(MockDevice::matrix("Switcher_1")));

        assert!(registry.contains("Switcher_1"));
    }

    #[test]
    fn test_device_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Arc<dyn Device>>();
        assert_send_sync::<DeviceRegistry>();
    }
}
