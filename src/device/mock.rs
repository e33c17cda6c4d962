//! Mock device for testing without hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Capability, Device};
use crate::graph::Selector;
use crate::DeviceError;

/// A switch command received by a [`MockDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `switch_to(input)`
    SwitchTo(Selector),
    /// `switch(input, output)`
    Switch {
        /// Requested input.
        input: Selector,
        /// Requested output.
        output: Selector,
    },
}

/// A scriptable in-memory device.
///
/// Records every switch command it receives, tracks the active input like a
/// real single-output switch, and can be taken offline, made to fail or
/// slowed down. Suitable for CI where no hardware is present.
///
/// # Example
///
/// ```
/// use signal_router::{Capability, Device, MockCall, MockDevice, Selector};
///
/// let display = MockDevice::switcher("Display_1").with_input("hdmi");
/// assert_eq!(display.input(), Some(Selector::parse("hdmi")));
///
/// futures::executor::block_on(display.switch_to(&Selector::parse("vga")))?;
/// assert_eq!(display.calls(), vec![MockCall::SwitchTo(Selector::parse("vga"))]);
/// assert!(!display.supports(Capability::Switch));
/// # Ok::<(), signal_router::DeviceError>(())
/// ```
pub struct MockDevice {
    name: String,
    switch_to: bool,
    switch: bool,
    connected: AtomicBool,
    input: Mutex<Option<Selector>>,
    failure: Mutex<Option<String>>,
    latency: Duration,
    calls: Mutex<Vec<MockCall>>,
}

impl MockDevice {
    /// Creates a device supporting both `switch_to` and `switch`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            switch_to: true,
            switch: true,
            connected: AtomicBool::new(true),
            input: Mutex::new(None),
            failure: Mutex::new(None),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a single-output switch (only `switch_to`).
    pub fn switcher(name: impl Into<String>) -> Self {
        Self {
            switch: false,
            ..Self::new(name)
        }
    }

    /// Creates a matrix switcher (only `switch`).
    pub fn matrix(name: impl Into<String>) -> Self {
        Self {
            switch_to: false,
            ..Self::new(name)
        }
    }

    /// Creates a device with no switching operations (e.g. a fixed-input
    /// display).
    pub fn passive(name: impl Into<String>) -> Self {
        Self {
            switch_to: false,
            switch: false,
            ..Self::new(name)
        }
    }

    /// Sets the input the device reports as active.
    #[must_use]
    pub fn with_input(self, input: impl Into<Selector>) -> Self {
        *self.input.lock() = Some(input.into());
        self
    }

    /// Starts the device offline.
    #[must_use]
    pub fn offline(self) -> Self {
        self.connected.store(false, Ordering::SeqCst);
        self
    }

    /// Makes every switch command fail with `reason`.
    #[must_use]
    pub fn failing(self, reason: impl Into<String>) -> Self {
        *self.failure.lock() = Some(reason.into());
        self
    }

    /// Delays every switch command by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Changes the reachability flag.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Changes the failure mode; `None` makes commands succeed again.
    pub fn set_failure(&self, reason: Option<String>) {
        *self.failure.lock() = reason;
    }

    /// Returns every switch command received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Number of switch commands received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    async fn execute(&self, call: MockCall) -> Result<(), DeviceError> {
        self.calls.lock().push(call);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(DeviceError::Offline);
        }
        if let Some(reason) = self.failure.lock().clone() {
            return Err(DeviceError::failed(reason));
        }
        Ok(())
    }
}

#[async_trait]
impl Device for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn input(&self) -> Option<Selector> {
        self.input.lock().clone()
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::SwitchTo => self.switch_to,
            Capability::Switch => self.switch,
        }
    }

    async fn switch_to(&self, input: &Selector) -> Result<(), DeviceError> {
        if !self.switch_to {
            return Err(DeviceError::Unsupported {
                capability: Capability::SwitchTo,
            });
        }
        self.execute(MockCall::SwitchTo(input.clone())).await?;
        *self.input.lock() = Some(input.clone());
        Ok(())
    }

    async fn switch(&self, input: &Selector, output: &Selector) -> Result<(), DeviceError> {
        if !self.switch {
            return Err(DeviceError::Unsupported {
                capability: Capability::Switch,
            });
        }
        self.execute(MockCall::Switch {
            input: input.clone(),
            output: output.clone(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_switch_to_updates_input() {
        let device = MockDevice::switcher("Display_1").with_input(1u32);
        device.switch_to(&Selector::Index(2)).await.unwrap();

        assert_eq!(device.input(), Some(Selector::Index(2)));
        assert_eq!(device.calls(), vec![MockCall::SwitchTo(Selector::Index(2))]);
    }

    #[tokio::test]
    async fn test_mock_matrix_switch() {
        let device = MockDevice::matrix("Switcher_1");
        device
            .switch(&Selector::Index(1), &Selector::Index(2))
            .await
            .unwrap();

        assert_eq!(
            device.calls(),
            vec![MockCall::Switch {
                input: Selector::Index(1),
                output: Selector::Index(2),
            }]
        );
        assert!(device.switch_to(&Selector::Index(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let device = MockDevice::switcher("Display_1").failing("no ack");
        let result = device.switch_to(&Selector::Index(1)).await;

        assert_eq!(result, Err(DeviceError::failed("no ack")));
        assert_eq!(device.input(), None);
        assert_eq!(device.call_count(), 1);

        device.set_failure(None);
        device.switch_to(&Selector::Index(1)).await.unwrap();
        assert_eq!(device.input(), Some(Selector::Index(1)));
    }

    #[tokio::test]
    async fn test_mock_offline() {
        let device = MockDevice::new("Display_1").offline();
        assert!(!device.is_connected());
        assert_eq!(
            device.switch_to(&Selector::Index(1)).await,
            Err(DeviceError::Offline)
        );

        device.set_connected(true);
        assert!(device.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_latency() {
        let device = MockDevice::switcher("Display_1").with_latency(Duration::from_millis(40));
        let start = tokio::time::Instant::now();
        device.switch_to(&Selector::Index(1)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_mock_passive_capabilities() {
        let device = MockDevice::passive("Display_1");
        assert!(!device.supports(Capability::SwitchTo));
        assert!(!device.supports(Capability::Switch));
    }
}
