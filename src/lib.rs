//! # signal-router
//!
//! **Note:** This crate is under active development. The API may change before 1.0.
//!
//! Multi-hop signal routing for audiovisual switching infrastructure.
//!
//! `signal-router` decides how to connect a source (camera, laptop input,
//! matrix output) to one or more sinks (displays, recorders) through a mesh
//! of switching devices, drives the device calls needed to get there and
//! reports full or partial success.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use signal_router::{ConnectOptions, MockDevice, Router, RouterConfig, SignalMap};
//!
//! # async fn run() -> Result<(), signal_router::RouterError> {
//! let config = RouterConfig::from_file("connections.json")?;
//!
//! let router = Router::builder()
//!     .config(config)
//!     .device("Switcher_1", Arc::new(MockDevice::matrix("Switcher_1")))
//!     .device("Display_1", Arc::new(MockDevice::switcher("Display_1")))
//!     .on_event(|e| tracing::warn!(?e, "router event"))
//!     .build()?;
//!
//! let request = SignalMap::new().route_all("Laptop_1", ["Display_1", "Display_2"]);
//! let outcome = router.connect(&request, ConnectOptions::default()).await?;
//!
//! if !outcome.complete {
//!     tracing::warn!("only applied {}", outcome.applied);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Graph**: connectivity is a directed graph whose edges run from sinks
//!   back towards sources, so one shortest path search per sink covers every
//!   source that can reach it
//! - **Router**: holds the current graph generation and its path cache,
//!   resolves requests, rejects conflicting routes and activates edges
//!   through [`Device`] proxies concurrently
//! - **Devices**: the router only ever asks a device to select an input or
//!   route an input to an output; protocols live behind the [`Device`] trait

#![warn(missing_docs)]
// unwrap/expect allowed in tests only
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod config;
mod device;
mod error;
mod event;
mod graph;
mod router;

pub use config::{ConnectOptions, Connections, RouterConfig};
pub use device::{Capability, Device, DeviceRegistry, MockCall, MockDevice};
pub use error::{DeviceError, RouterError};
pub use event::{event_callback, EventCallback, RouterEvent};
pub use graph::{DeviceId, Edge, EdgeKind, Node, NodeId, Paths, Selector, SignalGraph};
pub use router::{ConnectOutcome, Route, Router, RouterBuilder, SignalMap, TopologyStatus};
