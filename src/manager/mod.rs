// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordination of daemons, devices and pollers.
//!
//! # Overview
//!
//! - [`DeviceRegistry`]: the devices behind one daemon, discovered once
//! - [`Monitor`]: every configured daemon, with a poller per device, a read
//!   API and a fleet summary
//!
//! # Examples
//!
//! ## Reading device state
//!
//! ```no_run
//! use nutwatch::manager::{Monitor, MonitorConfig};
//! use nutwatch::protocol::ServerConfig;
//!
//! # async fn example() -> nutwatch::Result<()> {
//! let monitor = Monitor::start(
//!     MonitorConfig::new().with_server(ServerConfig::new("nas.local")),
//! )
//! .await?;
//!
//! for view in monitor.list_devices() {
//!     println!("{}: {}% battery", view.name, view.battery.charge);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Event subscription
//!
//! ```no_run
//! use nutwatch::event::DeviceEvent;
//! use nutwatch::manager::Monitor;
//!
//! # fn example(monitor: &Monitor) {
//! let mut events = monitor.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             DeviceEvent::PollFailed { device_id, error } => {
//!                 eprintln!("{device_id}: {error}");
//!             }
//!             DeviceEvent::SessionReconnected { device_id } => {
//!                 println!("{device_id}: reconnected");
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//! # }
//! ```

mod monitor;
mod registry;

pub use monitor::{FleetStatus, FleetSummary, Monitor, MonitorConfig, ShutdownReport};
pub use registry::DeviceRegistry;
